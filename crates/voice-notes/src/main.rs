//! Voice Notes: record, organize and export short voice memos from the terminal.

mod app;
mod app_command;
mod category;
mod config;
mod error;
mod input_handler;
mod library;
mod status_line;

pub(crate) use {
    app::App,
    app_command::{AppCommand, ListArgs, ParsedLine, parse_line},
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
    status_line::StatusLine,
};

use crate::{config::Config, library::NoteLibrary};

use std::path::Path;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;
use voice_notes_core::{CpalOutputProvider, CpalProvider, Player, RecordingManager};

const DEFAULT_LOG_FILTER: &str = "voice_notes=debug,voice_notes_core=debug";

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e.user_message());
            std::process::exit(1);
        }
    };

    let data_dir = match config.data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to locate data directory: {}", e.user_message());
            std::process::exit(1);
        }
    };

    // Logs go to a file so the terminal stays free for the meter.
    let _log_guard = match init_logging(&data_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let library = match NoteLibrary::open(&data_dir).await {
            Ok(library) => library,
            Err(e) => {
                error!(error = ?e, "Failed to open library");
                eprintln!("Failed to open library: {}", e.user_message());
                return;
            }
        };

        let recorder = RecordingManager::new(CpalProvider::new(), config.recorder_settings());
        let player = Player::new(CpalOutputProvider::new());
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let input_handler = InputHandler::new(command_tx);

        println!(
            "Voice Notes: {} notes in {}. Type help for commands.",
            library.notes().len(),
            data_dir.display()
        );

        let app = App {
            recorder,
            player,
            library,
            config,
            status: StatusLine::new(),
            command_rx,
            shutdown_tx,
        };

        tokio::join!(
            async {
                if let Err(e) = input_handler.run(shutdown_rx).await {
                    error!(error = ?e, "Input handler error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // The stdin reader may still be blocked; do not wait for it.
    rt.shutdown_background();
    info!("Exited");
}

fn init_logging(data_dir: &Path) -> Result<WorkerGuard, tracing_appender::rolling::InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("voice-notes")
        .filename_suffix("log")
        .build(data_dir.join("logs"))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
