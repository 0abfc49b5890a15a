//! Terminal input: reads stdin lines and forwards parsed commands.

use crate::{AppCommand, AppError, AppResult, ParsedLine, parse_line};

use std::{io::BufRead, panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Reads commands from the terminal and sends them to the application.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl InputHandler {
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the input loop until shutdown or end of input.
    ///
    /// End of input is treated as `quit`.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Single persistent blocking task forwarding stdin lines.
        // Shutdown: when line_rx is dropped, the next blocking_send() fails.
        let handle = tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Input handler shutting down");
                    break;
                }
                line = line_rx.recv() => match line {
                    Some(line) => {
                        if !self.handle_line(&line).await? {
                            break;
                        }
                    }
                    None => {
                        info!("End of input");
                        self.send(AppCommand::Quit).await?;
                        break;
                    }
                },
            }
        }

        drop(line_rx);

        // stdin cannot be interrupted; the runtime abandons the task on exit.
        match tokio::time::timeout(Duration::from_millis(100), handle).await {
            Ok(Ok(())) => debug!("Input forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Input forwarder task panicked"),
            Err(_) => debug!("Input forwarder still blocked on stdin, leaving it to exit"),
        }

        Ok(())
    }

    /// Parse and forward one line. Returns `false` once `quit` was sent.
    async fn handle_line(&self, line: &str) -> AppResult<bool> {
        match parse_line(line) {
            Ok(ParsedLine::Empty) => Ok(true),
            Ok(ParsedLine::Help(text)) => {
                println!("{}", text.trim_end());
                Ok(true)
            }
            Ok(ParsedLine::Command(command)) => {
                let quitting = command == AppCommand::Quit;
                self.send(command).await?;
                Ok(!quitting)
            }
            Err(e) => {
                debug!(error = ?e, "Rejected input line");
                println!("{}", e.user_message());
                Ok(true)
            }
        }
    }

    #[instrument(skip(self))]
    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::CommandError {
                reason: format!("Application stopped accepting commands: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
