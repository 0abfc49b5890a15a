use crate::{
    AppCommand, AppError, AppResult, ListArgs, StatusLine,
    config::Config,
    library::{NoteLibrary, NoteUpdate},
    status_line::{
        format_duration, render_categories, render_note, render_note_detail, render_playback,
        render_stats,
    },
};

use std::panic::Location;

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use voice_notes_core::{
    CapturedAudio, DeviceProvider, OutputProvider, PlaybackStatus, Player, RecordingManager,
    TickOutcome,
};

/// Main application state.
///
/// Owns the recorder, the player and the library on the runtime's only
/// thread. Two interval sources drive the recorder: the timeslice ticker
/// while a recording is open, the frame ticker only while it is running.
/// A third interval follows playback while a note is open.
pub struct App<P: DeviceProvider, O: OutputProvider> {
    pub(crate) recorder: RecordingManager<P>,
    pub(crate) player: Player<O>,
    pub(crate) library: NoteLibrary,
    pub(crate) config: Config,
    pub(crate) status: StatusLine,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl<P: DeviceProvider, O: OutputProvider> App<P, O> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice Notes starting");

        let mut ticker = tokio::time::interval(self.config.timeslice());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = tokio::time::interval(self.config.recording.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut progress = tokio::time::interval(self.config.timeslice());
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut ctrl_c_armed = true;

        loop {
            tokio::select! {
                result = &mut ctrl_c, if ctrl_c_armed => {
                    match result {
                        Ok(()) => {
                            info!("Interrupt received");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "Ctrl-C handler unavailable");
                            ctrl_c_armed = false;
                        }
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(AppCommand::Quit) | None => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(AppCommand::Record) => {
                            self.handle_command(AppCommand::Record).await;
                            ticker.reset();
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }

                _ = ticker.tick(), if self.recorder.state().is_recording => {
                    self.on_tick().await;
                }

                _ = frames.tick(), if self.recorder.wants_frames() => {
                    if self.recorder.frame() {
                        self.status
                            .draw(self.recorder.state(), self.recorder.settings().max_duration);
                    }
                }

                _ = progress.tick(), if self.player.is_active() => {
                    self.on_playback_tick();
                }
            }
        }

        if self.recorder.state().is_recording {
            self.recorder.abandon();
            self.status.println("Recording discarded.");
        }

        if self.player.stop() {
            self.status.clear();
        }

        let _ = self.shutdown_tx.send(true);
        info!("Voice Notes shut down successfully");

        Ok(())
    }

    async fn handle_command(&mut self, command: AppCommand) {
        if let Err(e) = self.execute(command).await {
            error!(error = ?e, "Command failed");
            self.status.println(&e.user_message());
        }
    }

    #[instrument(skip(self))]
    async fn execute(&mut self, command: AppCommand) -> AppResult<()> {
        match command {
            AppCommand::Record => {
                if self.player.stop() {
                    self.status.println("Playback stopped.");
                }
                self.recorder.start()?;
                self.status.println("Recording. Type pause, resume or stop.");
            }
            AppCommand::Pause => {
                let paused = if self.recorder.state().is_recording {
                    self.recorder.pause()
                } else {
                    self.player.pause()
                };
                if !paused {
                    self.status.println("Nothing to pause.");
                }
                self.redraw();
            }
            AppCommand::Resume => {
                let resumed = if self.recorder.state().is_recording {
                    self.recorder.resume()
                } else {
                    self.player.resume()
                };
                if !resumed {
                    self.status.println("Nothing to resume.");
                }
                self.redraw();
            }
            AppCommand::Stop => {
                if self.recorder.state().is_recording {
                    let captured = self.recorder.stop()?;
                    self.save(captured).await?;
                } else if self.player.stop() {
                    self.status.println("Playback stopped.");
                } else {
                    self.status.println("Nothing to stop.");
                }
            }
            AppCommand::Play { id } => {
                if self.recorder.state().is_recording {
                    return Err(AppError::CommandError {
                        reason: "Stop the recording before playing a note".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                let id = self.library.resolve_id(&id)?;
                let (title, path) = match self.library.get(id) {
                    Some(note) => (note.title.clone(), self.library.audio_path(note)),
                    None => {
                        return Err(AppError::NoteNotFound {
                            query: id.to_string(),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                };
                let payload = tokio::fs::read(&path).await?;
                let duration = self.player.play(&payload)?;
                self.status.println(&format!(
                    "Playing \"{}\" ({}). Type pause, resume, seek, speed, volume or stop.",
                    title,
                    format_duration(duration)
                ));
                self.redraw();
            }
            AppCommand::Seek { seconds } => match self.player.seek(seconds) {
                Some(_) => self.redraw(),
                None => self.status.println("Nothing is playing."),
            },
            AppCommand::Rewind => {
                if self.player.restart() {
                    self.redraw();
                } else {
                    self.status.println("Nothing is playing.");
                }
            }
            AppCommand::Speed { rate } => {
                let rate = match rate {
                    Some(rate) => self.player.set_rate(rate),
                    None => self.player.cycle_rate(),
                };
                self.status.println(&format!("Speed {}x", rate));
                self.redraw();
            }
            AppCommand::Volume { level } => {
                let volume = self.player.set_volume(level);
                self.status
                    .println(&format!("Volume {}%", (volume * 100.0).round() as u32));
                self.redraw();
            }
            AppCommand::Show { id } => {
                let id = self.library.resolve_id(&id)?;
                if let Some(note) = self.library.get(id) {
                    let detail = render_note_detail(note);
                    self.status.println(&detail);
                }
            }
            AppCommand::List(args) => self.list(&args),
            AppCommand::Favorite { id } => {
                let id = self.library.resolve_id(&id)?;
                let is_favorite = self.library.toggle_favorite(id).await?;
                let mark = if is_favorite { "Added to" } else { "Removed from" };
                self.status.println(&format!("{} favourites.", mark));
            }
            AppCommand::Rename { id, title } => {
                let id = self.library.resolve_id(&id)?;
                let update = NoteUpdate {
                    title: Some(title.join(" ")),
                    ..NoteUpdate::default()
                };
                let note = self.library.update(id, update).await?;
                let line = render_note(note);
                self.status.println(&line);
            }
            AppCommand::Tag { id, tags } => {
                let id = self.library.resolve_id(&id)?;
                let note = self.library.add_tags(id, &tags).await?;
                let line = render_note(note);
                self.status.println(&line);
            }
            AppCommand::Move { id, category } => {
                let id = self.library.resolve_id(&id)?;
                let update = NoteUpdate {
                    category: Some(category),
                    ..NoteUpdate::default()
                };
                let note = self.library.update(id, update).await?;
                let line = render_note(note);
                self.status.println(&line);
            }
            AppCommand::Delete { id } => {
                let id = self.library.resolve_id(&id)?;
                let note = self.library.delete(id).await?;
                self.status.println(&format!("Deleted \"{}\".", note.title));
            }
            AppCommand::Export { ids } => {
                let ids = ids
                    .iter()
                    .map(|id| self.library.resolve_id(id))
                    .collect::<AppResult<Vec<Uuid>>>()?;
                let path = self
                    .library
                    .export(&ids, &self.config.export_dir(), Utc::now())
                    .await?;
                self.status.println(&format!("Exported to {}", path.display()));
            }
            AppCommand::Stats => {
                let stats = self.library.stats();
                self.status.println(&render_stats(&stats));
            }
            AppCommand::Categories => self.status.println(&render_categories()),
            AppCommand::Quit => {}
        }

        Ok(())
    }

    /// Timeslice tick: collect audio, refresh the meter, save on cutoff.
    async fn on_tick(&mut self) {
        match self.recorder.tick() {
            Ok(TickOutcome::LimitReached(captured)) => {
                let limit = self.recorder.settings().max_duration.as_secs();
                self.status.println(&format!(
                    "Maximum length of {} seconds reached, recording stopped.",
                    limit
                ));
                if let Err(e) = self.save(captured).await {
                    error!(error = ?e, "Failed to save note");
                    self.status.println(&e.user_message());
                }
            }
            Ok(TickOutcome::Running { .. }) | Ok(TickOutcome::Paused { .. }) => self.redraw(),
            Ok(TickOutcome::Idle) => {}
            Err(e) => {
                let e = AppError::from(e);
                error!(error = ?e, "Capture failed, discarding recording");
                self.recorder.abandon();
                self.status.println(&e.user_message());
            }
        }
    }

    /// Playback tick: follow the playhead, release the speaker at the end.
    fn on_playback_tick(&mut self) {
        match self.player.poll() {
            PlaybackStatus::Finished => self.status.println("Finished playing."),
            PlaybackStatus::Idle => {}
            PlaybackStatus::Playing(_) | PlaybackStatus::Paused(_) => self.redraw(),
        }
    }

    async fn save(&mut self, captured: Option<CapturedAudio>) -> AppResult<()> {
        let Some(captured) = captured else {
            self.status.println("Nothing was recorded.");
            return Ok(());
        };

        self.status.println("Saving...");
        let note = self.library.add_note(captured).await?;
        self.status.println(&format!("Saved  {}", render_note(&note)));

        Ok(())
    }

    fn list(&mut self, args: &ListArgs) {
        let filters = args.to_filter();
        let notes: Vec<_> = self
            .library
            .filter(&filters)
            .into_iter()
            .filter(|n| !args.favorites || n.is_favorite)
            .map(render_note)
            .collect();

        if notes.is_empty() {
            self.status.println("No notes.");
        } else {
            self.status.println(&notes.join("\n"));
        }
    }

    fn redraw(&mut self) {
        if self.recorder.state().is_recording {
            self.status
                .draw(self.recorder.state(), self.recorder.settings().max_duration);
        } else if let Some(line) = render_playback(&self.player.status()) {
            self.status.draw_text(&line);
        } else {
            self.status.clear();
        }
    }
}
