//! Whole-collection persistence of notes and their audio payloads.
//!
//! Layout under the data directory:
//!
//! - `voice-notes-organizer.json`: every note, newest first
//! - `audio/<uuid>.wav`: one payload per note
//!
//! The JSON file is rewritten in full after every change (temp file +
//! rename), so a crash mid-write leaves the previous version intact.

use crate::{
    AppError, AppResult,
    category::{categorize, generate_title},
    library::{
        ExportDocument, FilterOptions, LibraryStats, NoteUpdate, VoiceNote, apply_filters,
        export_file_name,
    },
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, Utc};
use error_location::ErrorLocation;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use voice_notes_core::{
    CapturedAudio, METADATA_TIMEOUT, NOTE_ENVELOPE_POINTS, envelope_from_payload, measure_duration,
};

/// Library file name inside the data directory.
pub const LIBRARY_FILE: &str = "voice-notes-organizer.json";

/// Payload directory inside the data directory.
pub const AUDIO_DIR: &str = "audio";

/// Upper bound (exclusive) of placeholder envelope values.
pub const PLACEHOLDER_MAX: f32 = 0.8;

/// The user's notes, loaded into memory and mirrored to disk.
pub struct NoteLibrary {
    data_dir: PathBuf,
    notes: Vec<VoiceNote>,
}

impl NoteLibrary {
    /// Open (or create) the library in `data_dir`.
    ///
    /// An unreadable library file is moved aside to `*.corrupt` and the
    /// library starts empty.
    #[instrument]
    pub async fn open(data_dir: &Path) -> AppResult<Self> {
        fs::create_dir_all(data_dir.join(AUDIO_DIR))
            .await
            .map_err(|e| AppError::LibraryError {
                reason: format!("Failed to create library directory: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let library_path = data_dir.join(LIBRARY_FILE);

        let notes = match fs::read(&library_path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<VoiceNote>>(&bytes) {
                Ok(notes) => notes,
                Err(e) => {
                    let aside = library_path.with_extension("json.corrupt");
                    warn!(error = %e, moved_to = ?aside, "Library file unreadable, starting empty");
                    fs::rename(&library_path, &aside).await?;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(library_path = ?library_path, "No library file yet");
                Vec::new()
            }
            Err(e) => {
                return Err(AppError::LibraryError {
                    reason: format!("Failed to read library: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        info!(data_dir = ?data_dir, note_count = notes.len(), "Library opened");

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            notes,
        })
    }

    /// All notes, newest first.
    pub fn notes(&self) -> &[VoiceNote] {
        &self.notes
    }

    /// Look up a note by id.
    pub fn get(&self, id: Uuid) -> Option<&VoiceNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Where a note's payload lives.
    pub fn audio_path(&self, note: &VoiceNote) -> PathBuf {
        self.data_dir.join(AUDIO_DIR).join(&note.audio_file)
    }

    /// Resolve a full id or a unique id prefix (as shown by `list`).
    #[track_caller]
    pub fn resolve_id(&self, query: &str) -> AppResult<Uuid> {
        let query = query.trim().to_lowercase();

        if let Ok(id) = Uuid::parse_str(&query) {
            return match self.get(id) {
                Some(_) => Ok(id),
                None => Err(AppError::NoteNotFound {
                    query,
                    location: ErrorLocation::from(Location::caller()),
                }),
            };
        }

        let candidates: Vec<Uuid> = if query.is_empty() {
            Vec::new()
        } else {
            self.notes
                .iter()
                .filter(|n| n.id.to_string().starts_with(&query))
                .map(|n| n.id)
                .collect()
        };

        match candidates.as_slice() {
            [id] => Ok(*id),
            [] => Err(AppError::NoteNotFound {
                query,
                location: ErrorLocation::from(Location::caller()),
            }),
            _ => Err(AppError::AmbiguousNoteId {
                query,
                candidates,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Turn a finished recording into a saved note.
    pub async fn add_note(&mut self, captured: CapturedAudio) -> AppResult<VoiceNote> {
        let mut rng = StdRng::from_entropy();
        self.add_note_with(captured, &mut rng, Utc::now()).await
    }

    /// [`NoteLibrary::add_note`] with explicit randomness and creation time.
    ///
    /// Duration comes from the payload's metadata (estimated from its size
    /// when unreadable), the envelope from its decoded audio (random
    /// placeholder when undecodable).
    #[instrument(skip(self, captured, rng), fields(byte_len = captured.byte_len()))]
    pub async fn add_note_with<R: Rng + ?Sized>(
        &mut self,
        captured: CapturedAudio,
        rng: &mut R,
        created_at: DateTime<Utc>,
    ) -> AppResult<VoiceNote> {
        let CapturedAudio {
            payload,
            duration: recorded_duration,
        } = captured;
        let byte_len = payload.len();

        let duration = measure_duration(&payload, METADATA_TIMEOUT).await;

        let (payload, envelope) = tokio::task::spawn_blocking(move || {
            let envelope = envelope_from_payload(&payload, NOTE_ENVELOPE_POINTS);
            (payload, envelope)
        })
        .await
        .map_err(|e| AppError::LibraryError {
            reason: format!("Envelope task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let waveform_data = match envelope {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = ?e, "Envelope unavailable, using placeholder");
                placeholder_envelope(rng)
            }
        };

        let category = categorize(duration, byte_len, rng);
        let title = generate_title(category, &created_at.with_timezone(&Local), rng);

        let id = Uuid::new_v4();
        let note = VoiceNote {
            id,
            title,
            category,
            duration,
            created_at,
            waveform_data,
            tags: Vec::new(),
            is_favorite: false,
            audio_file: format!("{}.wav", id),
        };

        fs::write(self.audio_path(&note), &payload).await?;

        self.notes.insert(0, note.clone());
        self.save().await?;

        info!(
            note_id = %id,
            duration_secs = duration,
            recorded_secs = recorded_duration,
            category = category.id(),
            "Note saved"
        );

        Ok(note)
    }

    /// Remove a note and its payload.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: Uuid) -> AppResult<VoiceNote> {
        let index = self.index_of(id)?;
        let note = self.notes.remove(index);

        match fs::remove_file(self.audio_path(&note)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(note_id = %id, "Payload already gone");
            }
            Err(e) => warn!(note_id = %id, error = %e, "Failed to remove payload"),
        }

        self.save().await?;
        info!(note_id = %id, "Note deleted");

        Ok(note)
    }

    /// Apply a partial update.
    #[instrument(skip(self))]
    pub async fn update(&mut self, id: Uuid, update: NoteUpdate) -> AppResult<&VoiceNote> {
        let index = self.index_of(id)?;
        update.apply(&mut self.notes[index]);
        self.save().await?;

        debug!(note_id = %id, "Note updated");

        Ok(&self.notes[index])
    }

    /// Add tags a note does not have yet.
    pub async fn add_tags(&mut self, id: Uuid, tags: &[String]) -> AppResult<&VoiceNote> {
        let index = self.index_of(id)?;
        let mut merged = self.notes[index].tags.clone();
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !merged.iter().any(|t| t == tag) {
                merged.push(tag.to_string());
            }
        }

        self.update(
            id,
            NoteUpdate {
                tags: Some(merged),
                ..NoteUpdate::default()
            },
        )
        .await
    }

    /// Flip the favourite flag. Returns the new value.
    pub async fn toggle_favorite(&mut self, id: Uuid) -> AppResult<bool> {
        let index = self.index_of(id)?;
        let is_favorite = !self.notes[index].is_favorite;

        self.update(
            id,
            NoteUpdate {
                is_favorite: Some(is_favorite),
                ..NoteUpdate::default()
            },
        )
        .await?;

        Ok(is_favorite)
    }

    /// Notes matching `filters`, in the requested order.
    pub fn filter(&self, filters: &FilterOptions) -> Vec<&VoiceNote> {
        apply_filters(&self.notes, filters)
    }

    /// Aggregate figures.
    pub fn stats(&self) -> LibraryStats {
        LibraryStats::from_notes(&self.notes)
    }

    /// Write selected notes (all when `ids` is empty) to an export file in
    /// `dir`. Returns the file path.
    #[instrument(skip(self))]
    pub async fn export(&self, ids: &[Uuid], dir: &Path, now: DateTime<Utc>) -> AppResult<PathBuf> {
        let document = if ids.is_empty() {
            ExportDocument::new(&self.notes, now)
        } else {
            ExportDocument::new(self.notes.iter().filter(|n| ids.contains(&n.id)), now)
        };

        let contents = serde_json::to_vec_pretty(&document)?;

        fs::create_dir_all(dir).await?;
        let path = dir.join(export_file_name(now));
        fs::write(&path, contents).await?;

        info!(path = ?path, note_count = document.notes.len(), "Notes exported");

        Ok(path)
    }

    #[track_caller]
    fn index_of(&self, id: Uuid) -> AppResult<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AppError::NoteNotFound {
                query: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn save(&self) -> AppResult<()> {
        let contents = serde_json::to_vec_pretty(&self.notes)?;

        let library_path = self.data_dir.join(LIBRARY_FILE);
        let temp_path = library_path.with_extension("json.tmp");

        fs::write(&temp_path, contents)
            .await
            .map_err(|e| AppError::LibraryError {
                reason: format!("Failed to write temp library file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        fs::rename(&temp_path, &library_path)
            .await
            .map_err(|e| AppError::LibraryError {
                reason: format!("Failed to replace library file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(note_count = self.notes.len(), "Library saved (atomic write)");

        Ok(())
    }
}

fn placeholder_envelope<R: Rng + ?Sized>(rng: &mut R) -> Vec<f32> {
    (0..NOTE_ENVELOPE_POINTS)
        .map(|_| rng.gen_range(0.0..PLACEHOLDER_MAX))
        .collect()
}
