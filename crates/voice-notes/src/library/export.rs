use crate::{category::Category, library::VoiceNote};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format version written into every export file.
pub const EXPORT_VERSION: &str = "1.0";

/// A note as it appears in an export: metadata only, no audio reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNote {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub waveform_data: Vec<f32>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

impl From<&VoiceNote> for ExportedNote {
    fn from(note: &VoiceNote) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            category: note.category,
            duration: note.duration,
            created_at: note.created_at,
            waveform_data: note.waveform_data.clone(),
            tags: note.tags.clone(),
            is_favorite: note.is_favorite,
        }
    }
}

/// Top-level export file content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub notes: Vec<ExportedNote>,
}

impl ExportDocument {
    pub fn new<'a>(notes: impl IntoIterator<Item = &'a VoiceNote>, now: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: now,
            notes: notes.into_iter().map(ExportedNote::from).collect(),
        }
    }
}

/// `voice-notes-export-YYYY-MM-DD.json` for the given day.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("voice-notes-export-{}.json", now.format("%Y-%m-%d"))
}
