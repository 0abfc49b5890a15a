use crate::category::Category;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved recording and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    /// Length in seconds.
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    /// 100-point envelope, values in [0, 1].
    #[serde(default)]
    pub waveform_data: Vec<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    /// File name of the payload inside the library's audio directory.
    pub audio_file: String,
}

/// Partial update applied by [`crate::library::NoteLibrary::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl NoteUpdate {
    pub(crate) fn apply(self, note: &mut VoiceNote) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(category) = self.category {
            note.category = category;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(is_favorite) = self.is_favorite {
            note.is_favorite = is_favorite;
        }
    }
}
