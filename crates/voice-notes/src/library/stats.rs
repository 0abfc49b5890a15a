use crate::{category::Category, library::VoiceNote};

use std::collections::BTreeMap;

/// Aggregate figures over the whole library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryStats {
    pub total_notes: usize,
    /// Seconds.
    pub total_duration: f64,
    pub favorite_count: usize,
    /// Only categories with at least one note appear.
    pub category_stats: BTreeMap<Category, usize>,
}

impl LibraryStats {
    pub fn from_notes(notes: &[VoiceNote]) -> Self {
        notes.iter().fold(Self::default(), |mut stats, note| {
            stats.total_notes += 1;
            stats.total_duration += note.duration;
            if note.is_favorite {
                stats.favorite_count += 1;
            }
            *stats.category_stats.entry(note.category).or_insert(0) += 1;
            stats
        })
    }
}
