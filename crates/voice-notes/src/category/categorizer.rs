//! Heuristic category and title selection for new notes.
//!
//! There is no speech recognition behind this: the category comes from the
//! recording's length and size, and the title from a per-category phrase
//! list stamped with the local time.

use crate::category::Category;

use chrono::{DateTime, TimeZone};
use rand::{Rng, seq::SliceRandom};
use tracing::debug;

/// Notes shorter than this are filed as tasks.
pub const SHORT_NOTE_SECS: f64 = 10.0;

/// Notes longer than this are filed as ideas.
pub const LONG_NOTE_SECS: f64 = 60.0;

/// Mid-length payloads above this size are filed as work.
pub const LARGE_PAYLOAD_BYTES: usize = 100_000;

/// Pick a category from a note's duration and payload size.
///
/// Falls back to a uniformly random category other than `Random`.
pub fn categorize<R: Rng + ?Sized>(duration: f64, byte_len: usize, rng: &mut R) -> Category {
    let category = if duration < SHORT_NOTE_SECS {
        Category::Tasks
    } else if duration > LONG_NOTE_SECS {
        Category::Ideas
    } else if byte_len > LARGE_PAYLOAD_BYTES {
        Category::Work
    } else {
        let candidates = &Category::ALL[..Category::ALL.len() - 1];
        candidates.choose(rng).copied().unwrap_or_default()
    };

    debug!(duration, byte_len, category = category.id(), "Note categorized");

    category
}

/// Phrases a title for `category` is drawn from.
pub fn title_choices(category: Category) -> &'static [&'static str] {
    match category {
        Category::Ideas => &["Brilliant Idea", "Creative Thought", "Innovation", "Inspiration"],
        Category::Shopping => &["Shopping List", "Errands", "Things to Buy", "Market Run"],
        Category::Work => &["Work Note", "Meeting Thoughts", "Project Idea", "Business Note"],
        Category::Tasks => &["Reminder", "Don't Forget", "To-Do Item", "Important Task"],
        Category::Goals => &["Future Goal", "Dream Note", "Aspiration", "Life Plan"],
        Category::Random => &[
            "Quick Thought",
            "Random Note",
            "Voice Memo",
            "Spontaneous Idea",
        ],
    }
}

/// Title such as `"Market Run (14:05)"` using the time of `at`.
pub fn generate_title<Tz, R>(category: Category, at: &DateTime<Tz>, rng: &mut R) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    R: Rng + ?Sized,
{
    let phrase = title_choices(category)
        .choose(rng)
        .copied()
        .unwrap_or("Voice Memo");

    format!("{} ({})", phrase, at.format("%H:%M"))
}
