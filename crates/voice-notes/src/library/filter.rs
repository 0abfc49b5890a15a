use crate::{category::Category, library::VoiceNote};

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use clap::ValueEnum;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Longest first.
    Duration,
    /// By title, case-insensitive.
    Alphabetical,
}

/// Criteria for [`apply_filters`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Restrict to one category (None = all).
    pub category: Option<Category>,
    /// Case-insensitive substring matched against titles and tags.
    pub search_query: String,
    pub sort_by: SortBy,
    /// Inclusive creation time bounds.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// Select and order notes. The input slice is left untouched.
pub fn apply_filters<'a>(notes: &'a [VoiceNote], filters: &FilterOptions) -> Vec<&'a VoiceNote> {
    let query = filters.search_query.trim().to_lowercase();

    let mut selected: Vec<&VoiceNote> = notes
        .iter()
        .filter(|note| filters.category.is_none_or(|c| note.category == c))
        .filter(|note| {
            query.is_empty()
                || note.title.to_lowercase().contains(&query)
                || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
        })
        .filter(|note| {
            filters
                .date_range
                .is_none_or(|(start, end)| note.created_at >= start && note.created_at <= end)
        })
        .collect();

    match filters.sort_by {
        SortBy::Newest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Oldest => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::Duration => selected.sort_by(|a, b| {
            b.duration
                .partial_cmp(&a.duration)
                .unwrap_or(Ordering::Equal)
        }),
        SortBy::Alphabetical => selected.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        }),
    }

    selected
}
