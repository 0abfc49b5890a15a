mod export;
mod filter;
mod note;
mod note_library;
mod stats;

pub(crate) use {
    export::{ExportDocument, export_file_name},
    filter::{FilterOptions, SortBy, apply_filters},
    note::{NoteUpdate, VoiceNote},
    note_library::NoteLibrary,
    stats::LibraryStats,
};

#[cfg(test)]
pub(crate) use {
    export::EXPORT_VERSION,
    note_library::{AUDIO_DIR, LIBRARY_FILE, PLACEHOLDER_MAX},
};
