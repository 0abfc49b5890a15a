mod summarizer;

pub use summarizer::{NOTE_ENVELOPE_POINTS, envelope_from_payload, summarize};
