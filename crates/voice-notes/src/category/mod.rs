#[allow(clippy::module_inception)]
mod category;
mod categorizer;

pub(crate) use {
    categorizer::{categorize, generate_title},
    category::Category,
};

#[cfg(test)]
pub(crate) use categorizer::{
    LARGE_PAYLOAD_BYTES, LONG_NOTE_SECS, SHORT_NOTE_SECS, title_choices,
};
