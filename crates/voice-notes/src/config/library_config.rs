use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Note library location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory holding the library file and audio payloads
    /// (None = platform data directory).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory export files are written to (None = current directory).
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}
