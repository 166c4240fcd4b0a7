use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// A clickable source position. `line` and `column` are zero-based, the way
/// editors address text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub fn new(path: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

/// Rewrite both `/` and `\` to the host separator.
pub fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Compare a runner-reported path with a host path after separator
/// normalization on both sides.
pub fn same_file(reported: &str, declared: &Path) -> bool {
    normalize_separators(reported) == normalize_separators(&declared.to_string_lossy())
}
