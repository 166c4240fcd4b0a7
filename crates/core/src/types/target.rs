use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// A path handed to the runner's file filter.
///
/// On the wire a folder is a path with a trailing separator; the runner echoes
/// the same strings back in watcher events, so the marker survives a round
/// trip and folders can be expanded into their member files later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunTarget {
    File(PathBuf),
    Folder(PathBuf),
}

impl RunTarget {
    /// Parse a wire path, treating a trailing `/` or `\` as a folder marker.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix(['/', '\\']) {
            Some(folder) => Self::Folder(PathBuf::from(folder)),
            None => Self::File(PathBuf::from(raw)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Folder(path) => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }
}

impl fmt::Display for RunTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Folder(path) => write!(f, "{}{}", path.display(), MAIN_SEPARATOR),
        }
    }
}

impl From<&str> for RunTarget {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for RunTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Render targets the way the runner's file filter expects them.
pub fn to_wire(targets: &[RunTarget]) -> Vec<String> {
    targets.iter().map(ToString::to_string).collect()
}
