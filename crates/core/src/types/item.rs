use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::target::RunTarget;

/// Editor-side identity of a test item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestItemId(pub String);

impl TestItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TestItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Suite,
    Test,
}

/// What an explorer item stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestData {
    File {
        path: PathBuf,
    },
    Folder {
        path: PathBuf,
    },
    /// A suite or test inside a file. `pattern` is the expression that
    /// selects exactly this case (and its children) by name.
    Case {
        file: PathBuf,
        kind: CaseKind,
        pattern: String,
    },
}

/// A node of the explorer tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestItem {
    pub id: TestItemId,
    pub label: String,
    #[serde(flatten)]
    pub data: TestData,
}

impl TestItem {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: TestItemId::new(path.to_string_lossy()),
            label: file_label(&path),
            data: TestData::File { path },
        }
    }

    pub fn folder(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: TestItemId::new(format!("{}/", path.to_string_lossy())),
            label: file_label(&path),
            data: TestData::Folder { path },
        }
    }

    pub fn case(
        id: impl Into<String>,
        label: impl Into<String>,
        file: impl Into<PathBuf>,
        kind: CaseKind,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: TestItemId::new(id),
            label: label.into(),
            data: TestData::Case {
                file: file.into(),
                kind,
                pattern: pattern.into(),
            },
        }
    }

    /// The file that has to run for this item; folders have none.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.data {
            TestData::File { path } => Some(path),
            TestData::Case { file, .. } => Some(file),
            TestData::Folder { .. } => None,
        }
    }

    /// Target passed to the runner when this item is selected.
    pub fn run_target(&self) -> RunTarget {
        match &self.data {
            TestData::File { path } => RunTarget::File(path.clone()),
            TestData::Folder { path } => RunTarget::Folder(path.clone()),
            TestData::Case { file, .. } => RunTarget::File(file.clone()),
        }
    }

    pub fn name_pattern(&self) -> Option<&str> {
        match &self.data {
            TestData::Case { pattern, .. } => Some(pattern),
            TestData::File { .. } | TestData::Folder { .. } => None,
        }
    }

    /// Files and folders group other items; a failure on them is structural.
    pub fn is_suite(&self) -> bool {
        match &self.data {
            TestData::File { .. } | TestData::Folder { .. } => true,
            TestData::Case { kind, .. } => *kind == CaseKind::Suite,
        }
    }

    /// Whether running `file` is within what this item selects.
    pub fn covers_file(&self, file: &Path) -> bool {
        match &self.data {
            TestData::File { path } => path == file,
            TestData::Folder { path } => file.starts_with(path),
            TestData::Case { file: owner, .. } => owner == file,
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
