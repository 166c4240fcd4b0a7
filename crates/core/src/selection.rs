//! Selection requests and their translation into runner filters
//!
//! The editor selects explorer items; the runner only understands a list of
//! files (folders marked by a trailing separator) plus an optional test-name
//! pattern. This module bridges the two.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::types::{RunTarget, TestData, TestItem};

/// Separator used to combine the name patterns of several selected cases
pub const PATTERN_SEPARATOR: &str = "|";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    Run,
    Debug,
    Coverage,
}

/// A test-selection request issued by the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Selected items; `None` means everything in the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<TestItem>>,
    #[serde(default)]
    pub continuous: bool,
    #[serde(default)]
    pub profile: ProfileKind,
}

impl SelectionRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn including(items: Vec<TestItem>) -> Self {
        Self {
            include: Some(items),
            ..Self::default()
        }
    }

    pub fn continuous(mut self) -> Self {
        self.continuous = true;
        self
    }

    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        self.profile = profile;
        self
    }

    /// Whether `file` may get a run under this request.
    pub fn includes_file(&self, file: &Path) -> bool {
        match &self.include {
            None => true,
            Some(items) => items.iter().any(|item| item.covers_file(file)),
        }
    }

    /// Resolve the inclusion set; `None` when the request covers everything.
    pub fn resolve(&self) -> Option<ResolvedSelection> {
        self.include.as_deref().map(resolve_selection)
    }
}

/// Files and name filter the runner should execute for a selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSelection {
    pub files: Vec<RunTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Turn selected items into run targets and a combined name pattern.
///
/// Targets keep first-seen order and appear once. Only cases contribute to
/// the pattern; if none is selected the pattern is absent and the files run
/// unfiltered.
pub fn resolve_selection(items: &[TestItem]) -> ResolvedSelection {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut patterns = Vec::new();

    for item in items {
        let target = item.run_target();
        if seen.insert(target.clone()) {
            files.push(target);
        }

        match &item.data {
            TestData::Case { pattern, .. } => patterns.push(pattern.as_str()),
            TestData::File { .. } | TestData::Folder { .. } => {}
        }
    }

    let pattern = if patterns.is_empty() {
        None
    } else {
        Some(patterns.join(PATTERN_SEPARATOR))
    };

    ResolvedSelection { files, pattern }
}

/// Synthesize the request that stands for every active watch registration.
///
/// The inclusion is the union of all registrations, or everything as soon as
/// one of them watches everything. Returns `None` when nothing is watched.
pub fn merge_continuous(requests: &[Arc<SelectionRequest>]) -> Option<SelectionRequest> {
    if requests.is_empty() {
        return None;
    }

    let mut include = Vec::new();
    for request in requests {
        match &request.include {
            None => return Some(SelectionRequest::all().continuous()),
            Some(items) => include.extend(items.iter().cloned()),
        }
    }

    Some(SelectionRequest::including(include).continuous())
}
