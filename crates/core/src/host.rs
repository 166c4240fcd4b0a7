//! Contract of the editor's test-explorer surface

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::coverage::CoverageReport;
use crate::error::Result;
use crate::selection::SelectionRequest;
use crate::types::{ErrorLocation, TestItem};

/// A failure message shown next to a test item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ErrorLocation>,
}

impl TestMessage {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
            location: None,
        }
    }

    pub fn diff(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            location: None,
        }
    }

    pub fn is_diff(&self) -> bool {
        self.expected.is_some() && self.actual.is_some()
    }
}

/// One editor-visible execution pass over a single file
#[async_trait]
pub trait TestRun: Send + Sync {
    fn name(&self) -> Option<&str>;

    fn enqueued(&self, item: &TestItem);

    fn started(&self, item: &TestItem);

    fn passed(&self, item: &TestItem, duration: Option<Duration>);

    fn failed(&self, item: &TestItem, messages: Vec<TestMessage>, duration: Option<Duration>);

    fn errored(&self, item: &TestItem, messages: Vec<TestMessage>, duration: Option<Duration>);

    fn skipped(&self, item: &TestItem);

    /// Append terminal output. `text` must use `\r\n` line endings.
    fn append_output(&self, text: &str, location: Option<&ErrorLocation>, item: Option<&TestItem>);

    async fn apply_coverage(&self, report: &CoverageReport) -> Result<()>;

    /// Finalize the run; no further reports are accepted.
    fn end(&self);
}

/// The editor host that owns runs and notifications
pub trait TestHost: Send + Sync {
    fn create_run(&self, request: &SelectionRequest, name: Option<String>) -> Arc<dyn TestRun>;

    /// Whether the host can display coverage at all.
    fn supports_coverage(&self) -> bool;

    fn show_warning(&self, message: &str);

    fn show_error(&self, message: &str);
}
