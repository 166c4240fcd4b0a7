//! Contract of the watcher/RPC client that talks to one Vitest process

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::coverage::CoverageConfig;
use crate::error::Result;
use crate::types::{FileTask, RunTarget, TaskId, TaskResult};

/// Progress events pushed by the runner process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEvent {
    /// The watcher is about to (re)run these files.
    WatcherRerun {
        files: Vec<RunTarget>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trigger: Option<String>,
        #[serde(default)]
        collecting: bool,
    },
    /// Result snapshots for individual tasks.
    TaskUpdate {
        packs: Vec<(TaskId, Option<TaskResult>)>,
    },
    /// Files whose task trees were (re)collected.
    Collected {
        #[serde(default)]
        files: Vec<FileTask>,
        #[serde(default)]
        collecting: bool,
    },
    /// Files that completed, with their final file-level results.
    Finished {
        #[serde(default)]
        files: Vec<FileTask>,
    },
    /// Console output captured from a test, or from outside any test.
    ConsoleLog {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
    },
}

/// Sender half handed to API implementations that push [`RunnerEvent`]s.
pub type EventSender = mpsc::UnboundedSender<RunnerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RunnerEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Execution and watch control over a single workspace folder
///
/// `files` of `None` means every test file; `pattern` of `None` means no
/// test-name filter.
#[async_trait]
pub trait VitestFolderApi: Send + Sync {
    /// Open the event stream. The orchestrator calls this once for its
    /// whole lifetime.
    fn subscribe(&self) -> EventReceiver;

    async fn run_files(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) -> Result<()>;

    async fn watch_tests(&self, files: Option<&[RunTarget]>, pattern: Option<&str>)
        -> Result<()>;

    async fn unwatch_tests(&self) -> Result<()>;

    async fn cancel_run(&self) -> Result<()>;

    async fn enable_coverage(&self) -> Result<()>;

    async fn get_coverage_config(&self) -> Result<CoverageConfig>;

    async fn stop_inspect(&self) -> Result<()>;
}
