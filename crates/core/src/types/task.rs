use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::impl_case_insensitive_deserialize;
use crate::utils::serde_helpers::lenient_coordinate;

/// Opaque task identifier assigned by the runner process
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Suite,
    Test,
    Custom,
}

impl_case_insensitive_deserialize!(
    TaskKind,
    Suite => "suite",
    Test => "test",
    Custom => "custom"
);

/// How the runner intends to treat a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    #[default]
    Run,
    Skip,
    Only,
    Todo,
}

impl_case_insensitive_deserialize!(
    TaskMode,
    Run => "run",
    Skip => "skip",
    Only => "only",
    Todo => "todo"
);

impl TaskMode {
    /// Tasks in these modes never execute and are reported as skipped.
    pub fn is_skipped(self) -> bool {
        matches!(self, TaskMode::Skip | TaskMode::Todo)
    }
}

/// Result state carried by a task snapshot
///
/// `Unrecognized` absorbs any value the runner sends that this crate does
/// not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Pass,
    Fail,
    Skip,
    Todo,
    Only,
    Run,
    Unrecognized,
}

impl_case_insensitive_deserialize!(
    TaskState,
    fallback = Unrecognized,
    Pending => "pending",
    Pass => "pass",
    Fail => "fail",
    Skip => "skip",
    Todo => "todo",
    Only => "only",
    Run => "run",
    Run => "running"
);

/// One parsed frame of an error's stack trace, as reported by the runner.
/// Coordinates are one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub file: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub line: Option<u32>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            column: Some(column),
            method: None,
        }
    }
}

/// Serialized error attached to a failed task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default)]
    pub stacks: Vec<StackFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
}

impl TestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Full text used when a suite error is attached to its item: the stack
    /// when the runner captured one, otherwise the message.
    pub fn full_text(&self) -> &str {
        match self.stack.as_deref() {
            Some(stack) if !stack.is_empty() => stack,
            _ => &self.message,
        }
    }
}

/// Snapshot of a task's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub state: TaskState,
    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub errors: Vec<TestError>,
}

impl TaskResult {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            duration: None,
            errors: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_error(mut self, error: TestError) -> Self {
        self.errors.push(error);
        self
    }
}

/// A suite or test case inside a collected file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub mode: TaskMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Task {
    pub fn test(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            name: name.into(),
            kind: TaskKind::Test,
            mode: TaskMode::Run,
            result: None,
            tasks: Vec::new(),
        }
    }

    pub fn suite(id: impl Into<String>, name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            id: TaskId::new(id),
            name: name.into(),
            kind: TaskKind::Suite,
            mode: TaskMode::Run,
            result: None,
            tasks,
        }
    }

    pub fn with_mode(mut self, mode: TaskMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = Some(result);
        self
    }
}

/// Top-level task for a single test file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTask {
    pub id: TaskId,
    pub filepath: PathBuf,
    #[serde(default)]
    pub mode: TaskMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl FileTask {
    pub fn new(id: impl Into<String>, filepath: impl Into<PathBuf>, tasks: Vec<Task>) -> Self {
        Self {
            id: TaskId::new(id),
            filepath: filepath.into(),
            mode: TaskMode::Run,
            result: None,
            tasks,
        }
    }

    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Every suite and case in the file, depth first, parents before children.
    pub fn all_tasks(&self) -> Vec<&Task> {
        fn walk<'a>(tasks: &'a [Task], out: &mut Vec<&'a Task>) {
            for task in tasks {
                out.push(task);
                walk(&task.tasks, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.tasks, &mut out);
        out
    }
}
