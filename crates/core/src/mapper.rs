//! Translation of task result snapshots into run reports

use std::path::Path;
use std::time::Duration;
use tracing::{error, trace};

use crate::host::{TestMessage, TestRun};
use crate::tree::TestTree;
use crate::types::{same_file, ErrorLocation, StackFrame, TaskResult, TaskState, TestError, TestItem};
use crate::utils::strip_ansi;

/// Value the runner serializes for an absent `actual`/`expected`
const MISSING_VALUE: &str = "undefined";

/// Report `result` for `item` into `run`.
///
/// A missing result means the task has started but has not produced a
/// snapshot yet.
pub fn report_result(
    run: &dyn TestRun,
    tree: &dyn TestTree,
    item: &TestItem,
    result: Option<&TaskResult>,
) {
    let Some(result) = result else {
        run.started(item);
        return;
    };

    let duration = result.duration.and_then(to_duration);
    trace!("Reporting {:?} for {}", result.state, item.id);

    match result.state {
        TaskState::Pass => {
            if item.is_suite() {
                tree.set_error(&item.id, None);
            }
            run.passed(item, duration);
        }
        TaskState::Skip | TaskState::Todo => run.skipped(item),
        TaskState::Pending | TaskState::Only | TaskState::Run => run.started(item),
        TaskState::Fail if item.is_suite() => {
            // Suites cannot show inline failures; the text goes on the item.
            let text = result
                .errors
                .iter()
                .map(|e| strip_ansi(e.full_text()))
                .collect::<Vec<_>>()
                .join("\n");
            tree.set_error(&item.id, (!text.is_empty()).then(|| text.clone()));

            let messages = if text.is_empty() {
                Vec::new()
            } else {
                vec![TestMessage::plain(text)]
            };
            run.errored(item, messages, duration);
        }
        TaskState::Fail => {
            let messages = result
                .errors
                .iter()
                .map(|e| message_for_error(item, e))
                .collect();
            run.failed(item, messages, duration);
        }
        TaskState::Unrecognized => {
            error!("Unrecognized task state for {}, nothing reported", item.id);
        }
    }
}

/// Report a task the runner will not execute (`skip` or `todo` mode).
pub fn report_skipped(run: &dyn TestRun, item: &TestItem) {
    run.skipped(item);
}

/// Build the failure message for one error of a leaf test.
pub fn message_for_error(item: &TestItem, error: &TestError) -> TestMessage {
    let text = strip_ansi(&error.message);

    let mut message = match (present(&error.actual), present(&error.expected)) {
        (Some(actual), Some(expected)) => TestMessage::diff(text, expected, actual),
        _ => TestMessage::plain(text),
    };

    message.location = item
        .file_path()
        .and_then(|file| resolve_location(file, &error.stacks));
    message
}

/// First frame, in order, that points into `file` with usable coordinates.
pub fn resolve_location(file: &Path, frames: &[StackFrame]) -> Option<ErrorLocation> {
    frames.iter().find_map(|frame| {
        if !same_file(&frame.file, file) {
            return None;
        }
        match (frame.line, frame.column) {
            (Some(line), Some(column)) if line > 0 && column > 0 => {
                Some(ErrorLocation::new(file, line - 1, column - 1))
            }
            _ => None,
        }
    })
}

fn present(value: &Option<serde_json::Value>) -> Option<String> {
    match value.as_ref()? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s == MISSING_VALUE => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn to_duration(millis: f64) -> Option<Duration> {
    (millis.is_finite() && millis >= 0.0).then(|| Duration::from_nanos((millis * 1e6).round() as u64))
}
