use std::time::Duration;
use vitest_explorer_core::{ErrorLocation, TestMessage};

use crate::replay::Summary;

/// ` (12ms)` suffix for a report line, empty when unknown
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(duration) => format!(" ({}ms)", duration.as_millis()),
        None => String::new(),
    }
}

/// Editor-style `path:line:column`, one-based
pub fn format_location(location: &ErrorLocation) -> String {
    format!(
        "{}:{}:{}",
        location.path.display(),
        location.line + 1,
        location.column + 1
    )
}

pub fn format_message(message: &TestMessage) -> Vec<String> {
    let mut lines: Vec<String> = message.message.lines().map(str::to_string).collect();
    if let (Some(expected), Some(actual)) = (&message.expected, &message.actual) {
        lines.push(format!("- expected: {expected}"));
        lines.push(format!("+ actual:   {actual}"));
    }
    if let Some(location) = &message.location {
        lines.push(format!("at {}", format_location(location)));
    }
    lines
}

/// Split terminal output into printable lines.
pub fn format_output(text: &str) -> Vec<&str> {
    text.strip_suffix("\r\n")
        .unwrap_or(text)
        .split("\r\n")
        .collect()
}

pub fn format_summary(summary: &Summary) -> String {
    format!(
        "{} runs: {} passed, {} failed, {} errored, {} skipped",
        summary.runs, summary.passed, summary.failed, summary.errored, summary.skipped
    )
}
