use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use vitest_explorer_core::RunnerEvent;

/// Read and parse a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a JSON-lines event transcript.
///
/// Blank lines and lines starting with `//` are skipped.
pub fn read_transcript(path: &Path) -> Result<Vec<RunnerEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_transcript(&contents).with_context(|| format!("Invalid transcript {}", path.display()))
}

fn parse_transcript(contents: &str) -> Result<Vec<RunnerEvent>> {
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("//"))
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("Bad event on line {number}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_skips_comments() {
        let events = parse_transcript(
            r#"
// recorded session
{"event": "finished"}

{"event": "console_log", "content": "hi"}
"#,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_transcript_reports_line() {
        let err = parse_transcript("{\"event\": \"finished\"}\nnope").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
