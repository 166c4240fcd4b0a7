//! Coverage configuration, report artifact waiting and loading

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{Error, Result};

pub const COVERAGE_REPORT_FILE: &str = "coverage-final.json";
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Coverage settings as reported by the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageConfig {
    pub enabled: bool,
    pub reports_directory: PathBuf,
}

/// Parsed `coverage-final.json`: per-file coverage keyed by absolute path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    pub path: PathBuf,
    pub files: BTreeMap<String, serde_json::Value>,
}

impl CoverageReport {
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let files = serde_json::from_str(&contents).map_err(|e| {
            Error::CoverageError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            files,
        })
    }
}

/// Poll until `file_name` exists under `directory`, giving up after `timeout`.
pub async fn wait_for_report(
    directory: &Path,
    file_name: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<PathBuf> {
    let path = directory.join(file_name);
    let deadline = Instant::now() + timeout;

    loop {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Coverage report found at {}", path.display());
            return Ok(path);
        }
        if Instant::now() >= deadline {
            return Err(Error::CoverageTimeout { path, timeout });
        }
        sleep(poll_interval).await;
    }
}
