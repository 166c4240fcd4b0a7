use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use vitest_explorer_core::{Config, ProfileKind, SelectionRequest};

use crate::display::format_summary;
use crate::replay::ReplaySession;
use crate::utils::{read_json, read_transcript};

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub events: PathBuf,
    pub selection: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub coverage_dir: Option<PathBuf>,
}

pub async fn replay_command(options: ReplayOptions) -> Result<()> {
    let events = read_transcript(&options.events)?;
    let mut request = match &options.selection {
        Some(path) => read_json::<SelectionRequest>(path)?,
        None => SelectionRequest::all(),
    };
    // A coverage directory turns a plain run into a coverage run.
    if options.coverage_dir.is_some() && request.profile == ProfileKind::Run {
        request = request.with_profile(ProfileKind::Coverage);
    }

    let root = match options.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let config = Config::discover(&root).context("Failed to load configuration")?;

    println!(
        "🔁 Replaying {} events from {}",
        events.len(),
        options.events.display()
    );

    let session = ReplaySession {
        root,
        config,
        coverage_dir: options.coverage_dir,
    };
    let summary = session.run(events, request).await?;

    let icon = if summary.is_success() { "✅" } else { "❌" };
    println!("\n{icon} {}", format_summary(&summary));
    Ok(())
}
