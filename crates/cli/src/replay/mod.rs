//! Offline replay of a recorded runner session
//!
//! A transcript is fed to a real `TestRunner` through [`TranscriptApi`],
//! with a [`ConsoleHost`] printing every report the orchestrator makes.

mod api;
mod host;

pub use api::TranscriptApi;
pub use host::{ConsoleHost, ConsoleRun, Summary};

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vitest_explorer_core::{
    Config, DebugLauncher, DebugSession, Error, MemoryTree, ProfileKind, RunnerEvent,
    SelectionRequest, TestRunner,
};

/// Debugging needs a live runner process, which a transcript does not have.
struct UnavailableDebugger;

#[async_trait]
impl DebugLauncher for UnavailableDebugger {
    async fn start(
        &self,
        _request: Arc<SelectionRequest>,
        _token: CancellationToken,
    ) -> vitest_explorer_core::Result<Box<dyn DebugSession>> {
        Err(Error::DebugError(
            "debugging is not available while replaying".to_string(),
        ))
    }
}

pub struct ReplaySession {
    pub root: PathBuf,
    pub config: Config,
    pub coverage_dir: Option<PathBuf>,
}

impl ReplaySession {
    /// Execute `request` under its profile while delivering `events` as the
    /// runner's output.
    pub async fn run(self, events: Vec<RunnerEvent>, request: SelectionRequest) -> Result<Summary> {
        let coverage = request.profile == ProfileKind::Coverage;
        let api = Arc::new(TranscriptApi::new(events, self.coverage_dir));
        let tree = Arc::new(MemoryTree::new(self.root));
        let host = Arc::new(ConsoleHost::new(coverage));

        let runner = TestRunner::new(
            api.clone(),
            tree,
            host.clone(),
            Arc::new(UnavailableDebugger),
            self.config,
        );
        api.attach(&runner);

        let token = CancellationToken::new();
        let result = match request.profile {
            ProfileKind::Run => runner.run_tests(request, token).await,
            ProfileKind::Coverage => runner.run_coverage(request, token).await,
            ProfileKind::Debug => runner.debug_tests(request, token).await,
        };
        runner.dispose();
        result?;

        Ok(host.summary())
    }
}
