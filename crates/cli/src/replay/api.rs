use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, info};
use vitest_explorer_core::{
    event_channel, to_wire, CoverageConfig, Error, EventReceiver, Result, RunTarget, RunnerEvent,
    TestRunner, VitestFolderApi,
};

/// Stand-in for a runner process that answers the first run or watch call
/// by emitting a recorded transcript.
pub struct TranscriptApi {
    events: Mutex<Option<Vec<RunnerEvent>>>,
    runner: OnceLock<Weak<TestRunner>>,
    coverage_dir: Option<PathBuf>,
}

impl TranscriptApi {
    pub fn new(events: Vec<RunnerEvent>, coverage_dir: Option<PathBuf>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            runner: OnceLock::new(),
            coverage_dir,
        }
    }

    /// Bind the runner that receives the transcript.
    pub fn attach(&self, runner: &Arc<TestRunner>) {
        if self.runner.set(Arc::downgrade(runner)).is_err() {
            debug!("Transcript already attached to a runner");
        }
    }

    async fn deliver(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) {
        match files {
            Some(files) => info!("Runner asked for {:?} (pattern {:?})", to_wire(files), pattern),
            None => info!("Runner asked for every test (pattern {:?})", pattern),
        }

        let events = self.events.lock().take().unwrap_or_default();
        let Some(runner) = self.runner.get().and_then(Weak::upgrade) else {
            return;
        };
        for event in events {
            runner.handle_event(event).await;
        }
    }
}

#[async_trait]
impl VitestFolderApi for TranscriptApi {
    fn subscribe(&self) -> EventReceiver {
        // Events are delivered directly, so the stream starts closed.
        event_channel().1
    }

    async fn run_files(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) -> Result<()> {
        self.deliver(files, pattern).await;
        Ok(())
    }

    async fn watch_tests(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) -> Result<()> {
        self.deliver(files, pattern).await;
        Ok(())
    }

    async fn unwatch_tests(&self) -> Result<()> {
        debug!("Unwatch requested");
        Ok(())
    }

    async fn cancel_run(&self) -> Result<()> {
        debug!("Cancel requested");
        Ok(())
    }

    async fn enable_coverage(&self) -> Result<()> {
        match self.coverage_dir {
            Some(_) => Ok(()),
            None => Err(Error::CoverageUnavailable(
                "no coverage directory given".to_string(),
            )),
        }
    }

    async fn get_coverage_config(&self) -> Result<CoverageConfig> {
        Ok(CoverageConfig {
            enabled: self.coverage_dir.is_some(),
            reports_directory: self.coverage_dir.clone().unwrap_or_default(),
        })
    }

    async fn stop_inspect(&self) -> Result<()> {
        Ok(())
    }
}
