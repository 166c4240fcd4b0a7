//! Run orchestration
//!
//! `TestRunner` sits between the editor and one Vitest folder API. It turns
//! editor requests into `run_files`/`watch_tests` calls, and turns the
//! runner's event stream back into per-file runs with pass/fail reports.
//!
//! All mutable state lives in one mutex that is never held across an await.
//! Events are handled one at a time by a single listener task.

use futures::future::join_all;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::api::{EventReceiver, RunnerEvent, VitestFolderApi};
use crate::config::Config;
use crate::coverage::{self, CoverageReport};
use crate::debug::{DebugLauncher, DebugSession};
use crate::error::Result;
use crate::host::{TestHost, TestRun};
use crate::mapper;
use crate::registry::RunRegistry;
use crate::selection::{merge_continuous, SelectionRequest};
use crate::tree::TestTree;
use crate::types::{FileTask, RunTarget, TaskId, TaskResult, TestItem};
use crate::utils::normalize_line_endings;

#[derive(Default)]
struct RunnerState {
    registry: RunRegistry,
    /// The one-shot request currently executing, if any
    active_request: Option<Arc<SelectionRequest>>,
    /// Active watch registrations, in registration order
    continuous: Vec<Arc<SelectionRequest>>,
    debug_session: Option<Box<dyn DebugSession>>,
}

pub struct TestRunner {
    api: Arc<dyn VitestFolderApi>,
    tree: Arc<dyn TestTree>,
    host: Arc<dyn TestHost>,
    debugger: Arc<dyn DebugLauncher>,
    config: Config,
    state: Mutex<RunnerState>,
    shutdown: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TestRunner {
    /// Create the runner and subscribe to the API's event stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        api: Arc<dyn VitestFolderApi>,
        tree: Arc<dyn TestTree>,
        host: Arc<dyn TestHost>,
        debugger: Arc<dyn DebugLauncher>,
        config: Config,
    ) -> Arc<Self> {
        let runner = Arc::new(Self {
            api,
            tree,
            host,
            debugger,
            config,
            state: Mutex::new(RunnerState::default()),
            shutdown: CancellationToken::new(),
            listener: Mutex::new(None),
        });

        let events = runner.api.subscribe();
        let handle = tokio::spawn(Self::listen(
            Arc::downgrade(&runner),
            events,
            runner.shutdown.clone(),
        ));
        *runner.listener.lock() = Some(handle);
        runner
    }

    async fn listen(runner: Weak<Self>, mut events: EventReceiver, shutdown: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let Some(runner) = runner.upgrade() else {
                break;
            };
            runner.handle_event(event).await;
        }
        debug!("Event listener stopped");
    }

    /// Handle one event from the runner process.
    pub async fn handle_event(&self, event: RunnerEvent) {
        match event {
            RunnerEvent::WatcherRerun {
                files,
                trigger,
                collecting,
            } => {
                debug!(
                    "Watcher rerun of {} files (trigger: {:?}, collecting: {collecting})",
                    files.len(),
                    trigger
                );
                if !collecting {
                    self.start_test_run(&files, None);
                }
            }
            RunnerEvent::TaskUpdate { packs } => self.on_task_update(packs),
            RunnerEvent::Collected { files, collecting } => self.on_collected(&files, collecting),
            RunnerEvent::Finished { files } => self.on_finished(&files).await,
            RunnerEvent::ConsoleLog { content, task_id } => {
                self.on_console_log(&content, task_id.as_ref())
            }
        }
    }

    /// Create runs for `files` under the effective request.
    ///
    /// The request is `explicit` if given, else the active one-shot request,
    /// else the merge of all watch registrations. With none of those this is
    /// a no-op. Returns the files that got a new run.
    pub fn start_test_run(
        &self,
        files: &[RunTarget],
        explicit: Option<Arc<SelectionRequest>>,
    ) -> Vec<PathBuf> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let request = match explicit.or_else(|| state.active_request.clone()) {
            Some(request) => request,
            None => match merge_continuous(&state.continuous) {
                Some(merged) => Arc::new(merged),
                None => {
                    debug!("No active request, ignoring run of {} files", files.len());
                    return Vec::new();
                }
            },
        };

        state
            .registry
            .start_run(files, &request, self.tree.as_ref(), self.host.as_ref())
    }

    /// Execute `request` once, or register it as a watch when continuous.
    pub async fn run_tests(
        self: &Arc<Self>,
        request: SelectionRequest,
        token: CancellationToken,
    ) -> Result<()> {
        let request = Arc::new(request);
        if request.continuous {
            return self.watch_continuous(request, token).await;
        }

        self.state.lock().active_request = Some(Arc::clone(&request));

        let handler = {
            let runner = Arc::downgrade(self);
            let request = Arc::clone(&request);
            self.spawn_on_cancel(token, async move {
                let Some(runner) = runner.upgrade() else {
                    return;
                };
                info!("Test run cancelled");
                runner.clear_active_request(&request);
                if let Err(e) = runner.api.cancel_run().await {
                    warn!("Failed to cancel test run: {e}");
                }
            })
        };

        let result = match request.resolve() {
            None => self.api.run_files(None, None).await,
            Some(resolved) => {
                debug!(
                    "Running {} targets with pattern {:?}",
                    resolved.files.len(),
                    resolved.pattern
                );
                self.api
                    .run_files(Some(&resolved.files), resolved.pattern.as_deref())
                    .await
            }
        };

        self.clear_active_request(&request);
        handler.abort();
        result
    }

    /// Enable coverage, then run `request`.
    ///
    /// If coverage cannot be enabled the error is shown and nothing runs.
    /// Coverage stays enabled after the run, including a cancelled one.
    pub async fn run_coverage(
        self: &Arc<Self>,
        request: SelectionRequest,
        token: CancellationToken,
    ) -> Result<()> {
        if let Err(e) = self.api.enable_coverage().await {
            error!("Failed to enable coverage: {e}");
            self.host
                .show_error(&format!("Failed to enable coverage. {e}"));
            return Ok(());
        }

        self.run_tests(request, token).await
    }

    /// Register a watch request and (re)start watching.
    ///
    /// When the token is cancelled the registration is removed; once no
    /// registration remains, watching stops.
    pub async fn watch_continuous_tests(
        self: &Arc<Self>,
        request: SelectionRequest,
        token: CancellationToken,
    ) -> Result<()> {
        self.watch_continuous(Arc::new(request), token).await
    }

    async fn watch_continuous(
        self: &Arc<Self>,
        request: Arc<SelectionRequest>,
        token: CancellationToken,
    ) -> Result<()> {
        self.state.lock().continuous.push(Arc::clone(&request));

        {
            let runner = Arc::downgrade(self);
            let request = Arc::clone(&request);
            self.spawn_on_cancel(token, async move {
                if let Some(runner) = runner.upgrade() {
                    runner.unregister_continuous(&request).await;
                }
            });
        }

        if request.include.is_none() {
            debug!("Watching all tests");
            return self.api.watch_tests(None, None).await;
        }

        let merged = merge_continuous(&self.state.lock().continuous);
        match merged.and_then(|merged| merged.resolve()) {
            Some(resolved) => {
                debug!(
                    "Watching {} targets with pattern {:?}",
                    resolved.files.len(),
                    resolved.pattern
                );
                self.api
                    .watch_tests(Some(&resolved.files), resolved.pattern.as_deref())
                    .await
            }
            // Another registration already watches everything.
            None => self.api.watch_tests(None, None).await,
        }
    }

    async fn unregister_continuous(&self, request: &Arc<SelectionRequest>) {
        let none_left = {
            let mut state = self.state.lock();
            state
                .continuous
                .retain(|registered| !Arc::ptr_eq(registered, request));
            state.continuous.is_empty()
        };

        debug!("Watch request cancelled (none left: {none_left})");
        if none_left {
            if let Err(e) = self.api.unwatch_tests().await {
                warn!("Failed to stop watching: {e}");
            }
        }
    }

    /// Replace any active debug session with one for `request`.
    pub async fn debug_tests(
        self: &Arc<Self>,
        request: SelectionRequest,
        token: CancellationToken,
    ) -> Result<()> {
        if let Err(e) = self.api.stop_inspect().await {
            warn!("Failed to stop inspector: {e}");
        }

        let previous = self.state.lock().debug_session.take();
        if let Some(session) = previous {
            debug!("Stopping previous debug session");
            session.stop().await;
        }

        let session = self.debugger.start(Arc::new(request), token).await?;
        self.state.lock().debug_session = Some(session);
        Ok(())
    }

    /// Stop listening, end every run and forget all requests.
    pub fn dispose(&self) {
        self.shutdown.cancel();
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }

        let mut state = self.state.lock();
        state.registry.clear();
        state.continuous.clear();
        state.active_request = None;
        state.debug_session = None;
    }

    pub fn run_for(&self, file: &Path) -> Option<Arc<dyn TestRun>> {
        self.state.lock().registry.run_for(file)
    }

    pub fn active_run_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn has_active_request(&self) -> bool {
        self.state.lock().active_request.is_some()
    }

    pub fn continuous_count(&self) -> usize {
        self.state.lock().continuous.len()
    }

    pub fn has_debug_session(&self) -> bool {
        self.state.lock().debug_session.is_some()
    }

    fn spawn_on_cancel<F>(&self, token: CancellationToken, on_cancel: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = token.cancelled() => on_cancel.await,
            }
        })
    }

    fn clear_active_request(&self, request: &Arc<SelectionRequest>) {
        let mut state = self.state.lock();
        if state
            .active_request
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, request))
        {
            state.active_request = None;
        }
    }

    fn run_for_item(&self, item: &TestItem) -> Option<Arc<dyn TestRun>> {
        let file = item.file_path()?;
        self.state.lock().registry.run_for(file)
    }

    fn on_task_update(&self, packs: Vec<(TaskId, Option<TaskResult>)>) {
        for (id, result) in packs {
            let Some(item) = self.tree.item_for_task(&id) else {
                error!("Cannot find test item for task {id}");
                continue;
            };
            // Collection without execution produces updates with no run.
            let Some(run) = self.run_for_item(&item) else {
                trace!("No active run for {}", item.id);
                continue;
            };
            mapper::report_result(run.as_ref(), self.tree.as_ref(), &item, result.as_ref());
        }
    }

    fn on_collected(&self, files: &[FileTask], collecting: bool) {
        for file in files {
            self.tree.collect_file(file);
        }
        if collecting {
            return;
        }

        for file in files {
            for task in file.all_tasks() {
                let Some(item) = self.tree.item_for_task(&task.id) else {
                    continue;
                };
                let Some(run) = self.run_for_item(&item) else {
                    continue;
                };
                if task.mode.is_skipped() {
                    mapper::report_skipped(run.as_ref(), &item);
                } else {
                    mapper::report_result(
                        run.as_ref(),
                        self.tree.as_ref(),
                        &item,
                        task.result.as_ref(),
                    );
                }
            }
        }
    }

    async fn on_finished(&self, files: &[FileTask]) {
        if let Err(e) = self.report_coverage(files).await {
            warn!("Failed to report coverage: {e}");
            self.host
                .show_warning(&format!("Failed to report coverage. {e}"));
        }

        for file in files {
            let Some(run) = self.run_for(&file.filepath) else {
                continue;
            };

            if let Some(result) = file.result.as_ref() {
                let item = self
                    .tree
                    .item_for_task(&file.id)
                    .or_else(|| self.tree.file_items(&file.filepath).into_iter().next());
                match item {
                    Some(item) => {
                        mapper::report_result(run.as_ref(), self.tree.as_ref(), &item, Some(result))
                    }
                    None => error!("Cannot find test item for file {}", file.filepath.display()),
                }
            }

            self.state.lock().registry.end_run(&file.filepath);
        }
    }

    async fn report_coverage(&self, files: &[FileTask]) -> Result<()> {
        if !self.host.supports_coverage() {
            return Ok(());
        }

        let config = self.api.get_coverage_config().await?;
        if !config.enabled {
            return Ok(());
        }

        let settings = &self.config.coverage;
        let path = coverage::wait_for_report(
            &config.reports_directory,
            &settings.report_file,
            settings.timeout(),
            settings.poll_interval(),
        )
        .await?;
        let report = CoverageReport::load(&path).await?;

        let runs: Vec<Arc<dyn TestRun>> = {
            let state = self.state.lock();
            files
                .iter()
                .filter_map(|file| state.registry.run_for(&file.filepath))
                .collect()
        };
        debug!("Applying coverage from {} to {} runs", path.display(), runs.len());

        join_all(runs.iter().map(|run| run.apply_coverage(&report)))
            .await
            .into_iter()
            .collect::<Result<Vec<()>>>()?;
        Ok(())
    }

    fn on_console_log(&self, content: &str, task_id: Option<&TaskId>) {
        let target = task_id
            .and_then(|id| self.tree.item_for_task(id))
            .and_then(|item| self.run_for_item(&item).map(|run| (run, item)));

        match target {
            Some((run, item)) => {
                run.append_output(&normalize_line_endings(content), None, Some(&item))
            }
            None => info!(target: "vitest::console", "{}", content.trim_end()),
        }
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
