//! Recording fakes for the orchestrator's collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use vitest_explorer_core::{
    event_channel, to_wire, Config, CoverageConfig, CoverageReport, DebugLauncher, DebugSession,
    ErrorLocation, Error, EventReceiver, EventSender, MemoryTree, Result, RunTarget, RunnerEvent,
    SelectionRequest, TestHost, TestItem, TestMessage, TestRun, TestRunner, VitestFolderApi,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    RunFiles(Option<Vec<String>>, Option<String>),
    WatchTests(Option<Vec<String>>, Option<String>),
    UnwatchTests,
    CancelRun,
    EnableCoverage,
    GetCoverageConfig,
    StopInspect,
}

/// Fake runner API. Scripted events are delivered straight to the attached
/// runner while `run_files` is in flight, like a real process would.
pub struct FakeApi {
    sender: EventSender,
    receiver: Mutex<Option<EventReceiver>>,
    runner: OnceLock<Weak<TestRunner>>,
    pub calls: Mutex<Vec<ApiCall>>,
    script: Mutex<VecDeque<Vec<RunnerEvent>>>,
    pub block_runs: AtomicBool,
    cancel_signal: Notify,
    pub fail_enable_coverage: AtomicBool,
    pub coverage: Mutex<CoverageConfig>,
}

impl FakeApi {
    pub fn new() -> Self {
        let (sender, receiver) = event_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            runner: OnceLock::new(),
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            block_runs: AtomicBool::new(false),
            cancel_signal: Notify::new(),
            fail_enable_coverage: AtomicBool::new(false),
            coverage: Mutex::new(CoverageConfig {
                enabled: false,
                reports_directory: PathBuf::from("/nonexistent/coverage"),
            }),
        }
    }

    pub fn attach(&self, runner: &Arc<TestRunner>) {
        let _ = self.runner.set(Arc::downgrade(runner));
    }

    /// Events delivered during the next `run_files` call.
    pub fn script_run(&self, events: Vec<RunnerEvent>) {
        self.script.lock().push_back(events);
    }

    pub fn send(&self, event: RunnerEvent) {
        self.sender.send(event).unwrap();
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn called(&self, call: &ApiCall) -> bool {
        self.calls.lock().contains(call)
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }

    async fn deliver_script(&self) {
        let script = self.script.lock().pop_front();
        let runner = self.runner.get().and_then(Weak::upgrade);
        if let (Some(events), Some(runner)) = (script, runner) {
            for event in events {
                runner.handle_event(event).await;
            }
        }
    }
}

fn wire(files: Option<&[RunTarget]>) -> Option<Vec<String>> {
    files.map(to_wire)
}

#[async_trait]
impl VitestFolderApi for FakeApi {
    fn subscribe(&self) -> EventReceiver {
        self.receiver
            .lock()
            .take()
            .unwrap_or_else(|| event_channel().1)
    }

    async fn run_files(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) -> Result<()> {
        self.record(ApiCall::RunFiles(wire(files), pattern.map(str::to_string)));
        self.deliver_script().await;
        if self.block_runs.load(Ordering::SeqCst) {
            self.cancel_signal.notified().await;
        }
        Ok(())
    }

    async fn watch_tests(&self, files: Option<&[RunTarget]>, pattern: Option<&str>) -> Result<()> {
        self.record(ApiCall::WatchTests(wire(files), pattern.map(str::to_string)));
        Ok(())
    }

    async fn unwatch_tests(&self) -> Result<()> {
        self.record(ApiCall::UnwatchTests);
        Ok(())
    }

    async fn cancel_run(&self) -> Result<()> {
        self.record(ApiCall::CancelRun);
        self.cancel_signal.notify_one();
        Ok(())
    }

    async fn enable_coverage(&self) -> Result<()> {
        self.record(ApiCall::EnableCoverage);
        if self.fail_enable_coverage.load(Ordering::SeqCst) {
            return Err(Error::CoverageUnavailable("provider missing".to_string()));
        }
        Ok(())
    }

    async fn get_coverage_config(&self) -> Result<CoverageConfig> {
        self.record(ApiCall::GetCoverageConfig);
        Ok(self.coverage.lock().clone())
    }

    async fn stop_inspect(&self) -> Result<()> {
        self.record(ApiCall::StopInspect);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Enqueued(String),
    Started(String),
    Passed(String),
    Failed(String, Vec<TestMessage>),
    Errored(String, Vec<TestMessage>),
    Skipped(String),
    Output(String, Option<String>),
    Coverage(PathBuf),
    Ended,
}

pub struct RecordingRun {
    name: Option<String>,
    pub request: SelectionRequest,
    reports: Mutex<Vec<Report>>,
}

impl RecordingRun {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    pub fn is_ended(&self) -> bool {
        self.reports.lock().contains(&Report::Ended)
    }

    fn push(&self, report: Report) {
        self.reports.lock().push(report);
    }
}

#[async_trait]
impl TestRun for RecordingRun {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn enqueued(&self, item: &TestItem) {
        self.push(Report::Enqueued(item.label.clone()));
    }

    fn started(&self, item: &TestItem) {
        self.push(Report::Started(item.label.clone()));
    }

    fn passed(&self, item: &TestItem, _duration: Option<Duration>) {
        self.push(Report::Passed(item.label.clone()));
    }

    fn failed(&self, item: &TestItem, messages: Vec<TestMessage>, _duration: Option<Duration>) {
        self.push(Report::Failed(item.label.clone(), messages));
    }

    fn errored(&self, item: &TestItem, messages: Vec<TestMessage>, _duration: Option<Duration>) {
        self.push(Report::Errored(item.label.clone(), messages));
    }

    fn skipped(&self, item: &TestItem) {
        self.push(Report::Skipped(item.label.clone()));
    }

    fn append_output(&self, text: &str, _location: Option<&ErrorLocation>, item: Option<&TestItem>) {
        self.push(Report::Output(
            text.to_string(),
            item.map(|item| item.label.clone()),
        ));
    }

    async fn apply_coverage(&self, report: &CoverageReport) -> Result<()> {
        self.push(Report::Coverage(report.path.clone()));
        Ok(())
    }

    fn end(&self) {
        self.push(Report::Ended);
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub runs: Mutex<Vec<Arc<RecordingRun>>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub coverage_supported: AtomicBool,
}

impl RecordingHost {
    pub fn runs(&self) -> Vec<Arc<RecordingRun>> {
        self.runs.lock().clone()
    }

    pub fn run_named(&self, name: &str) -> Option<Arc<RecordingRun>> {
        self.runs
            .lock()
            .iter()
            .find(|run| run.name() == Some(name))
            .cloned()
    }
}

impl TestHost for RecordingHost {
    fn create_run(&self, request: &SelectionRequest, name: Option<String>) -> Arc<dyn TestRun> {
        let run = Arc::new(RecordingRun {
            name,
            request: request.clone(),
            reports: Mutex::new(Vec::new()),
        });
        self.runs.lock().push(Arc::clone(&run));
        run
    }

    fn supports_coverage(&self) -> bool {
        self.coverage_supported.load(Ordering::SeqCst)
    }

    fn show_warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

struct FakeSession {
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl DebugSession for FakeSession {
    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeDebugger {
    pub started: Mutex<Vec<Arc<SelectionRequest>>>,
    pub stops: Arc<AtomicUsize>,
}

#[async_trait]
impl DebugLauncher for FakeDebugger {
    async fn start(
        &self,
        request: Arc<SelectionRequest>,
        _token: CancellationToken,
    ) -> Result<Box<dyn DebugSession>> {
        self.started.lock().push(request);
        Ok(Box::new(FakeSession {
            stops: Arc::clone(&self.stops),
        }))
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub tree: Arc<MemoryTree>,
    pub host: Arc<RecordingHost>,
    pub debugger: Arc<FakeDebugger>,
    pub runner: Arc<TestRunner>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let api = Arc::new(FakeApi::new());
        let tree = Arc::new(MemoryTree::new("/repo"));
        let host = Arc::new(RecordingHost::default());
        let debugger = Arc::new(FakeDebugger::default());
        let runner = TestRunner::new(
            api.clone(),
            tree.clone(),
            host.clone(),
            debugger.clone(),
            config,
        );
        api.attach(&runner);

        Self {
            api,
            tree,
            host,
            debugger,
            runner,
        }
    }

    pub fn file(&self, path: &str) -> TestItem {
        TestItem::file(path)
    }

    pub fn case(&self, file: &str, labels: &[&str]) -> TestItem {
        self.tree
            .find_case(Path::new(file), labels)
            .unwrap_or_else(|| panic!("no case {labels:?} in {file}"))
    }
}

/// Poll `check` until it holds, failing the test after about a second.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}
