use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use vitest_explorer_core::{
    CoverageReport, ErrorLocation, Result, SelectionRequest, TestHost, TestItem, TestMessage,
    TestRun,
};

use crate::display::{format_duration, format_message, format_output};

/// Counts of every report made during a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub runs: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub coverage_reports: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.errors.is_empty()
    }
}

pub struct ConsoleHost {
    coverage: bool,
    summary: Arc<Mutex<Summary>>,
}

impl ConsoleHost {
    pub fn new(coverage: bool) -> Self {
        Self {
            coverage,
            summary: Arc::new(Mutex::new(Summary::default())),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary.lock().clone()
    }
}

impl TestHost for ConsoleHost {
    fn create_run(&self, _request: &SelectionRequest, name: Option<String>) -> Arc<dyn TestRun> {
        let name = name.unwrap_or_else(|| "tests".to_string());
        println!("📂 {name}");
        self.summary.lock().runs += 1;
        Arc::new(ConsoleRun {
            name,
            summary: Arc::clone(&self.summary),
        })
    }

    fn supports_coverage(&self) -> bool {
        self.coverage
    }

    fn show_warning(&self, message: &str) {
        eprintln!("⚠️  {message}");
        self.summary.lock().warnings.push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        eprintln!("❌ {message}");
        self.summary.lock().errors.push(message.to_string());
    }
}

/// Prints each report for one file's run
pub struct ConsoleRun {
    name: String,
    summary: Arc<Mutex<Summary>>,
}

impl ConsoleRun {
    fn print_messages(messages: &[TestMessage]) {
        for message in messages {
            for line in format_message(message) {
                println!("      {line}");
            }
        }
    }
}

#[async_trait]
impl TestRun for ConsoleRun {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn enqueued(&self, item: &TestItem) {
        tracing::trace!("Enqueued {}", item.id);
    }

    fn started(&self, item: &TestItem) {
        println!("   ▶️  {}", item.label);
    }

    fn passed(&self, item: &TestItem, duration: Option<Duration>) {
        println!("   ✅ {}{}", item.label, format_duration(duration));
        self.summary.lock().passed += 1;
    }

    fn failed(&self, item: &TestItem, messages: Vec<TestMessage>, duration: Option<Duration>) {
        println!("   ❌ {}{}", item.label, format_duration(duration));
        Self::print_messages(&messages);
        self.summary.lock().failed += 1;
    }

    fn errored(&self, item: &TestItem, messages: Vec<TestMessage>, duration: Option<Duration>) {
        println!("   💥 {}{}", item.label, format_duration(duration));
        Self::print_messages(&messages);
        self.summary.lock().errored += 1;
    }

    fn skipped(&self, item: &TestItem) {
        println!("   ⏭️  {}", item.label);
        self.summary.lock().skipped += 1;
    }

    fn append_output(&self, text: &str, _location: Option<&ErrorLocation>, item: Option<&TestItem>) {
        let label = item.map(|item| item.label.as_str()).unwrap_or(&self.name);
        for line in format_output(text) {
            println!("   │ [{label}] {line}");
        }
    }

    async fn apply_coverage(&self, report: &CoverageReport) -> Result<()> {
        println!(
            "   📊 Coverage for {} files from {}",
            report.files.len(),
            report.path.display()
        );
        self.summary.lock().coverage_reports += 1;
        Ok(())
    }

    fn end(&self) {
        println!("🏁 {} done", self.name);
    }
}
