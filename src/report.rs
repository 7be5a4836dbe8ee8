//! Test result reporting.
//!
//! The engine helper hands parsed results to a `TestReporter` instead of printing them itself. The default
//! [`LogReporter`] emits one log line per formatted failure line, so failures land in both the console and the log
//! file.

use samplebuild_core::{TestFailure, TestResults, TestSummary};

/// Receives parsed test results.
pub trait TestReporter {
    /// Called once per failed test case, in document order
    fn on_failure(&mut self, failure: &TestFailure);

    /// Called after all failures when the results file carried summary counts
    fn on_summary(&mut self, _summary: &TestSummary) {}

    fn on_results(&mut self, results: &TestResults) {
        for failure in &results.failures {
            self.on_failure(failure);
        }
        if let Some(summary) = &results.summary {
            self.on_summary(summary);
        }
    }
}

/// Reports through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl TestReporter for LogReporter {
    fn on_failure(&mut self, failure: &TestFailure) {
        for line in failure.format_lines() {
            tracing::error!("{}", line);
        }
    }

    fn on_summary(&mut self, summary: &TestSummary) {
        if summary.failed > 0 {
            tracing::error!("Tests: {}", summary);
        } else {
            tracing::info!("Tests: {}", summary);
        }
    }
}
