//! Engine test results (NUnit 3 XML) parsing.
//!
//! The engine's test runner writes a `test-run` document:
//!
//! ```xml
//! <test-run total="2" passed="1" failed="1" skipped="0">
//!   <test-suite name="Tests" result="Failed">
//!     <failure><message>One or more child tests had errors</message></failure>
//!     <test-case name="TestFoo" fullname="Tests.TestFoo" result="Failed">
//!       <failure>
//!         <message><![CDATA[Expected: 1 But was: 2]]></message>
//!         <stack-trace><![CDATA[at Tests.TestFoo () in TestFoo.cs:12]]></stack-trace>
//!       </failure>
//!     </test-case>
//!   </test-suite>
//! </test-run>
//! ```
//!
//! Only `failure` nodes that are direct children of a `test-case` count. Suites carry aggregate failure markers that
//! would otherwise duplicate every failed case.

use std::fmt;

use miette::Diagnostic;
use roxmltree::Node;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ResultsError {
    #[error("malformed test results XML: {0}")]
    #[diagnostic(code(samplebuild::results::xml))]
    Xml(#[from] roxmltree::Error),
}

/// A single failed test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    /// `fullname` of the test case, falling back to `name`
    pub name: String,
    pub message: String,
    pub stack_trace: Option<String>,
}

/// Counts reported on the `test-run` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything the build driver needs from a results file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestResults {
    pub failures: Vec<TestFailure>,
    pub summary: Option<TestSummary>,
}

impl TestResults {
    /// Parse the contents of a results file.
    pub fn parse(xml: &str) -> Result<Self, ResultsError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();

        let summary = if root.has_tag_name("test-run") {
            TestSummary::from_node(root)
        } else {
            None
        };

        let failures = doc
            .descendants()
            .filter(|n| n.has_tag_name("test-case"))
            .filter_map(failure_of)
            .collect();

        Ok(Self { failures, summary })
    }

    /// True when no test case failed and the summary (if any) agrees.
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty() && self.summary.is_none_or(|s| s.failed == 0)
    }
}

impl TestSummary {
    /// Counts from the `test-run` attributes. `None` only when none of them is present; missing ones read as 0.
    fn from_node(node: Node<'_, '_>) -> Option<Self> {
        let count = |attr: &str| node.attribute(attr).and_then(|v| v.trim().parse::<usize>().ok());

        let (total, passed, failed, skipped) = (count("total"), count("passed"), count("failed"), count("skipped"));
        if total.is_none() && passed.is_none() && failed.is_none() && skipped.is_none() {
            return None;
        }

        Some(Self {
            total: total.unwrap_or(0),
            passed: passed.unwrap_or(0),
            failed: failed.unwrap_or(0),
            skipped: skipped.unwrap_or(0),
        })
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} passed, {} failed, {} skipped",
            self.total, self.passed, self.failed, self.skipped
        )
    }
}

impl TestFailure {
    /// Lines logged for this failure: a header, the indented message, then the stack trace if any.
    pub fn format_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Test failed: {}", self.name)];

        if self.message.is_empty() {
            lines.push("    (no message)".to_string());
        } else {
            lines.extend(self.message.lines().map(|l| format!("    {}", l.trim_end())));
        }

        if let Some(trace) = &self.stack_trace {
            lines.push("  Stack trace:".to_string());
            lines.extend(trace.lines().map(|l| format!("    {}", l.trim())));
        }

        lines
    }
}

fn failure_of(case: Node<'_, '_>) -> Option<TestFailure> {
    let failure = case.children().find(|c| c.has_tag_name("failure"))?;

    let name = case
        .attribute("fullname")
        .or_else(|| case.attribute("name"))
        .unwrap_or("<unnamed>")
        .to_string();

    Some(TestFailure {
        name,
        message: child_text(failure, "message").unwrap_or_default(),
        stack_trace: child_text(failure, "stack-trace"),
    })
}

/// Trimmed text (including CDATA) of the first `tag` child, `None` when absent or blank.
fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    let child = node.children().find(|c| c.has_tag_name(tag))?;
    let text: String = child
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
