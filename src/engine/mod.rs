//! Engine editor helper
//!
//! Builds the editor command lines for the three things the build driver does with the engine:
//!
//! - `run_editor_function` - run a static editor method in batch mode and quit
//! - `run_tests` - run the editor test runner and read back its results file
//! - `open_editor` - launch the interactive editor without waiting
//!
//! Processes go through the [`ProcessRunner`] seam in `process.rs`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod process;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use miette::Diagnostic;
use samplebuild_core::{Platform, ResultsError, TestResults};
use thiserror::Error;

use crate::report::TestReporter;

pub use process::{EngineCommand, ProcessRunner, SystemProcessRunner};

/// Errors from engine invocations.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("engine returned error code {} while running: {command}", display_code(.code))]
    #[diagnostic(
        code(samplebuild::engine::exit_code),
        help("the tail of the engine log is logged above; the full log is at EngineLogPath")
    )]
    ReturnedErrorCode { code: Option<i32>, command: String },

    #[error("failed to launch engine: {command}")]
    #[diagnostic(
        code(samplebuild::engine::launch),
        help("check that UnityExePath points at the editor executable")
    )]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{failed} test(s) failed")]
    #[diagnostic(code(samplebuild::engine::tests_failed))]
    TestsFailed { failed: usize },
}

/// Why a results file could not be used. Only ever logged; never replaces the engine outcome.
#[derive(Debug, Error)]
enum ResultsFileError {
    #[error("cannot read test results '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse test results '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ResultsError,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "<killed by signal>".to_string(),
    }
}

/// Which test runner mode the editor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestPlatform {
    #[default]
    EditMode,
    PlayMode,
}

impl TestPlatform {
    /// Value passed to `-testPlatform`.
    pub fn name(self) -> &'static str {
        match self {
            TestPlatform::EditMode => "EditMode",
            TestPlatform::PlayMode => "PlayMode",
        }
    }
}

impl fmt::Display for TestPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editmode" | "edit" => Ok(TestPlatform::EditMode),
            "playmode" | "play" => Ok(TestPlatform::PlayMode),
            _ => Err(format!("unknown test platform '{}' (expected editmode or playmode)", s)),
        }
    }
}

/// Fixed settings for every engine invocation.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Editor executable
    pub exe_path: PathBuf,
    /// Passed to `-logFile` for batch-mode runs
    pub log_path: PathBuf,
    /// Extra environment for the editor process
    pub env: Vec<(String, String)>,
    /// Number of engine log lines echoed after a failed run
    pub log_tail_lines: usize,
}

/// Drives the engine editor through a [`ProcessRunner`].
pub struct EngineEditor<R: ProcessRunner = SystemProcessRunner> {
    runner: R,
    settings: EngineSettings,
}

impl<R: ProcessRunner> EngineEditor<R> {
    pub fn new(runner: R, settings: EngineSettings) -> Self {
        Self { runner, settings }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run a static editor method in batch mode and wait for the editor to quit.
    pub fn run_editor_function(&mut self, project: &Path, method: &str, platform: Platform) -> Result<(), EngineError> {
        tracing::info!("Running {} ({})", method, platform);

        let cmd = self
            .base_command(project, platform)
            .arg("-executeMethod")
            .arg(method)
            .arg("-logFile")
            .path_arg(&self.settings.log_path)
            .arg("-quit")
            .arg("-batchmode")
            .arg("-nographics");

        self.execute(&cmd)
    }

    /// Run the editor test runner and report its results.
    ///
    /// On a non-zero exit the results file is read (if it exists) so individual failures can be reported, and then
    /// the original [`EngineError`] is returned. A missing or unreadable results file never replaces that error.
    pub fn run_tests(
        &mut self,
        project: &Path,
        platform: Platform,
        test_platform: TestPlatform,
        results_path: &Path,
        reporter: &mut dyn TestReporter,
    ) -> Result<Option<TestResults>, EngineError> {
        tracing::info!("Running {} tests ({})", test_platform, platform);

        remove_stale_results(results_path);

        let cmd = self
            .base_command(project, platform)
            .arg("-runTests")
            .arg("-testPlatform")
            .arg(test_platform.name())
            .arg("-testResults")
            .path_arg(results_path)
            .arg("-logFile")
            .path_arg(&self.settings.log_path)
            .arg("-batchmode")
            .arg("-nographics");

        match self.execute(&cmd) {
            Ok(()) => match read_results(results_path) {
                Ok(Some(results)) => {
                    reporter.on_results(&results);
                    if results.all_passed() {
                        Ok(Some(results))
                    } else {
                        let failed = results
                            .summary
                            .map_or(results.failures.len(), |s| s.failed.max(results.failures.len()));
                        Err(EngineError::TestsFailed { failed })
                    }
                }
                Ok(None) => {
                    tracing::warn!("Test results file not found at {}", results_path.display());
                    Ok(None)
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    Ok(None)
                }
            },
            Err(err) => {
                match read_results(results_path) {
                    Ok(Some(results)) => reporter.on_results(&results),
                    Ok(None) => {
                        tracing::warn!("Test results file not found at {}", results_path.display())
                    }
                    Err(e) => tracing::warn!("{}", e),
                }
                Err(err)
            }
        }
    }

    /// Launch the interactive editor on the project and return immediately.
    pub fn open_editor(&mut self, project: &Path, platform: Platform) -> Result<(), EngineError> {
        let cmd = self.base_command(project, platform);
        tracing::debug!(command = %cmd, "spawning engine");

        self.runner
            .spawn_detached(&cmd)
            .map_err(|source| EngineError::Launch {
                command: cmd.to_string(),
                source,
            })
    }

    fn base_command(&self, project: &Path, platform: Platform) -> EngineCommand {
        let mut cmd = EngineCommand::new(self.settings.exe_path.clone())
            .arg("-buildTarget")
            .arg(platform.build_target_arg())
            .arg("-projectPath")
            .path_arg(project);

        for (key, value) in &self.settings.env {
            cmd = cmd.env(key, value);
        }

        cmd
    }

    fn execute(&mut self, cmd: &EngineCommand) -> Result<(), EngineError> {
        tracing::debug!(command = %cmd, "running engine");

        let code = self
            .runner
            .run_and_wait(cmd)
            .map_err(|source| EngineError::Launch {
                command: cmd.to_string(),
                source,
            })?;

        if code == Some(0) {
            return Ok(());
        }

        self.log_engine_tail();
        Err(EngineError::ReturnedErrorCode {
            code,
            command: cmd.to_string(),
        })
    }

    fn log_engine_tail(&self) {
        let lines = self.engine_log_tail();
        if lines.is_empty() {
            return;
        }

        tracing::warn!("Last {} line(s) of {}:", lines.len(), self.settings.log_path.display());
        for line in lines {
            tracing::warn!("  {}", line);
        }
    }

    /// Last `log_tail_lines` lines of the engine log. Empty when disabled or the log cannot be read.
    fn engine_log_tail(&self) -> Vec<String> {
        let count = self.settings.log_tail_lines;
        if count == 0 {
            return Vec::new();
        }

        match fs::read_to_string(&self.settings.log_path) {
            Ok(content) => tail_lines(&content, count).into_iter().map(str::to_string).collect(),
            Err(e) => {
                tracing::debug!("Cannot read engine log {}: {}", self.settings.log_path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Last `count` lines of `content`, ignoring trailing blank lines.
fn tail_lines(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(0, |i| i + 1);
    let start = end.saturating_sub(count);
    lines[start..end].to_vec()
}

fn remove_stale_results(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed stale results file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Cannot remove stale results file {}: {}", path.display(), e),
    }
}

/// Read and parse a results file. `Ok(None)` when the file does not exist.
fn read_results(path: &Path) -> Result<Option<TestResults>, ResultsFileError> {
    if !path.exists() {
        return Ok(None);
    }

    let xml = fs::read_to_string(path).map_err(|source| ResultsFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    TestResults::parse(&xml)
        .map(Some)
        .map_err(|source| ResultsFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
