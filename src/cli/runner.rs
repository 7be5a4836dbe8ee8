//! Build run sequencing
//!
//! A run executes its phases in a fixed order, each gated by a command-line flag:
//!
//! 1. clear the sample build output directory
//! 2. switch the .NET runtime
//! 3. run the editor tests
//! 4. run the build plan, *or* open the editor
//!
//! Every phase blocks until the engine exits. The first failure aborts the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use miette::Diagnostic;
use samplebuild_core::{BuildPlan, BuildType, DotNetRuntime, PathVars, Platform, VarError};
use thiserror::Error;

use crate::engine::{EngineEditor, EngineError, ProcessRunner, TestPlatform};
use crate::logging::heading;
use crate::report::{LogReporter, TestReporter};

use super::render_diagnostic;

/// Errors that abort a run.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vars(#[from] VarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error("cannot clear output directory '{}'", .path.display())]
    #[diagnostic(code(samplebuild::run::clear))]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which phases to run, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub clear: bool,
    pub runtime: Option<DotNetRuntime>,
    pub run_tests: bool,
    pub test_platform: TestPlatform,
    pub build: bool,
    /// Empty means a plain build on `platform`
    pub build_types: Vec<BuildType>,
    pub development: bool,
    pub open_editor: bool,
    pub platform: Platform,
}

impl RunOptions {
    /// True when at least one phase is selected.
    pub fn has_work(&self) -> bool {
        self.clear || self.needs_engine()
    }

    /// True when some phase invokes the engine.
    pub fn needs_engine(&self) -> bool {
        self.runtime.is_some() || self.run_tests || self.build || self.open_editor
    }
}

/// Sequences the phases of a run against an engine editor.
pub struct Runner<R: ProcessRunner> {
    options: RunOptions,
    vars: PathVars,
    builder_class: String,
    engine: EngineEditor<R>,
    reporter: Box<dyn TestReporter>,
}

impl<R: ProcessRunner> Runner<R> {
    pub fn new(options: RunOptions, vars: PathVars, builder_class: impl Into<String>, engine: EngineEditor<R>) -> Self {
        Self {
            options,
            vars,
            builder_class: builder_class.into(),
            engine,
            reporter: Box::new(LogReporter),
        }
    }

    /// Replace the default log reporter.
    pub fn with_reporter(mut self, reporter: Box<dyn TestReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn engine(&self) -> &EngineEditor<R> {
        &self.engine
    }

    /// Run all selected phases, logging the outcome. Returns whether the run succeeded.
    pub fn run(&mut self) -> bool {
        run_wrapped(|| self.run_steps())
    }

    /// Run all selected phases, stopping at the first error.
    pub fn run_steps(&mut self) -> Result<(), RunError> {
        let project = self.vars.expand_path("[UnityProjectPath]")?;

        if self.options.clear {
            heading("Clearing output");
            let dir = self.vars.expand_path("[SampleBuildsDir]")?;
            clear_output(&dir)?;
        }

        if let Some(runtime) = self.options.runtime {
            heading(&format!("Switching runtime to {}", runtime));
            let method = self.qualified(runtime.enable_function());
            self.engine.run_editor_function(&project, &method, Platform::Windows)?;
        }

        if self.options.run_tests {
            heading("Running tests");
            let results_path = self.vars.expand_path("[TestResultsPath]")?;
            self.engine.run_tests(
                &project,
                self.options.platform,
                self.options.test_platform,
                &results_path,
                self.reporter.as_mut(),
            )?;
        }

        if self.options.build {
            heading("Running build");
            let plan = self.plan();
            tracing::debug!("Build plan has {} step(s)", plan.len());
            for step in &plan {
                self.engine.run_editor_function(&project, &step.method, step.platform)?;
            }
        } else if self.options.open_editor {
            heading("Opening editor");
            self.engine.open_editor(&project, self.options.platform)?;
        }

        Ok(())
    }

    /// Editor steps the build phase runs.
    pub fn plan(&self) -> BuildPlan {
        if self.options.build_types.is_empty() {
            BuildPlan::single(self.options.platform, &self.builder_class, self.options.development)
        } else {
            BuildPlan::for_build_types(&self.options.build_types, &self.builder_class, self.options.development)
        }
    }

    fn qualified(&self, function: &str) -> String {
        format!("{}.{}", self.builder_class, function)
    }
}

/// Run `f`, then log how long it took and, on failure, the rendered error.
pub fn run_wrapped<F>(f: F) -> bool
where
    F: FnOnce() -> Result<(), RunError>,
{
    let start = Instant::now();
    let result = f();
    let secs = start.elapsed().as_secs_f64();

    match result {
        Ok(()) => {
            tracing::info!("Operation completed successfully. Took {:.1} seconds.", secs);
            true
        }
        Err(err) => {
            for line in render_diagnostic(&err).lines() {
                tracing::error!("{}", line);
            }
            tracing::error!("Operation failed. Took {:.1} seconds.", secs);
            false
        }
    }
}

/// Delete the output directory if it exists.
fn clear_output(dir: &Path) -> Result<(), RunError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::info!("Deleted {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("Nothing to clear at {}", dir.display());
            Ok(())
        }
        Err(source) => Err(RunError::Clear {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
