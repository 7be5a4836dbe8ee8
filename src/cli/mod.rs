//! CLI module for samplebuild
//!
//! This module provides the command-line interface for the build driver.
//!
//! ## Phases
//!
//! - `--clear` - delete the sample build output directory
//! - `--runtime net35|net46` - switch the project's .NET runtime
//! - `--run-tests` - run the editor tests and report failures
//! - `--build` / `--build-type <TYPE>` - run the build plan
//! - `--open-editor` - open the editor on the project
//!
//! ## Modules
//!
//! - `runner` - phase sequencing and the timing/failure wrapper
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Setup functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod runner;

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use samplebuild_core::{BuildType, DotNetRuntime, PathVars, Platform, VarError};

use crate::config::{CONFIG_ENV, Config, UNITY_EXE_ENV};
use crate::engine::{EngineEditor, EngineSettings, SystemProcessRunner, TestPlatform};
use crate::logging;
use crate::version::SAMPLEBUILD_VERSION;

use runner::{RunOptions, Runner};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Failure carrying a rendered diagnostic.
    pub fn diagnostic(err: &dyn Diagnostic) -> Self {
        Self::failure(render_diagnostic(err))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Render a diagnostic without colors, so the same text works on the console and in the log file.
pub(crate) fn render_diagnostic(err: &dyn Diagnostic) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, err).is_err() {
        return err.to_string();
    }
    out.trim_end().to_string()
}

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Drive the engine editor in batch mode to produce sample builds
#[derive(Parser, Debug)]
#[command(name = "samplebuild")]
#[command(version = SAMPLEBUILD_VERSION)]
#[command(about = "Drive the engine editor in batch mode to produce sample builds", long_about = None)]
pub struct Cli {
    /// Build type to produce; may be repeated (implies --build)
    #[arg(short = 't', long = "build-type", value_name = "TYPE")]
    pub build_types: Vec<BuildType>,

    /// Platform for tests, plain builds and the editor
    #[arg(short = 'p', long, value_name = "PLATFORM", default_value = "windows")]
    pub platform: Platform,

    /// Switch the project's .NET runtime before anything else (net35 or net46)
    #[arg(long, value_name = "RUNTIME")]
    pub runtime: Option<DotNetRuntime>,

    /// Delete the sample build output directory first
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Run the editor tests
    #[arg(short = 'r', long = "run-tests")]
    pub run_tests: bool,

    /// Test runner mode (editmode or playmode)
    #[arg(long = "test-platform", value_name = "MODE", default_value = "editmode")]
    pub test_platform: TestPlatform,

    /// Run the build
    #[arg(short = 'b', long)]
    pub build: bool,

    /// Produce development builds instead of release builds
    #[arg(short = 'd', long)]
    pub development: bool,

    /// Open the editor on the project (not combined with a build)
    #[arg(short = 'o', long = "open-editor", conflicts_with_all = ["build", "build_types"])]
    pub open_editor: bool,

    /// Print the build type table and exit
    #[arg(long = "list-build-types", exclusive = true)]
    pub list_build_types: bool,

    /// Config file (default: $SAMPLEBUILD_CONFIG or <root>/samplebuild.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository root used for [RootDir] (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Debug-level console output
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        RunOptions {
            clear: cli.clear,
            runtime: cli.runtime,
            run_tests: cli.run_tests,
            test_platform: cli.test_platform,
            build: cli.build || !cli.build_types.is_empty(),
            build_types: cli.build_types.clone(),
            development: cli.development,
            open_editor: cli.open_editor,
            platform: cli.platform,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All setup
/// returns `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed command line and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if cli.list_build_types {
        print!("{}", build_type_table());
        return Ok(ExitCode::SUCCESS);
    }

    let options = RunOptions::from(&cli);
    if !options.has_work() {
        return Err(CliError::new(
            "Nothing to do: pass at least one of --clear, --runtime, --run-tests, --build, --build-type or --open-editor",
            ExitCode::USAGE,
        ));
    }

    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().map_err(|e| CliError::failure(format!("Cannot determine current directory: {}", e)))?,
    };
    let script_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| root.clone());

    let env_config = env::var_os(CONFIG_ENV).map(PathBuf::from);
    let (config, config_source) =
        Config::discover(cli.config.as_deref(), env_config.as_deref(), &root).map_err(|e| CliError::diagnostic(&e))?;

    let unity_exe = env::var(UNITY_EXE_ENV).ok();
    let vars = config.path_vars(&root, &script_dir, unity_exe.as_deref());

    let log_path = vars.expand_path("[LogPath]").map_err(|e| CliError::diagnostic(&e))?;
    logging::init(cli.verbose, Some(&log_path));

    match &config_source {
        Some(path) => tracing::debug!("Loaded config from {}", path.display()),
        None => tracing::debug!("No config file found, using defaults"),
    }

    let settings = engine_settings(&vars, &config, options.needs_engine()).map_err(|e| CliError::diagnostic(&e))?;
    let engine = EngineEditor::new(SystemProcessRunner, settings);
    let mut runner = Runner::new(options, vars, config.engine.builder_class.clone(), engine);

    if runner.run() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Failure already logged by the runner
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Resolve engine settings from path variables.
///
/// `UnityExePath` is only required when some phase actually launches the engine.
fn engine_settings(vars: &PathVars, config: &Config, needs_engine: bool) -> Result<EngineSettings, VarError> {
    let exe_path = match vars.expand_path("[UnityExePath]") {
        Ok(path) => path,
        Err(VarError::Unknown { name }) if name == "UnityExePath" && !needs_engine => PathBuf::new(),
        Err(e) => return Err(e),
    };

    let env = config
        .engine
        .env
        .iter()
        .map(|(key, value)| -> Result<(String, String), VarError> { Ok((key.clone(), vars.expand(value)?)) })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EngineSettings {
        exe_path,
        log_path: vars.expand_path("[EngineLogPath]")?,
        env,
        log_tail_lines: config.engine.log_tail_lines,
    })
}

/// Text table of build types and what they expand to.
fn build_type_table() -> String {
    let mut out = format!("{:<22} {:<9} {:<8} {}\n", "BUILD TYPE", "PLATFORM", "BACKEND", "RUNTIME");
    for build_type in BuildType::CONCRETE {
        if let Some(config) = build_type.config() {
            let backend = format!("{:?}", config.backend);
            out.push_str(&format!(
                "{:<22} {:<9} {:<8} {}\n",
                build_type.name(),
                config.platform.name(),
                backend,
                config.runtime
            ));
        }
    }
    out.push_str(&format!("{:<22} every build type above, in order\n", BuildType::All.name()));
    out
}

// ============================================================================
// Tests
// ============================================================================
