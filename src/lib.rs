#![forbid(unsafe_code)]
//! samplebuild: drive an engine editor in batch mode to produce sample builds
//!
//! The crate is glue around an external process. A run parses flags, expands path variables, invokes the editor
//! executable once per step, reads back the test results file when tests run, and exits with a status code.
//!
//! - [`config`] loads `samplebuild.toml` and provides the default path variables.
//! - [`engine`] builds editor command lines and runs them through a [`engine::ProcessRunner`].
//! - [`cli`] defines the flags and sequences the phases.
//! - Pure pieces (variable expansion, platforms, build plans, results parsing) live in `samplebuild_core`.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `engine` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod engine;
pub mod logging;
pub mod report;
pub mod version;

pub use cli::runner::{RunError, RunOptions, Runner};
pub use config::Config;
pub use engine::{EngineCommand, EngineEditor, EngineError, EngineSettings, ProcessRunner, TestPlatform};
