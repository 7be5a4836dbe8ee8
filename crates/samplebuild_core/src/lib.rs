#![forbid(unsafe_code)]
//! Provide the pure, deterministic pieces of `samplebuild`.
//!
//! This crate is intentionally small and dependency-light. It contains everything the build driver decides *before*
//! touching a process or the file system:
//! - path-variable substitution (`[RootDir]/Build`),
//! - the target platform vocabulary and engine `-buildTarget` names,
//! - the build-type table that maps a build type to the ordered editor functions to invoke,
//! - parsing of the engine's test results XML into failures and a summary.
//!
//! ## Notes
//!
//! - **No IO**, no logging, no global state. The root crate owns processes, files and tracing.
//! - Every editor function name is qualified with a caller-supplied builder class, so the same table works for any
//!   engine project that exposes the expected static methods.

pub mod build_type;
pub mod platform;
pub mod results;
pub mod vars;

pub use build_type::{BuildPlan, BuildType, DotNetRuntime, EditorStep, ScriptingBackend};
pub use platform::Platform;
pub use results::{ResultsError, TestFailure, TestResults, TestSummary};
pub use vars::{PathVars, VarError};

/// Default editor-side class whose static methods are invoked via `-executeMethod`.
pub const DEFAULT_BUILDER_CLASS: &str = "Zenject.Internal.SampleBuilder";
