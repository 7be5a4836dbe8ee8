//! Configuration for samplebuild
//!
//! Settings come from an optional `samplebuild.toml`:
//!
//! ```toml
//! [path-vars]
//! UnityExePath = "D:/Utils/Unity/Unity2017.4.0f1/Editor/Unity.exe"
//! BuildDir = "[RootDir]/out"
//!
//! [engine]
//! builder-class = "Zenject.Internal.SampleBuilder"
//! log-tail-lines = 40
//!
//! [engine.env]
//! ModestTreeBuildConfigOverride = "FromBuildScript"
//! ```
//!
//! Lookup order for the file: `--config`, then `$SAMPLEBUILD_CONFIG`, then `<root>/samplebuild.toml`. When none
//! exists the built-in defaults are used.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use samplebuild_core::{DEFAULT_BUILDER_CLASS, PathVars};
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the root directory.
pub const CONFIG_FILE_NAME: &str = "samplebuild.toml";
/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SAMPLEBUILD_CONFIG";
/// Environment variable that overrides `UnityExePath`.
pub const UNITY_EXE_ENV: &str = "UNITY_EXE_PATH";

const DEFAULT_LOG_TAIL_LINES: usize = 40;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file '{}'", .path.display())]
    #[diagnostic(code(samplebuild::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}'", .path.display())]
    #[diagnostic(code(samplebuild::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parsed `samplebuild.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Overrides and additions to the default path variables
    pub path_vars: BTreeMap<String, String>,
    pub engine: EngineConfig,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Editor class holding the static build functions
    pub builder_class: String,
    /// Engine log lines echoed after a failed run (0 disables)
    pub log_tail_lines: usize,
    /// Environment variables set on every engine process
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            builder_class: DEFAULT_BUILDER_CLASS.to_string(),
            log_tail_lines: DEFAULT_LOG_TAIL_LINES,
            env: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find and load the config file for `root`.
    ///
    /// `explicit` (from `--config`) and `from_env` (from `$SAMPLEBUILD_CONFIG`) must exist when given; the
    /// `<root>/samplebuild.toml` fallback is optional. Returns the config and the file it came from.
    pub fn discover(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        root: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit.or(from_env) {
            return Self::load(path).map(|c| (c, Some(path.to_path_buf())));
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Self::load(&candidate).map(|c| (c, Some(candidate)));
        }

        Ok((Self::default(), None))
    }

    /// Default path variables overlaid with this config and the `UnityExePath` override.
    ///
    /// Precedence, lowest first: built-in defaults, `[path-vars]`, `unity_exe_override`.
    pub fn path_vars(&self, root: &Path, script_dir: &Path, unity_exe_override: Option<&str>) -> PathVars {
        let mut vars = default_path_vars(root, script_dir);
        vars.extend(self.path_vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(exe) = unity_exe_override {
            vars.set("UnityExePath", exe);
        }
        vars
    }
}

/// Built-in path variables. `UnityExePath` has no default.
pub fn default_path_vars(root: &Path, script_dir: &Path) -> PathVars {
    [
        ("ScriptDir", script_dir.to_string_lossy().into_owned()),
        ("RootDir", root.to_string_lossy().into_owned()),
        ("BuildDir", "[RootDir]/Build".to_string()),
        ("LogPath", "[BuildDir]/Log.txt".to_string()),
        ("EngineLogPath", "[BuildDir]/EngineLog.txt".to_string()),
        ("UnityProjectPath", "[RootDir]/UnityProject".to_string()),
        ("SampleBuildsDir", "[RootDir]/SampleBuilds".to_string()),
        ("TestResultsPath", "[BuildDir]/TestResults.xml".to_string()),
    ]
    .into_iter()
    .collect()
}
