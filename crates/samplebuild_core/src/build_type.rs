//! Build types and the editor-function table they expand to.
//!
//! A build type pins down one sample build configuration: the target [`Platform`], the scripting backend and the
//! .NET runtime version. Running a build type means invoking a fixed sequence of static editor functions on the
//! builder class:
//!
//! 1. `<class>.EnableNet35` / `<class>.EnableNet46` on Windows. The runtime switch is a project setting and does not
//!    need the target platform to be active, so it always runs against the Windows target.
//! 2. `<class>.EnableBackendMono` / `<class>.EnableBackendIl2Cpp` on the target platform, only when the platform lets
//!    the backend be chosen.
//! 3. `<class>.BuildRelease` (or `<class>.BuildDebug` for development builds) on the target platform.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::platform::Platform;

/// Scripting backend the player is compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptingBackend {
    Mono,
    Il2Cpp,
}

impl ScriptingBackend {
    /// Unqualified editor function that selects this backend.
    pub fn enable_function(self) -> &'static str {
        match self {
            ScriptingBackend::Mono => "EnableBackendMono",
            ScriptingBackend::Il2Cpp => "EnableBackendIl2Cpp",
        }
    }
}

/// Scripting runtime (.NET profile) the project is switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotNetRuntime {
    Net35,
    Net46,
}

/// Error returned when a runtime name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown .NET runtime '{name}' (expected net35 or net46)")]
pub struct UnknownRuntime {
    pub name: String,
}

impl DotNetRuntime {
    /// Unqualified editor function that switches the project to this runtime.
    pub fn enable_function(self) -> &'static str {
        match self {
            DotNetRuntime::Net35 => "EnableNet35",
            DotNetRuntime::Net46 => "EnableNet46",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DotNetRuntime::Net35 => "net35",
            DotNetRuntime::Net46 => "net46",
        }
    }
}

impl fmt::Display for DotNetRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DotNetRuntime {
    type Err = UnknownRuntime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "net35" | "cs35" => Ok(DotNetRuntime::Net35),
            "net46" | "cs46" => Ok(DotNetRuntime::Net46),
            _ => Err(UnknownRuntime { name: s.to_string() }),
        }
    }
}

/// A named sample build configuration, or `All` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    WindowsMonoNet35,
    WindowsMonoNet46,
    WindowsIl2CppNet46,
    WebGlNet35,
    WebGlNet46,
    UwpIl2CppNet46,
    All,
}

/// Error returned when a build type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown build type '{name}' (expected one of: {})", BuildType::NAMES.join(", "))]
pub struct UnknownBuildType {
    pub name: String,
}

/// Build configuration of a single (non-`All`) build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    pub platform: Platform,
    pub backend: ScriptingBackend,
    pub runtime: DotNetRuntime,
}

impl BuildType {
    /// Every concrete build type, in the order `All` runs them.
    pub const CONCRETE: [BuildType; 6] = [
        BuildType::WindowsMonoNet35,
        BuildType::WindowsMonoNet46,
        BuildType::WindowsIl2CppNet46,
        BuildType::WebGlNet35,
        BuildType::WebGlNet46,
        BuildType::UwpIl2CppNet46,
    ];

    pub const NAMES: [&'static str; 7] = [
        "windows-mono-net35",
        "windows-mono-net46",
        "windows-il2cpp-net46",
        "webgl-net35",
        "webgl-net46",
        "uwp-il2cpp-net46",
        "all",
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuildType::WindowsMonoNet35 => "windows-mono-net35",
            BuildType::WindowsMonoNet46 => "windows-mono-net46",
            BuildType::WindowsIl2CppNet46 => "windows-il2cpp-net46",
            BuildType::WebGlNet35 => "webgl-net35",
            BuildType::WebGlNet46 => "webgl-net46",
            BuildType::UwpIl2CppNet46 => "uwp-il2cpp-net46",
            BuildType::All => "all",
        }
    }

    /// Platform, backend and runtime for a concrete build type. `None` for `All`.
    pub fn config(self) -> Option<BuildConfig> {
        use DotNetRuntime::*;
        use ScriptingBackend::*;

        let (platform, backend, runtime) = match self {
            BuildType::WindowsMonoNet35 => (Platform::Windows, Mono, Net35),
            BuildType::WindowsMonoNet46 => (Platform::Windows, Mono, Net46),
            BuildType::WindowsIl2CppNet46 => (Platform::Windows, Il2Cpp, Net46),
            BuildType::WebGlNet35 => (Platform::WebGl, Il2Cpp, Net35),
            BuildType::WebGlNet46 => (Platform::WebGl, Il2Cpp, Net46),
            BuildType::UwpIl2CppNet46 => (Platform::WindowsStoreApp, Il2Cpp, Net46),
            BuildType::All => return None,
        };

        Some(BuildConfig {
            platform,
            backend,
            runtime,
        })
    }

    /// Concrete build types this entry stands for.
    pub fn expand(self) -> Vec<BuildType> {
        match self {
            BuildType::All => BuildType::CONCRETE.to_vec(),
            other => vec![other],
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildType {
    type Err = UnknownBuildType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        BuildType::CONCRETE
            .into_iter()
            .chain(std::iter::once(BuildType::All))
            .find(|t| t.name() == lower)
            .ok_or(UnknownBuildType { name: s.to_string() })
    }
}

/// One editor invocation: a fully qualified static method run against a target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStep {
    pub method: String,
    pub platform: Platform,
}

impl EditorStep {
    pub fn new(class: &str, function: &str, platform: Platform) -> Self {
        Self {
            method: format!("{}.{}", class, function),
            platform,
        }
    }
}

impl fmt::Display for EditorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.method, self.platform)
    }
}

/// Ordered list of editor invocations for a build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    steps: Vec<EditorStep>,
}

impl BuildPlan {
    /// Plan for the given build types, in order, with `All` expanded.
    pub fn for_build_types(types: &[BuildType], class: &str, development: bool) -> Self {
        let mut steps = Vec::new();

        for build_type in types.iter().flat_map(|t| t.expand()) {
            let Some(config) = build_type.config() else {
                continue;
            };

            steps.push(EditorStep::new(
                class,
                config.runtime.enable_function(),
                Platform::Windows,
            ));

            if config.platform.supports_backend_choice() {
                steps.push(EditorStep::new(class, config.backend.enable_function(), config.platform));
            }

            steps.push(EditorStep::new(class, build_function(development), config.platform));
        }

        Self { steps }
    }

    /// Plan for a plain build of the current project settings on one platform.
    pub fn single(platform: Platform, class: &str, development: bool) -> Self {
        Self {
            steps: vec![EditorStep::new(class, build_function(development), platform)],
        }
    }

    pub fn steps(&self) -> &[EditorStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

impl<'a> IntoIterator for &'a BuildPlan {
    type Item = &'a EditorStep;
    type IntoIter = std::slice::Iter<'a, EditorStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

fn build_function(development: bool) -> &'static str {
    if development { "BuildDebug" } else { "BuildRelease" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASS: &str = "Samples.Builder";

    fn methods(plan: &BuildPlan) -> Vec<(&str, Platform)> {
        plan.steps().iter().map(|s| (s.method.as_str(), s.platform)).collect()
    }

    #[test]
    fn test_windows_mono_net35_plan() {
        let plan = BuildPlan::for_build_types(&[BuildType::WindowsMonoNet35], CLASS, false);
        assert_eq!(
            methods(&plan),
            vec![
                ("Samples.Builder.EnableNet35", Platform::Windows),
                ("Samples.Builder.EnableBackendMono", Platform::Windows),
                ("Samples.Builder.BuildRelease", Platform::Windows),
            ]
        );
    }

    #[test]
    fn test_webgl_skips_backend_step() {
        let plan = BuildPlan::for_build_types(&[BuildType::WebGlNet46], CLASS, false);
        assert_eq!(
            methods(&plan),
            vec![
                ("Samples.Builder.EnableNet46", Platform::Windows),
                ("Samples.Builder.BuildRelease", Platform::WebGl),
            ]
        );
    }

    #[test]
    fn test_development_uses_build_debug() {
        let plan = BuildPlan::single(Platform::Linux, CLASS, true);
        assert_eq!(methods(&plan), vec![("Samples.Builder.BuildDebug", Platform::Linux)]);
    }

    #[test]
    fn test_all_expands_in_table_order() {
        let plan = BuildPlan::for_build_types(&[BuildType::All], CLASS, false);
        let builds: Vec<Platform> = plan
            .steps()
            .iter()
            .filter(|s| s.method.ends_with(".BuildRelease"))
            .map(|s| s.platform)
            .collect();
        assert_eq!(
            builds,
            vec![
                Platform::Windows,
                Platform::Windows,
                Platform::Windows,
                Platform::WebGl,
                Platform::WebGl,
                Platform::WindowsStoreApp,
            ]
        );
        // 4 types with a backend step (3 steps each), 2 WebGL types (2 steps each)
        assert_eq!(plan.len(), 4 * 3 + 2 * 2);
    }

    #[test]
    fn test_parse_build_type() {
        for name in BuildType::NAMES {
            assert_eq!(name.parse::<BuildType>().unwrap().name(), name);
        }
        assert!("windows".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_parse_runtime_accepts_legacy_spelling() {
        assert_eq!("cs35".parse::<DotNetRuntime>().unwrap(), DotNetRuntime::Net35);
        assert_eq!("NET46".parse::<DotNetRuntime>().unwrap(), DotNetRuntime::Net46);
        assert!("net48".parse::<DotNetRuntime>().is_err());
    }
}
