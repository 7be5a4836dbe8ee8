//! Target platforms understood by the build driver.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A platform the engine editor can switch to and build for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Windows,
    WebGl,
    Android,
    Ios,
    OsX,
    Linux,
    /// Universal Windows Platform (Windows Store apps)
    WindowsStoreApp,
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform '{name}' (expected one of: {})", Platform::NAMES.join(", "))]
pub struct UnknownPlatform {
    pub name: String,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Windows,
        Platform::WebGl,
        Platform::Android,
        Platform::Ios,
        Platform::OsX,
        Platform::Linux,
        Platform::WindowsStoreApp,
    ];

    /// Command-line spellings, in the same order as [`Platform::ALL`].
    pub const NAMES: [&'static str; 7] = ["windows", "webgl", "android", "ios", "osx", "linux", "uwp"];

    /// Command-line spelling of this platform.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::WebGl => "webgl",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::OsX => "osx",
            Platform::Linux => "linux",
            Platform::WindowsStoreApp => "uwp",
        }
    }

    /// Value passed to the editor's `-buildTarget` flag.
    pub fn build_target_arg(self) -> &'static str {
        match self {
            Platform::Windows => "win64",
            Platform::WebGl => "webgl",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::OsX => "osx",
            Platform::Linux => "linux64",
            Platform::WindowsStoreApp => "wsaplayer",
        }
    }

    /// Whether the scripting backend (Mono vs IL2CPP) can be selected for this platform.
    ///
    /// WebGL and iOS only ship with IL2CPP.
    pub fn supports_backend_choice(self) -> bool {
        !matches!(self, Platform::WebGl | Platform::Ios)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or(UnknownPlatform { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_align_with_all() {
        for (platform, name) in Platform::ALL.iter().zip(Platform::NAMES) {
            assert_eq!(platform.name(), name);
            assert_eq!(name.parse::<Platform>().unwrap(), *platform);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WebGL".parse::<Platform>().unwrap(), Platform::WebGl);
        assert_eq!(" UWP ".parse::<Platform>().unwrap(), Platform::WindowsStoreApp);
    }

    #[test]
    fn test_unknown_platform_lists_choices() {
        let err = "switch".parse::<Platform>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown platform 'switch' (expected one of: windows, webgl, android, ios, osx, linux, uwp)"
        );
    }

    #[test]
    fn test_default_is_windows() {
        assert_eq!(Platform::default(), Platform::Windows);
        assert_eq!(Platform::default().build_target_arg(), "win64");
    }

    #[test]
    fn test_backend_choice() {
        assert!(Platform::Windows.supports_backend_choice());
        assert!(Platform::WindowsStoreApp.supports_backend_choice());
        assert!(!Platform::WebGl.supports_backend_choice());
        assert!(!Platform::Ios.supports_backend_choice());
    }
}
