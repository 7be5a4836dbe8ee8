//! Path variables and `[Name]` substitution.
//!
//! Paths in the build configuration are written relative to named variables, e.g. `[RootDir]/Build`. A value may
//! itself reference other variables; expansion is recursive and resolves on demand, so the table can be filled in any
//! order and later entries may override earlier ones.
//!
//! Only brackets that enclose a valid variable name (`[A-Za-z0-9_]+`) are substituted. Anything else, including an
//! unterminated `[`, is copied through literally.

use std::collections::BTreeMap;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while expanding path variables.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum VarError {
    #[error("unknown path variable '[{name}]'")]
    #[diagnostic(
        code(samplebuild::vars::unknown),
        help("define the variable under [path-vars] in samplebuild.toml")
    )]
    Unknown { name: String },

    #[error("path variable cycle: {}", .chain.join(" -> "))]
    #[diagnostic(code(samplebuild::vars::cycle))]
    Cycle { chain: Vec<String> },
}

/// Table of named path variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars {
    vars: BTreeMap<String, String>,
}

impl PathVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or override) a variable. The value is stored raw and expanded on lookup.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Raw, unexpanded value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay every entry of `other` onto this table.
    pub fn extend<K, V>(&mut self, other: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in other {
            self.set(name, value);
        }
    }

    /// Expand every `[Name]` reference in `input`.
    ///
    /// ## Errors
    ///
    /// - [`VarError::Unknown`] if a referenced variable is not defined.
    /// - [`VarError::Cycle`] if a variable (transitively) references itself.
    pub fn expand(&self, input: &str) -> Result<String, VarError> {
        let mut stack = Vec::new();
        self.expand_inner(input, &mut stack)
    }

    /// Expand `input` and return it as a path.
    pub fn expand_path(&self, input: &str) -> Result<PathBuf, VarError> {
        self.expand(input).map(PathBuf::from)
    }

    fn expand_inner(&self, input: &str, stack: &mut Vec<String>) -> Result<String, VarError> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(']') {
                Some(close) if is_var_name(&after[..close]) => {
                    out.push_str(&self.resolve(&after[..close], stack)?);
                    rest = &after[close + 1..];
                }
                _ => {
                    // Not a reference; keep the bracket and rescan after it
                    out.push('[');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    fn resolve(&self, name: &str, stack: &mut Vec<String>) -> Result<String, VarError> {
        if let Some(pos) = stack.iter().position(|n| n == name) {
            let mut chain = stack[pos..].to_vec();
            chain.push(name.to_string());
            return Err(VarError::Cycle { chain });
        }

        let raw = self.get(name).ok_or_else(|| VarError::Unknown {
            name: name.to_string(),
        })?;

        stack.push(name.to_string());
        let expanded = self.expand_inner(raw, stack);
        stack.pop();
        expanded
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = PathVars::new();
        vars.extend(iter);
        vars
    }
}

fn is_var_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PathVars {
        [
            ("RootDir", "/work/repo"),
            ("BuildDir", "[RootDir]/Build"),
            ("LogPath", "[BuildDir]/Log.txt"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_expand_nested() {
        assert_eq!(sample().expand("[LogPath]").unwrap(), "/work/repo/Build/Log.txt");
    }

    #[test]
    fn test_expand_multiple_in_one_string() {
        let vars = sample();
        assert_eq!(
            vars.expand("[RootDir] and [BuildDir]").unwrap(),
            "/work/repo and /work/repo/Build"
        );
    }

    #[test]
    fn test_override_later_wins() {
        let mut vars = sample();
        vars.set("BuildDir", "/tmp/out");
        assert_eq!(vars.expand("[LogPath]").unwrap(), "/tmp/out/Log.txt");
    }

    #[test]
    fn test_unknown_variable() {
        let err = sample().expand("[UnityExePath]").unwrap_err();
        assert_eq!(
            err,
            VarError::Unknown {
                name: "UnityExePath".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown path variable '[UnityExePath]'");
    }

    #[test]
    fn test_cycle_detected() {
        let vars: PathVars = [("A", "[B]/x"), ("B", "[C]"), ("C", "[A]")].into_iter().collect();
        let err = vars.expand("[A]").unwrap_err();
        assert_eq!(
            err,
            VarError::Cycle {
                chain: vec!["A".into(), "B".into(), "C".into(), "A".into()]
            }
        );
        assert_eq!(err.to_string(), "path variable cycle: A -> B -> C -> A");
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let vars: PathVars = [("A", "[A]")].into_iter().collect();
        assert!(matches!(vars.expand("[A]"), Err(VarError::Cycle { .. })));
    }

    #[test]
    fn test_same_variable_twice_is_not_cycle() {
        let vars: PathVars = [("A", "a"), ("B", "[A][A]")].into_iter().collect();
        assert_eq!(vars.expand("[B]-[A]").unwrap(), "aa-a");
    }

    #[test]
    fn test_non_names_kept_literally() {
        let vars = sample();
        assert_eq!(vars.expand("[]").unwrap(), "[]");
        assert_eq!(vars.expand("a[b c]d").unwrap(), "a[b c]d");
        assert_eq!(vars.expand("open [RootDir").unwrap(), "open [RootDir");
        assert_eq!(vars.expand("[[RootDir]]").unwrap(), "[/work/repo]");
    }

    #[test]
    fn test_expand_path() {
        let path = sample().expand_path("[BuildDir]/TestResults.xml").unwrap();
        assert_eq!(path, PathBuf::from("/work/repo/Build/TestResults.xml"));
    }
}
