//! Engine process boundary.
//!
//! Every engine invocation is described by an [`EngineCommand`] and handed to a [`ProcessRunner`]. The default
//! [`SystemProcessRunner`] spawns real processes; tests substitute a recording runner so the exact sequence of
//! invocations can be asserted without an engine installed.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fully described engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    /// Kept as `OsString` so non-UTF-8 paths reach the engine unchanged
    pub args: Vec<OsString>,
    /// Extra environment variables for the child process
    pub env: Vec<(String, String)>,
}

impl EngineCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Raw value following `flag`, if present.
    pub fn flag_value_os(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a.as_os_str() == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    /// Value following `flag`, if present and valid UTF-8.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.flag_value_os(flag).and_then(OsStr::to_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a.as_os_str() == flag)
    }

    /// Editor method run by this command (`-executeMethod`), if any.
    pub fn execute_method(&self) -> Option<&str> {
        self.flag_value("-executeMethod")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Runs engine commands.
pub trait ProcessRunner {
    /// Run to completion. Returns the exit code, `None` if the process was killed by a signal.
    fn run_and_wait(&mut self, command: &EngineCommand) -> io::Result<Option<i32>>;

    /// Start the process and return immediately.
    fn spawn_detached(&mut self, command: &EngineCommand) -> io::Result<()>;
}

/// Spawns real processes via `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_and_wait(&mut self, command: &EngineCommand) -> io::Result<Option<i32>> {
        // In batch mode the editor writes to -logFile; inherit stdio for anything else it prints
        let status = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.code())
    }

    fn spawn_detached(&mut self, command: &EngineCommand) -> io::Result<()> {
        command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = EngineCommand::new("C:/Program Files/Unity/Editor/Unity.exe")
            .arg("-projectPath")
            .arg("D:/My Project")
            .arg("-quit");
        assert_eq!(
            cmd.to_string(),
            r#""C:/Program Files/Unity/Editor/Unity.exe" -projectPath "D:/My Project" -quit"#
        );
    }

    #[test]
    fn test_flag_value() {
        let cmd = EngineCommand::new("unity")
            .arg("-executeMethod")
            .arg("A.B")
            .arg("-batchmode");
        assert_eq!(cmd.execute_method(), Some("A.B"));
        assert!(cmd.has_flag("-batchmode"));
        assert_eq!(cmd.flag_value("-batchmode"), None);
        assert_eq!(cmd.flag_value("-missing"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_path_arg_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/work/Build/Log\xff.txt"));
        let cmd = EngineCommand::new("unity").arg("-logFile").path_arg(path);

        assert_eq!(cmd.flag_value_os("-logFile"), Some(path.as_os_str()));
        assert_eq!(cmd.flag_value("-logFile"), None);
        assert_eq!(cmd.to_command().get_args().nth(1), Some(path.as_os_str()));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemProcessRunner;
        let ok = EngineCommand::new("sh").arg("-c").arg("exit 0");
        let fail = EngineCommand::new("sh").arg("-c").arg("exit 3");
        assert_eq!(runner.run_and_wait(&ok).unwrap(), Some(0));
        assert_eq!(runner.run_and_wait(&fail).unwrap(), Some(3));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let mut runner = SystemProcessRunner;
        let cmd = EngineCommand::new("/definitely/not/an/engine/binary");
        assert!(runner.run_and_wait(&cmd).is_err());
    }
}
