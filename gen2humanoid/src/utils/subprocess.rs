//! Running the generator and retargeter scripts

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result, bail};
use log::info;

/// A command line kept around for error messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a `--flag value` pair
    pub fn option(self, flag: &str, value: impl Into<OsString>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Run a command in `cwd` with inherited stdio, failing on a non-zero exit
///
/// A child terminated by a signal (Ctrl-C reaches the whole process group)
/// is reported as an interruption.
pub fn run_subprocess(command: &CommandLine, cwd: &Path) -> Result<()> {
    info!("Running `{}` in {}", command.display(), cwd.display());

    let status = Command::new(&command.program)
        .args(&command.args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("Failed to start `{}`", command.display()))?;

    check_status(command, status)
}

fn check_status(command: &CommandLine, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    if status.code().is_none() {
        bail!("Interrupted by user.");
    }
    bail!("Command failed: {} ({})", command.display(), status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display() {
        let command = CommandLine::new("python")
            .arg("local_infer.py")
            .option("--output_dir", "out dir");
        assert_eq!(command.display(), "python local_infer.py --output_dir out dir");
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("sh").option("-c", "touch marker");
        run_subprocess(&command, dir.path()).unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_names_command() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("sh").option("-c", "exit 3");
        let err = run_subprocess(&command, dir.path()).unwrap_err().to_string();
        assert!(err.starts_with("Command failed: sh -c exit 3"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_is_interruption() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("sh").option("-c", "kill -TERM $$");
        let err = run_subprocess(&command, dir.path()).unwrap_err().to_string();
        assert_eq!(err, "Interrupted by user.");
    }

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("g2h-no-such-program");
        assert!(run_subprocess(&command, dir.path()).is_err());
    }
}
