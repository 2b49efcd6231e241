//! Running an out-of-process compiler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::error::{BackendError, Result};

/// A command prefix such as `asc` or `npx asc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub path: PathBuf,
    pub leading_args: Vec<OsString>,
}

impl Program {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            leading_args: Vec::new(),
        }
    }

    /// Split a whitespace-separated command line into a program and its
    /// leading arguments. An empty command line falls back to `default`.
    pub fn from_command_line(command: &str, default: &str) -> Self {
        let mut words = command.split_whitespace();
        let mut program = Self::new(words.next().unwrap_or(default));
        program.leading_args.extend(words.map(OsString::from));
        program
    }

    pub fn display(&self) -> String {
        let mut shown = self.path.display().to_string();
        for arg in &self.leading_args {
            shown.push(' ');
            shown.push_str(&arg.to_string_lossy());
        }
        shown
    }

    /// Run to completion in `cwd`, capturing both output streams.
    pub async fn run(&self, args: &[OsString], cwd: Option<&Path>) -> Result<Finished> {
        let mut command = Command::new(&self.path);
        command
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let output = command.output().await.map_err(|source| BackendError::Launch {
            program: self.display(),
            source,
        })?;

        Ok(Finished {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Captured result of a finished compiler process.
#[derive(Debug)]
pub struct Finished {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The compiler's diagnostic stream. Some toolchains report on stdout.
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim_end()
        } else {
            self.stderr.trim_end()
        }
    }

    /// A one-line summary of the failure: the last line the compiler
    /// printed, or the exit status when it printed nothing.
    pub fn summary(&self) -> String {
        self.diagnostics()
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("compiler exited with {}", self.status))
    }
}
