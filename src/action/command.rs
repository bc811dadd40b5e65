// src/action/command.rs

//! Command execution actions
//!
//! Commands always pass `check` and cannot be rolled back; packages that
//! need undo should pair them with a command in the uninstall list.

use crate::action::Action;
use crate::error::{Error, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Run a program with arguments (no shell)
#[derive(Debug, Clone)]
pub struct RunCommand {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
}

impl RunCommand {
    pub fn new(argv: Vec<String>, cwd: Option<PathBuf>) -> Result<Self> {
        if argv.is_empty() {
            return Err(Error::Command("empty command".to_string()));
        }
        Ok(Self { argv, cwd })
    }

    /// Split a command line shell-style, e.g. `git clone "a b"`
    pub fn parse(line: &str, cwd: Option<PathBuf>) -> Result<Self> {
        let argv = shlex::split(line)
            .ok_or_else(|| Error::Command(format!("unbalanced quoting in: {}", line)))?;
        Self::new(argv, cwd)
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl Action for RunCommand {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        let mut cmd = Command::new(&self.argv[0]);
        cmd.args(&self.argv[1..]);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        run_status(&mut cmd, &self.argv.join(" "))
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("RunCommand({})", self.argv.join(" "))
    }
}

/// Run a script through `sh -c`
#[derive(Debug, Clone)]
pub struct RunShell {
    script: String,
    cwd: Option<PathBuf>,
}

impl RunShell {
    pub fn new(script: impl Into<String>, cwd: Option<PathBuf>) -> Self {
        Self {
            script: script.into(),
            cwd,
        }
    }
}

impl Action for RunShell {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.script);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        run_status(&mut cmd, &self.script)
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("RunShell({})", self.script)
    }
}

/// Run `cmd` to completion, failing on spawn errors or a non-zero exit
///
/// The child inherits stdio so interactive tools behave as in a terminal.
pub(crate) fn run_status(cmd: &mut Command, label: &str) -> Result<()> {
    debug!("Running: {}", label);
    let status = cmd
        .status()
        .map_err(|e| Error::Command(format!("{}: {}", label, e)))?;

    if !status.success() {
        return Err(Error::Command(format!("{}: {}", label, status)));
    }
    Ok(())
}

/// Like `run_status`, but feeds `input` to the child's stdin
///
/// A child that exits without reading its input is judged by its exit
/// status alone. The child is always waited on.
pub(crate) fn run_with_input(cmd: &mut Command, input: &[u8], label: &str) -> Result<()> {
    debug!("Running: {}", label);
    let mut child = cmd
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Command(format!("{}: {}", label, e)))?;

    let written = match child.stdin.take() {
        Some(mut stdin) => match stdin.write_all(input) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        },
        None => Ok(()),
    };

    let status = child.wait()?;
    written?;
    if !status.success() {
        return Err(Error::Command(format!("{}: {}", label, status)));
    }
    Ok(())
}

/// Locate a required system tool on `PATH`
pub(crate) fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::Command(format!("{} not found", name)))
}

/// Run `program args...` quietly and report whether it exited successfully
pub(crate) fn succeeds(program: &Path, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
