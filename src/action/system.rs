// src/action/system.rs

//! System service, firewall and native package actions
//!
//! These shell out to `systemctl`, `ufw` and `pacman`. A missing tool is a
//! run-time failure of the action, not a load-time error, so manifests stay
//! loadable on machines that lack them.

use crate::action::Action;
use crate::action::command::{require_tool, run_status, run_with_input, succeeds};
use crate::error::Result;
use std::process::Command;

fn systemctl(verb: &str, unit: &str) -> Result<()> {
    let tool = require_tool("systemctl")?;
    run_status(
        Command::new(tool).arg(verb).arg(unit),
        &format!("systemctl {} {}", verb, unit),
    )
}

fn ufw(args: &[&str]) -> Result<()> {
    let tool = require_tool("ufw")?;
    // ufw may ask for confirmation; answer yes
    run_with_input(
        Command::new(tool).args(args),
        b"y\n",
        &format!("ufw {}", args.join(" ")),
    )
}

/// Start a systemd unit; rollback stops it
#[derive(Debug, Clone)]
pub struct SystemdStart {
    unit: String,
}

impl SystemdStart {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Action for SystemdStart {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        systemctl("start", &self.unit)
    }

    fn rollback(&mut self) -> Result<()> {
        systemctl("stop", &self.unit)
    }

    fn describe(&self) -> String {
        format!("SystemdStart({})", self.unit)
    }
}

/// Stop a systemd unit; rollback starts it again
#[derive(Debug, Clone)]
pub struct SystemdStop {
    unit: String,
}

impl SystemdStop {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Action for SystemdStop {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        systemctl("stop", &self.unit)
    }

    fn rollback(&mut self) -> Result<()> {
        systemctl("start", &self.unit)
    }

    fn describe(&self) -> String {
        format!("SystemdStop({})", self.unit)
    }
}

/// Add a ufw allow rule, e.g. `22/tcp` or `from 10.0.0.0/8 to any port 22`
#[derive(Debug, Clone)]
pub struct UfwAllow {
    rule: String,
}

impl UfwAllow {
    pub fn new(rule: impl Into<String>) -> Self {
        Self { rule: rule.into() }
    }
}

impl Action for UfwAllow {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        let mut args = vec!["allow"];
        args.extend(self.rule.split_whitespace());
        ufw(&args)
    }

    fn rollback(&mut self) -> Result<()> {
        let mut args = vec!["delete", "allow"];
        args.extend(self.rule.split_whitespace());
        ufw(&args)
    }

    fn describe(&self) -> String {
        format!("UfwAllow({})", self.rule)
    }
}

/// Add a ufw deny rule
#[derive(Debug, Clone)]
pub struct UfwDeny {
    rule: String,
}

impl UfwDeny {
    pub fn new(rule: impl Into<String>) -> Self {
        Self { rule: rule.into() }
    }
}

impl Action for UfwDeny {
    fn check(&self) -> bool {
        true
    }

    fn run(&mut self) -> Result<()> {
        let mut args = vec!["deny"];
        args.extend(self.rule.split_whitespace());
        ufw(&args)
    }

    fn rollback(&mut self) -> Result<()> {
        let mut args = vec!["delete", "deny"];
        args.extend(self.rule.split_whitespace());
        ufw(&args)
    }

    fn describe(&self) -> String {
        format!("UfwDeny({})", self.rule)
    }
}

/// Install native packages with pacman; rollback removes the ones it added
#[derive(Debug, Clone)]
pub struct PacmanInstall {
    packages: Vec<String>,
    added: Vec<String>,
}

impl PacmanInstall {
    pub fn new(packages: Vec<String>) -> Self {
        Self {
            packages,
            added: Vec::new(),
        }
    }

    fn missing(&self) -> Vec<String> {
        let Ok(pacman) = require_tool("pacman") else {
            return self.packages.clone();
        };
        self.packages
            .iter()
            .filter(|pkg| !succeeds(&pacman, &["-Q", pkg.as_str()]))
            .cloned()
            .collect()
    }
}

impl Action for PacmanInstall {
    fn check(&self) -> bool {
        !self.packages.is_empty() && !self.missing().is_empty()
    }

    fn run(&mut self) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }
        let pacman = require_tool("pacman")?;
        run_status(
            Command::new(pacman)
                .args(["-S", "--needed", "--noconfirm"])
                .args(&missing),
            &format!("pacman -S {}", missing.join(" ")),
        )?;
        self.added = missing;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.added.is_empty() {
            return Ok(());
        }
        let pacman = require_tool("pacman")?;
        run_status(
            Command::new(pacman)
                .args(["-Rns", "--noconfirm"])
                .args(&self.added),
            &format!("pacman -Rns {}", self.added.join(" ")),
        )?;
        self.added.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        format!("PacmanInstall({})", self.packages.join(" "))
    }
}
