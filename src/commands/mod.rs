// src/commands/mod.rs

//! Command flows behind the CLI
//!
//! Each flow loads the installed state, asks the resolver for a plan, and
//! runs it package by package through the executor. State is saved after
//! every successfully applied package, so a failure part-way through a
//! plan leaves earlier packages committed. In dry-run mode the planned
//! actions are printed and neither the system nor the state file changes.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::packages::{Operation, Plan};
use crate::repository::{Repository, git};
use crate::resolver::{resolve_install_order, resolve_uninstall_order};
use crate::state::State;
use std::io::Write;
use tracing::{debug, info};

/// Print installed packages (or, with `available`, the repository contents)
pub fn list(config: &Config, available: bool, out: &mut impl Write) -> Result<()> {
    let state = State::load(&config.state_file)?;

    if available {
        let names = Repository::new(&config.repo_dir).available()?;
        if names.is_empty() {
            writeln!(out, "No packages available.")?;
        }
        for name in names {
            match state.get(&name) {
                Some(record) => writeln!(out, "{} [installed {}]", name, record.version)?,
                None => writeln!(out, "{}", name)?,
            }
        }
        return Ok(());
    }

    if state.is_empty() {
        writeln!(out, "No packages installed.")?;
        return Ok(());
    }
    for (name, record) in state.iter() {
        writeln!(
            out,
            "{} {} {}",
            name,
            record.version,
            record.installed_at.to_rfc3339()
        )?;
    }
    Ok(())
}

/// Install `targets` and their dependencies, updating any that are out of date
pub fn install(config: &Config, targets: &[String], out: &mut impl Write) -> Result<()> {
    if targets.is_empty() {
        writeln!(out, "Nothing to install.")?;
        return Ok(());
    }

    let mut state = State::load(&config.state_file)?;
    let repo = Repository::new(&config.repo_dir);

    let plan = resolve_install_order(targets, |name| repo.load(name), &state.versions())?;
    if plan.is_empty() {
        writeln!(out, "All targets are up-to-date.")?;
        return Ok(());
    }

    apply_plan(config, &mut state, plan, out)
}

/// Uninstall exactly `targets`; all of them must currently be installed
pub fn uninstall(config: &Config, targets: &[String], out: &mut impl Write) -> Result<()> {
    if targets.is_empty() {
        writeln!(out, "Nothing to uninstall.")?;
        return Ok(());
    }

    let mut state = State::load(&config.state_file)?;
    let missing: Vec<String> = targets
        .iter()
        .filter(|name| !state.is_installed(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotInstalled(missing));
    }

    let repo = Repository::new(&config.repo_dir);
    let plan = resolve_uninstall_order(targets, |name| repo.load(name), &state.versions())?;

    apply_plan(config, &mut state, plan, out)
}

/// Roll `targets` (or every installed package) forward to the versions the repository reports
pub fn update(config: &Config, targets: &[String], out: &mut impl Write) -> Result<()> {
    let mut state = State::load(&config.state_file)?;

    let targets: Vec<String> = if targets.is_empty() {
        state.iter().map(|(name, _)| name.to_string()).collect()
    } else {
        targets.to_vec()
    };
    if targets.is_empty() {
        writeln!(out, "No packages installed.")?;
        return Ok(());
    }

    let repo = Repository::new(&config.repo_dir);
    let plan: Plan = resolve_install_order(&targets, |name| repo.load(name), &state.versions())?
        .into_iter()
        .filter(|(_, op)| matches!(op, Operation::Update | Operation::Install))
        .collect();
    if plan.is_empty() {
        writeln!(out, "All targets are up-to-date.")?;
        return Ok(());
    }

    apply_plan(config, &mut state, plan, out)
}

/// Pull the package repository and report the new revision
pub fn sync(config: &Config, out: &mut impl Write) -> Result<()> {
    let revision = git::sync(&config.repo_dir)?;
    writeln!(out, "Repository at revision {}", revision)?;
    Ok(())
}

fn apply_plan(config: &Config, state: &mut State, plan: Plan, out: &mut impl Write) -> Result<()> {
    let mut executor = Executor::new();

    for (mut manifest, op) in plan {
        let shown_version = match op {
            Operation::Uninstall => state
                .get(manifest.name())
                .map(|record| record.version.clone())
                .unwrap_or_else(|| manifest.version().to_string()),
            _ => manifest.version().to_string(),
        };
        writeln!(out, "{} {}-{}", verb(op), manifest.name(), shown_version)?;

        if config.dry_run {
            for action in manifest.actions_for(op) {
                writeln!(out, "  DRY-RUN: {}", action.describe())?;
            }
            continue;
        }

        executor.run(manifest.actions_for_mut(op))?;

        match op {
            Operation::Uninstall => state.mark_uninstalled(manifest.name()),
            Operation::Install | Operation::Update => {
                state.mark_installed(manifest.name(), manifest.version())
            }
        }
        state.save()?;
        debug!("Committed {} of {}", op, manifest.name());
    }

    if config.dry_run {
        info!("Dry run: state file left unchanged");
    }
    Ok(())
}

fn verb(op: Operation) -> &'static str {
    match op {
        Operation::Install => "Installing",
        Operation::Update => "Updating",
        Operation::Uninstall => "Uninstalling",
    }
}
