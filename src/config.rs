// src/config.rs

//! Runtime configuration
//!
//! Built once at startup from command-line flags (which fall back to the
//! `CHOPSTICKS_*` environment variables) and passed by reference into the
//! command flows.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the repository directory
pub const REPO_ENV: &str = "CHOPSTICKS_REPO";
/// Environment variable overriding the state file path
pub const STATE_ENV: &str = "CHOPSTICKS_STATE";
/// Environment variable enabling dry-run mode
pub const DRY_RUN_ENV: &str = "CHOPSTICKS_DRY_RUN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `<name>/pkg.toml` package definitions
    pub repo_dir: PathBuf,
    /// Installed-state JSON file
    pub state_file: PathBuf,
    /// Print planned actions instead of running them
    pub dry_run: bool,
}

impl Config {
    pub fn new(repo_dir: impl Into<PathBuf>, state_file: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            state_file: state_file.into(),
            dry_run,
        }
    }

    /// Build a config, filling unset paths with the defaults under `~/.config/chopsticks`
    pub fn resolve(
        repo_dir: Option<PathBuf>,
        state_file: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self> {
        let repo_dir = match repo_dir {
            Some(dir) => dir,
            None => default_base_dir()?.join("repo"),
        };
        let state_file = match state_file {
            Some(file) => file,
            None => default_base_dir()?.join("state.json"),
        };
        Ok(Self::new(repo_dir, state_file, dry_run))
    }
}

/// `~/.config/chopsticks`
pub fn default_base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".config").join("chopsticks"))
}
