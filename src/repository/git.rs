// src/repository/git.rs

//! Git synchronisation of the package repository

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, info};

fn git(repo_dir: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {} (in {})", args.join(" "), repo_dir.display());
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::Git(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(format!(
            "git {} failed ({}): {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

/// Fast-forward the checkout at `repo_dir` and return the resulting HEAD revision
pub fn sync(repo_dir: &Path) -> Result<String> {
    if !repo_dir.is_dir() {
        return Err(Error::Git(format!(
            "repository directory does not exist: {}",
            repo_dir.display()
        )));
    }

    info!("Pulling package repository at {}", repo_dir.display());
    git(repo_dir, &["pull", "--ff-only"])?;
    head_revision(repo_dir)
}

/// Current HEAD commit id
pub fn head_revision(repo_dir: &Path) -> Result<String> {
    let output = git(repo_dir, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Contents of `path` (relative to the repository root) as of `rev`
pub fn read_file_at_revision(repo_dir: &Path, rev: &str, path: &str) -> Result<Vec<u8>> {
    let spec = format!("{}:{}", rev, path);
    let output = git(repo_dir, &["show", &spec])?;
    Ok(output.stdout)
}
