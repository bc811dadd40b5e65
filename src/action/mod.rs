// src/action/mod.rs

//! Actions: reversible-intent system mutations
//!
//! Every step of a package's install, uninstall or update list is an
//! `Action`. The executor drives them through `check` → `run`, and calls
//! `rollback` on already-applied actions when a later one fails.
//!
//! Concrete actions keep whatever before-state they need for rollback in
//! private fields captured during `run()`.
//!
//! - Commands: `RunCommand`, `RunShell`
//! - Files and directories: `CreateDir`, `DeleteDir`, `CreateFile`,
//!   `DeleteFile`, `AppendLine`, `RemoveLastLine`
//! - Symlinks: `CreateLink`, `DeleteLink`
//! - System: `SystemdStart`, `SystemdStop`, `UfwAllow`, `UfwDeny`, `PacmanInstall`

pub mod command;
pub mod fs;
pub mod link;
pub mod spec;
pub mod system;

pub use command::{RunCommand, RunShell};
pub use fs::{AppendLine, CreateDir, CreateFile, DeleteDir, DeleteFile, RemoveLastLine};
pub use link::{CreateLink, DeleteLink};
pub use spec::{ActionSpec, CommandLine};
pub use system::{PacmanInstall, SystemdStart, SystemdStop, UfwAllow, UfwDeny};

use crate::error::Result;
use std::fmt;

/// Common interface for all actions
pub trait Action: fmt::Debug {
    /// Whether the action needs to run
    ///
    /// Must not mutate system state and must be safe to call repeatedly.
    /// Returning `false` means the target state is already in place; the
    /// executor skips the action and never rolls it back.
    fn check(&self) -> bool;

    /// Perform the mutation
    ///
    /// On error the action must either have changed nothing or have
    /// recorded enough state for `rollback` to undo the partial change.
    fn run(&mut self) -> Result<()>;

    /// Best-effort undo of a successful `run`
    ///
    /// The executor logs and discards any error returned here.
    fn rollback(&mut self) -> Result<()>;

    /// Human-readable label for logs and dry-run output
    fn describe(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }
}

/// Last path segment of a type name, e.g. `chopsticks::action::fs::CreateDir` → `CreateDir`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
