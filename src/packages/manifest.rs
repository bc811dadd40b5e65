// src/packages/manifest.rs

//! Package manifest and plan operations

use crate::action::Action;
use crate::error::{Error, Result};
use std::fmt;

/// What the orchestrator does with a package in a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Install,
    Update,
    Uninstall,
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Install => "install",
            Operation::Update => "update",
            Operation::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one installable unit
///
/// Constructed by the repository loader (or by tests from in-memory tables).
/// `name` and `version` are validated at construction; the version is an
/// opaque string that is only ever compared for equality.
#[derive(Debug)]
pub struct Manifest {
    name: String,
    version: String,
    dependencies: Vec<String>,
    install: Vec<Box<dyn Action>>,
    uninstall: Vec<Box<dyn Action>>,
    update: Vec<Box<dyn Action>>,
}

impl Manifest {
    /// Create a manifest with no dependencies and no actions
    ///
    /// Fails with `InvalidPackage` if `name` or `version` is empty.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = version.into();

        if name.trim().is_empty() {
            return Err(Error::InvalidPackage {
                name,
                reason: "name must be non-empty".to_string(),
            });
        }
        if version.trim().is_empty() {
            return Err(Error::InvalidPackage {
                name,
                reason: "version must be non-empty".to_string(),
            });
        }

        Ok(Self {
            name,
            version,
            dependencies: Vec::new(),
            install: Vec::new(),
            uninstall: Vec::new(),
            update: Vec::new(),
        })
    }

    /// Stand-in for an installed package whose definition can no longer be loaded
    ///
    /// Built from persisted state alone: no dependencies, no actions. The
    /// recorded name and version go through the same validation as `new`.
    pub fn placeholder(name: &str, version: &str) -> Result<Self> {
        Self::new(name, version)
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_install(mut self, actions: Vec<Box<dyn Action>>) -> Self {
        self.install = actions;
        self
    }

    pub fn with_uninstall(mut self, actions: Vec<Box<dyn Action>>) -> Self {
        self.uninstall = actions;
        self
    }

    pub fn with_update(mut self, actions: Vec<Box<dyn Action>>) -> Self {
        self.update = actions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn install(&self) -> &[Box<dyn Action>] {
        &self.install
    }

    pub fn uninstall(&self) -> &[Box<dyn Action>] {
        &self.uninstall
    }

    pub fn update(&self) -> &[Box<dyn Action>] {
        &self.update
    }

    /// The action list executed for `op`
    pub fn actions_for(&self, op: Operation) -> &[Box<dyn Action>] {
        match op {
            Operation::Install => &self.install,
            Operation::Update => &self.update,
            Operation::Uninstall => &self.uninstall,
        }
    }

    /// Mutable access for the executor, which lets actions record rollback state
    pub fn actions_for_mut(&mut self, op: Operation) -> &mut [Box<dyn Action>] {
        match op {
            Operation::Install => &mut self.install,
            Operation::Update => &mut self.update,
            Operation::Uninstall => &mut self.uninstall,
        }
    }
}
