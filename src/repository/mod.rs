// src/repository/mod.rs

//! Package repository
//!
//! The repository is a directory (usually a git checkout) holding one
//! subdirectory per package, each with a `pkg.toml` definition:
//!
//! ```text
//! <repo>/
//!   kitty/pkg.toml
//!   neovim/pkg.toml
//! ```
//!
//! ```toml
//! name = "neovim"
//! version = "1.0.0"
//! dependencies = ["js", "maplemono"]
//!
//! [[install]]
//! action = "pacman_install"
//! packages = ["neovim", "lazygit"]
//! ```
//!
//! This module provides the lookup function handed to the resolver;
//! `git` handles synchronising the checkout.

pub mod git;

use crate::action::{Action, ActionSpec};
use crate::error::{Error, Result};
use crate::packages::Manifest;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of a package definition inside its directory
pub const DEFINITION_FILE: &str = "pkg.toml";

/// Raw `pkg.toml` contents
#[derive(Debug, Deserialize)]
struct PackageDefinition {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    install: Vec<ActionSpec>,
    #[serde(default)]
    uninstall: Vec<ActionSpec>,
    #[serde(default)]
    update: Vec<ActionSpec>,
}

fn build_actions(specs: Vec<ActionSpec>) -> Result<Vec<Box<dyn Action>>> {
    specs.into_iter().map(ActionSpec::into_action).collect()
}

/// Parse a package definition into a manifest
///
/// `expected_name` is the directory name the definition was found under;
/// a definition declaring a different name is rejected.
pub fn parse_definition(expected_name: &str, input: &str) -> Result<Manifest> {
    let invalid = |reason: String| Error::InvalidPackage {
        name: expected_name.to_string(),
        reason,
    };

    let definition: PackageDefinition =
        toml::from_str(input).map_err(|e| invalid(e.to_string()))?;

    if definition.name != expected_name {
        return Err(invalid(format!(
            "definition declares name '{}'",
            definition.name
        )));
    }

    let manifest = Manifest::new(definition.name, definition.version)?
        .with_dependencies(definition.dependencies)
        .with_install(build_actions(definition.install).map_err(|e| invalid(e.to_string()))?)
        .with_uninstall(build_actions(definition.uninstall).map_err(|e| invalid(e.to_string()))?)
        .with_update(build_actions(definition.update).map_err(|e| invalid(e.to_string()))?);

    Ok(manifest)
}

/// A directory of package definitions
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the definition file for `name`
    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(DEFINITION_FILE)
    }

    /// Load the manifest for `name`
    ///
    /// A missing definition is `PackageNotFound`; one that does not parse
    /// into a valid manifest is `InvalidPackage`.
    pub fn load(&self, name: &str) -> Result<Manifest> {
        if !is_valid_name(name) {
            return Err(Error::PackageNotFound(name.to_string()));
        }

        let path = self.definition_path(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::PackageNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loading package definition {}", path.display());
        parse_definition(name, &raw)
    }

    /// Names of all packages with a definition file, sorted
    pub fn available(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_valid_name(&name) && entry.path().join(DEFINITION_FILE).is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A package name must be usable as a single directory component
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
}
