// src/state.rs

//! Installed-state store
//!
//! Persists which packages are installed as a JSON document:
//!
//! ```json
//! {
//!   "installed": {
//!     "kitty": { "version": "1.0.0", "installed_at": "2025-01-01T12:00:00Z" }
//!   }
//! }
//! ```
//!
//! A missing file is an empty installed set. Saves are atomic (temporary
//! file + rename). Nothing here locks the file: two concurrent invocations
//! race, and the last save wins.

use crate::error::Result;
use crate::filesystem::{atomic_write, read_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One installed package as recorded on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledRecord {
    /// Last successfully applied version
    pub version: String,
    /// When that version was installed or updated (UTC)
    pub installed_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    installed: BTreeMap<String, InstalledRecord>,
}

/// In-memory view of the state file
#[derive(Debug, Clone)]
pub struct State {
    path: PathBuf,
    installed: BTreeMap<String, InstalledRecord>,
}

impl State {
    /// Load the state file at `path`; a missing file yields an empty state
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let installed = match read_text(&path)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str::<StateDocument>(&raw)?.installed
            }
            _ => BTreeMap::new(),
        };
        debug!(
            "Loaded state from {} ({} installed)",
            path.display(),
            installed.len()
        );
        Ok(Self { path, installed })
    }

    /// Write the state file atomically
    pub fn save(&self) -> Result<()> {
        let document = StateDocument {
            installed: self.installed.clone(),
        };
        let mut payload = serde_json::to_string_pretty(&document)?;
        payload.push('\n');
        atomic_write(&self.path, payload.as_bytes(), None)?;
        debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Record `name` at `version`, stamped with the current time
    pub fn mark_installed(&mut self, name: &str, version: &str) {
        self.installed.insert(
            name.to_string(),
            InstalledRecord {
                version: version.to_string(),
                installed_at: Utc::now(),
            },
        );
    }

    pub fn mark_uninstalled(&mut self, name: &str) {
        self.installed.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&InstalledRecord> {
        self.installed.get(name)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// Installed packages sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstalledRecord)> {
        self.installed.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Name → version snapshot handed to the resolver
    pub fn versions(&self) -> BTreeMap<String, String> {
        self.installed
            .iter()
            .map(|(name, record)| (name.clone(), record.version.clone()))
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let state = State::load(dir.path().join("state.json")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.json");

        let mut state = State::load(&path).unwrap();
        state.mark_installed("kitty", "1.0.0");
        state.mark_installed("fish", "2.0");
        state.save().unwrap();

        let reloaded = State::load(&path).unwrap();
        assert_eq!(reloaded.get("kitty").unwrap().version, "1.0.0");
        let names: Vec<&str> = reloaded.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["fish", "kitty"]);
        assert_eq!(
            reloaded.get("fish").unwrap().installed_at,
            state.get("fish").unwrap().installed_at
        );
    }

    #[test]
    fn test_mark_uninstalled_removes_record() {
        let dir = TempDir::new().unwrap();
        let mut state = State::load(dir.path().join("s.json")).unwrap();
        state.mark_installed("a", "1");
        state.mark_uninstalled("a");
        assert!(!state.is_installed("a"));
        state.mark_uninstalled("never-there");
    }

    #[test]
    fn test_reads_existing_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"installed": {"vim": {"version": "1.0.0", "installed_at": "2025-03-01T10:20:30.123456+00:00"}}}"#,
        )
        .unwrap();

        let state = State::load(&path).unwrap();
        assert_eq!(
            state.versions(),
            BTreeMap::from([("vim".to_string(), "1.0.0".to_string())])
        );
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(State::load(&path).is_err());
    }

    #[test]
    fn test_saved_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let mut state = State::load(&path).unwrap();
        state.mark_installed("a", "1.0");
        state.save().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["installed"]["a"]["version"], "1.0");
        assert!(value["installed"]["a"]["installed_at"].is_string());
    }
}
