// src/error.rs

use thiserror::Error;

/// Core error types for Chopsticks
#[derive(Error, Debug)]
pub enum Error {
    /// No package definition exists for the requested name
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// A package definition exists but does not yield a well-formed manifest
    #[error("Invalid package {name}: {reason}")]
    InvalidPackage { name: String, reason: String },

    /// The dependency graph contains a cycle (path ends at the re-entered name)
    #[error("Cycle detected at {name}: {}", path.join(" -> "))]
    DependencyCycle { name: String, path: Vec<String> },

    /// Uninstall targets that are not currently installed
    #[error("Not installed: {}", .0.join(", "))]
    NotInstalled(Vec<String>),

    /// Uninstalling `target` would break the installed package `dependent`
    #[error("Cannot uninstall {target}: required by installed package {dependent}")]
    RequiredBy { target: String, dependent: String },

    /// An action failed during execution; already-applied actions were rolled back
    #[error("Action failed: {description}: {source}")]
    ActionFailed {
        description: String,
        #[source]
        source: Box<Error>,
    },

    /// An external command could not be started or exited unsuccessfully
    #[error("Command failed: {0}")]
    Command(String),

    /// Git operations on the package repository
    #[error("Git error: {0}")]
    Git(String),

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State file (de)serialization errors
    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the dependency-resolution failures (cycles and reverse-dependency violations)
    pub fn is_dependency_error(&self) -> bool {
        matches!(self, Error::DependencyCycle { .. } | Error::RequiredBy { .. })
    }
}

/// Result type alias using Chopsticks' Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_failed_message_names_action_and_cause() {
        let err = Error::ActionFailed {
            description: "CreateFile(/tmp/x)".to_string(),
            source: Box::new(Error::Command("exit status 1".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Action failed: CreateFile(/tmp/x): Command failed: exit status 1"
        );
    }

    #[test]
    fn test_cycle_message_shows_path() {
        let err = Error::DependencyCycle {
            name: "a".to_string(),
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Cycle detected at a: a -> b -> a");
        assert!(err.is_dependency_error());
    }

    #[test]
    fn test_not_installed_lists_names() {
        let err = Error::NotInstalled(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Not installed: a, b");
    }

    #[test]
    fn test_lookup_errors_are_not_dependency_errors() {
        assert!(!Error::PackageNotFound("x".to_string()).is_dependency_error());
    }
}
