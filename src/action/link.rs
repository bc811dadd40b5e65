// src/action/link.rs

//! Symlink actions

use crate::action::Action;
use crate::action::fs::FileBackup;
use crate::error::Result;
use crate::filesystem::{create_parents, is_link_to, is_symlink, remove_empty_dirs, symlink};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// What occupied the link path before `CreateLink` replaced it
#[derive(Debug, Clone)]
enum Displaced {
    Symlink(PathBuf),
    File(FileBackup),
}

/// Point `link` at `target`, replacing an existing symlink or regular file
#[derive(Debug, Clone)]
pub struct CreateLink {
    link: PathBuf,
    target: PathBuf,
    created: bool,
    displaced: Option<Displaced>,
    created_dirs: Vec<PathBuf>,
}

impl CreateLink {
    pub fn new(link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            target: target.into(),
            created: false,
            displaced: None,
            created_dirs: Vec::new(),
        }
    }

    fn restore_displaced(&mut self) -> Result<()> {
        match self.displaced.take() {
            Some(Displaced::Symlink(previous)) => symlink(&previous, &self.link),
            Some(Displaced::File(backup)) => backup.restore(&self.link),
            None => Ok(()),
        }
    }
}

impl Action for CreateLink {
    fn check(&self) -> bool {
        !is_link_to(&self.link, &self.target)
    }

    fn run(&mut self) -> Result<()> {
        self.created_dirs = create_parents(&self.link)?;

        if is_symlink(&self.link) {
            let previous = fs::read_link(&self.link)?;
            fs::remove_file(&self.link)?;
            self.displaced = Some(Displaced::Symlink(previous));
        } else if let Some(backup) = FileBackup::capture(&self.link)? {
            fs::remove_file(&self.link)?;
            self.displaced = Some(Displaced::File(backup));
        }

        if let Err(e) = symlink(&self.target, &self.link) {
            if let Err(cleanup_err) = remove_empty_dirs(&self.created_dirs) {
                warn!(
                    "Failed to remove directories created for {}: {}",
                    self.link.display(),
                    cleanup_err
                );
            }
            self.created_dirs.clear();
            // Put back what was removed so a failed run leaves no trace
            if let Err(restore_err) = self.restore_displaced() {
                warn!(
                    "Failed to restore {} after link error: {}",
                    self.link.display(),
                    restore_err
                );
            }
            return Err(e);
        }
        self.created = true;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.created {
            return Ok(());
        }
        if is_symlink(&self.link) {
            fs::remove_file(&self.link)?;
        }
        self.created = false;
        remove_empty_dirs(&self.created_dirs)?;
        self.created_dirs.clear();
        self.restore_displaced()
    }

    fn describe(&self) -> String {
        format!(
            "CreateLink({} -> {})",
            self.link.display(),
            self.target.display()
        )
    }
}

/// Remove a symlink, remembering where it pointed
#[derive(Debug, Clone)]
pub struct DeleteLink {
    link: PathBuf,
    previous: Option<PathBuf>,
}

impl DeleteLink {
    pub fn new(link: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            previous: None,
        }
    }
}

impl Action for DeleteLink {
    fn check(&self) -> bool {
        is_symlink(&self.link)
    }

    fn run(&mut self) -> Result<()> {
        if is_symlink(&self.link) {
            let previous = fs::read_link(&self.link)?;
            fs::remove_file(&self.link)?;
            self.previous = Some(previous);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if let Some(previous) = self.previous.take() {
            symlink(&previous, &self.link)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("DeleteLink({})", self.link.display())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_link_fresh_and_rollback() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dotfiles/vimrc");
        let link = dir.path().join("home/.vimrc");

        let mut action = CreateLink::new(&link, &target);
        assert!(action.check());
        action.run().unwrap();
        assert!(is_link_to(&link, &target));
        assert!(!action.check());

        action.rollback().unwrap();
        assert!(!is_symlink(&link));
    }

    #[test]
    fn test_create_link_restores_previous_symlink() {
        let dir = TempDir::new().unwrap();
        let old_target = dir.path().join("old");
        let new_target = dir.path().join("new");
        let link = dir.path().join("link");
        symlink(&old_target, &link).unwrap();

        let mut action = CreateLink::new(&link, &new_target);
        action.run().unwrap();
        assert!(is_link_to(&link, &new_target));

        action.rollback().unwrap();
        assert!(is_link_to(&link, &old_target));
    }

    #[test]
    fn test_create_link_restores_displaced_file() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join(".bashrc");
        fs::write(&link, "user content").unwrap();

        let mut action = CreateLink::new(&link, dir.path().join("managed"));
        action.run().unwrap();
        assert!(is_symlink(&link));

        action.rollback().unwrap();
        assert!(!is_symlink(&link));
        assert_eq!(fs::read_to_string(&link).unwrap(), "user content");
    }

    #[test]
    fn test_create_link_restores_displaced_file_mode() {
        use crate::filesystem::file_mode;
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let link = dir.path().join("startup.sh");
        fs::write(&link, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&link, fs::Permissions::from_mode(0o755)).unwrap();

        let mut action = CreateLink::new(&link, dir.path().join("managed.sh"));
        action.run().unwrap();
        action.rollback().unwrap();
        assert_eq!(file_mode(&link), Some(0o755));
    }

    #[test]
    fn test_create_link_rollback_removes_created_parents() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("home/.config/kitty");

        let mut action = CreateLink::new(&link, dir.path().join("repo/kitty"));
        action.run().unwrap();
        action.rollback().unwrap();
        assert!(!dir.path().join("home").exists());
    }

    #[test]
    fn test_delete_link_and_rollback() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("t");
        let link = dir.path().join("l");
        symlink(&target, &link).unwrap();

        let mut action = DeleteLink::new(&link);
        assert!(action.check());
        action.run().unwrap();
        assert!(!is_symlink(&link));
        assert!(!action.check());

        action.rollback().unwrap();
        assert!(is_link_to(&link, &target));
    }
}
