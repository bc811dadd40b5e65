// src/action/fs.rs

//! File and directory actions

use crate::action::Action;
use crate::error::Result;
use crate::filesystem::{
    NEW_FILE_MODE, atomic_write, create_parents, file_mode, is_empty_dir, read_text,
    remove_empty_dirs, set_mode, without_last_line,
};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_DIR_MODE: u32 = 0o755;
pub const DEFAULT_FILE_MODE: u32 = NEW_FILE_MODE;

/// Bytes and permission bits of a regular file, kept for rollback
#[derive(Debug, Clone)]
pub(crate) struct FileBackup {
    content: Vec<u8>,
    mode: Option<u32>,
}

impl FileBackup {
    /// Snapshot `path` if it is a regular file
    pub(crate) fn capture(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(Self {
            content: fs::read(path)?,
            mode: file_mode(path),
        }))
    }

    pub(crate) fn restore(&self, path: &Path) -> Result<()> {
        atomic_write(path, &self.content, self.mode)
    }
}

/// Undo `create_parents` after a failed run, logging rather than masking the run error
fn discard_parents(dirs: &mut Vec<PathBuf>) {
    if let Err(e) = remove_empty_dirs(dirs) {
        warn!("Failed to remove directories created for a failed action: {}", e);
    }
    dirs.clear();
}

/// Create a directory (and any missing parents)
#[derive(Debug, Clone)]
pub struct CreateDir {
    path: PathBuf,
    mode: u32,
    created: bool,
}

impl CreateDir {
    pub fn new(path: impl Into<PathBuf>, mode: u32) -> Self {
        Self {
            path: path.into(),
            mode,
            created: false,
        }
    }
}

impl Action for CreateDir {
    fn check(&self) -> bool {
        !self.path.exists()
    }

    fn run(&mut self) -> Result<()> {
        fs::create_dir_all(&self.path)?;
        self.created = true;
        set_mode(&self.path, self.mode)
    }

    fn rollback(&mut self) -> Result<()> {
        // Only the leaf is removed, and only while nothing was put inside it
        if self.created && is_empty_dir(&self.path) {
            fs::remove_dir(&self.path)?;
            self.created = false;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("CreateDir({})", self.path.display())
    }
}

/// Remove a directory, but only if it is empty
#[derive(Debug, Clone)]
pub struct DeleteDir {
    path: PathBuf,
    removed: bool,
}

impl DeleteDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }
}

impl Action for DeleteDir {
    fn check(&self) -> bool {
        self.path.exists()
    }

    fn run(&mut self) -> Result<()> {
        if self.path.is_dir() && is_empty_dir(&self.path) {
            fs::remove_dir(&self.path)?;
            self.removed = true;
        } else {
            debug!("Leaving non-empty directory in place: {}", self.path.display());
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.removed {
            fs::create_dir_all(&self.path)?;
            self.removed = false;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("DeleteDir({})", self.path.display())
    }
}

/// Write a file with exact content, backing up whatever was there
#[derive(Debug, Clone)]
pub struct CreateFile {
    path: PathBuf,
    content: String,
    mode: u32,
    written: bool,
    backup: Option<FileBackup>,
    created_dirs: Vec<PathBuf>,
}

impl CreateFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, mode: u32) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode,
            written: false,
            backup: None,
            created_dirs: Vec::new(),
        }
    }
}

impl Action for CreateFile {
    fn check(&self) -> bool {
        match read_text(&self.path) {
            Ok(Some(current)) => current != self.content,
            // Missing or unreadable (e.g. not UTF-8): needs writing
            _ => true,
        }
    }

    fn run(&mut self) -> Result<()> {
        self.backup = FileBackup::capture(&self.path)?;
        self.created_dirs = create_parents(&self.path)?;
        if let Err(e) = atomic_write(&self.path, self.content.as_bytes(), Some(self.mode)) {
            discard_parents(&mut self.created_dirs);
            return Err(e);
        }
        self.written = true;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.written {
            return Ok(());
        }
        match self.backup.take() {
            Some(previous) => previous.restore(&self.path)?,
            None => remove_file_if_exists(&self.path)?,
        }
        remove_empty_dirs(&self.created_dirs)?;
        self.created_dirs.clear();
        self.written = false;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("CreateFile({})", self.path.display())
    }
}

/// Remove a regular file, keeping its bytes for rollback
#[derive(Debug, Clone)]
pub struct DeleteFile {
    path: PathBuf,
    backup: Option<FileBackup>,
}

impl DeleteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }
}

impl Action for DeleteFile {
    fn check(&self) -> bool {
        self.path.exists()
    }

    fn run(&mut self) -> Result<()> {
        if let Some(backup) = FileBackup::capture(&self.path)? {
            fs::remove_file(&self.path)?;
            self.backup = Some(backup);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if let Some(backup) = self.backup.take() {
            backup.restore(&self.path)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("DeleteFile({})", self.path.display())
    }
}

/// Append a line to a text file unless the file already ends with it
#[derive(Debug, Clone)]
pub struct AppendLine {
    path: PathBuf,
    line: String,
    appended: bool,
    created_file: bool,
    created_dirs: Vec<PathBuf>,
}

impl AppendLine {
    pub fn new(path: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: line.into(),
            appended: false,
            created_file: false,
            created_dirs: Vec::new(),
        }
    }

    fn append(&self) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}\n", self.line).as_bytes())?;
        Ok(())
    }
}

impl Action for AppendLine {
    fn check(&self) -> bool {
        match read_text(&self.path) {
            Ok(Some(current)) => !current.ends_with(&format!("{}\n", self.line)),
            _ => true,
        }
    }

    fn run(&mut self) -> Result<()> {
        self.created_file = !self.path.exists();
        self.created_dirs = create_parents(&self.path)?;
        if let Err(e) = self.append() {
            discard_parents(&mut self.created_dirs);
            return Err(e);
        }
        self.appended = true;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.appended {
            return Ok(());
        }
        if let Some(current) = read_text(&self.path)? {
            if self.created_file && current == format!("{}\n", self.line) {
                fs::remove_file(&self.path)?;
            } else if current.lines().last() == Some(self.line.as_str()) {
                if let Some(trimmed) = without_last_line(&current) {
                    atomic_write(&self.path, trimmed.as_bytes(), None)?;
                }
            }
        }
        remove_empty_dirs(&self.created_dirs)?;
        self.created_dirs.clear();
        self.appended = false;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("AppendLine({}: {})", self.path.display(), self.line)
    }
}

/// Remove the final line of a text file
#[derive(Debug, Clone)]
pub struct RemoveLastLine {
    path: PathBuf,
    backup: Option<String>,
}

impl RemoveLastLine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }
}

impl Action for RemoveLastLine {
    fn check(&self) -> bool {
        self.path.exists()
    }

    fn run(&mut self) -> Result<()> {
        let Some(current) = read_text(&self.path)? else {
            return Ok(());
        };
        let Some(trimmed) = without_last_line(&current) else {
            return Ok(());
        };
        atomic_write(&self.path, trimmed.as_bytes(), None)?;
        self.backup = Some(current);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if let Some(previous) = self.backup.take() {
            atomic_write(&self.path, previous.as_bytes(), None)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("RemoveLastLine({})", self.path.display())
    }
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
