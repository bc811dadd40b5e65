// src/filesystem.rs

//! Filesystem helpers shared by the actions and the state store
//!
//! Writes go through a temporary file in the destination directory followed
//! by a rename, so readers never observe a half-written file.

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Permission bits given to a file written where none existed before
pub const NEW_FILE_MODE: u32 = 0o644;

/// Atomically replace `path` with `data`, creating parent directories as needed
///
/// The final file gets `mode` when given; otherwise it keeps the permission
/// bits of the file it replaces, or `NEW_FILE_MODE` if there was none.
pub fn atomic_write(path: &Path, data: &[u8], mode: Option<u32>) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mode = mode.or_else(|| file_mode(path)).unwrap_or(NEW_FILE_MODE);

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    set_mode(tmp.path(), mode)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Permission bits of an existing file
#[cfg(unix)]
pub fn file_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .ok()
        .map(|meta| meta.permissions().mode() & 0o7777)
}

/// Permission bits of an existing file (not tracked off Unix)
#[cfg(not(unix))]
pub fn file_mode(_path: &Path) -> Option<u32> {
    None
}

/// Create the missing ancestors of `path`, returning them outermost first
///
/// Hand the result to `remove_empty_dirs` to undo the creation.
pub fn create_parents(path: &Path) -> Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir.exists() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }
    missing.reverse();

    for (created, dir) in missing.iter().enumerate() {
        if let Err(e) = fs::create_dir(dir) {
            remove_empty_dirs(&missing[..created])?;
            return Err(e.into());
        }
    }
    Ok(missing)
}

/// Remove directories made by `create_parents`, innermost first, stopping at the first non-empty one
pub fn remove_empty_dirs(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs.iter().rev() {
        if !is_empty_dir(dir) {
            break;
        }
        fs::remove_dir(dir)?;
    }
    Ok(())
}

/// Read a UTF-8 file, mapping "not found" to `None`
pub fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// True if `path` is a symlink pointing exactly at `target`
pub fn is_link_to(path: &Path, target: &Path) -> bool {
    fs::read_link(path)
        .map(|current| current == target)
        .unwrap_or(false)
}

/// True if `path` itself is a symlink (dangling links included)
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// True if `path` is a directory with no entries
pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Set permission bits on `path` (no-op off Unix)
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target`
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link)?;
    Ok(())
}

/// Expand a leading `~` against the current user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Drop the final line of `content`, keeping a trailing newline on what remains
///
/// Returns `None` when there is no line to drop.
pub fn without_last_line(content: &str) -> Option<String> {
    let mut lines: Vec<&str> = content.lines().collect();
    lines.pop()?;
    if lines.is_empty() {
        Some(String::new())
    } else {
        Some(format!("{}\n", lines.join("\n")))
    }
}
