use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// Operating system family, for resolving the default saves directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Unix,
}

impl OsFamily {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Unix,
        }
    }
}

/// Default Minecraft saves directory for a platform and user.
pub fn default_saves_dir(os: OsFamily, username: &str) -> PathBuf {
    match os {
        OsFamily::Windows => PathBuf::from(format!(
            "C:\\Users\\{}\\AppData\\Roaming\\.minecraft\\saves",
            username
        )),
        OsFamily::MacOs => PathBuf::from(format!(
            "/Users/{}/Library/Application Support/minecraft/saves",
            username
        )),
        OsFamily::Unix => PathBuf::from(format!("/home/{}/.minecraft/saves", username)),
    }
}

pub fn current_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Names of the world directories under `root`, sorted by name.
///
/// Plain files are skipped.
pub fn list_save_dirs(root: &Path) -> Result<Vec<String>> {
    let read_dir = fs::read_dir(root)
        .map_err(|e| SyncError::from_io_error(e, "reading saves directory", Some(root.to_path_buf())))?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry
            .map_err(|e| SyncError::from_io_error(e, "reading saves directory", Some(root.to_path_buf())))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| SyncError::from_io_error(e, "reading file type of", Some(entry.path())))?
            .is_dir();
        if is_dir {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    Ok(names)
}
