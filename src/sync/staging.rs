use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// A file in the scratch directory, claimed by name for one job.
///
/// Removed on drop unless `remove` already ran, so a failed
/// invocation does not leave archives behind.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    armed: bool,
}

impl StagedFile {
    pub fn new(scratch_dir: &Path, file_name: &str) -> Self {
        Self {
            path: scratch_dir.join(file_name),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, surfacing the error.
    pub fn remove(mut self) -> Result<()> {
        self.armed = false;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed staged file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::from_io_error(e, "removing", Some(self.path.clone()))),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clean up staged file");
            } else {
                tracing::debug!(path = %self.path.display(), "cleaned up staged file");
            }
        }
    }
}
