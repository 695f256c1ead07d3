// Centralized error handling module
// Every failure surfaced by the save/pull pipeline maps onto one of these kinds

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for save-sync
/// Provides context-rich error messages with paths, keys and operations
#[derive(Debug)]
pub enum SyncError {
    /// Configuration errors
    ConfigMissing { path: PathBuf },
    ConfigParse { path: PathBuf, reason: String },
    Validation { field: String, message: String },

    /// Object store errors
    StoreAuth { operation: String, reason: String },
    StoreUnavailable { operation: String, reason: String },
    StoreNotFound { key: String },

    /// Local filesystem errors
    Io { path: Option<PathBuf>, operation: String, source: io::Error },

    /// Archive errors
    CorruptArchive { path: Option<PathBuf>, reason: String },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncError::ConfigMissing { path } => {
                writeln!(f, "The CLI is not configured with AWS credentials ({} not found)", path.display())?;
                write!(f, "Suggestion: Run the `setup-config` command first")
            }
            SyncError::ConfigParse { path, reason } => {
                writeln!(f, "Failed to parse config {}: {}", path.display(), reason)?;
                write!(f, "Suggestion: Run the `setup-config` command to rewrite it")
            }
            SyncError::Validation { field, message } => {
                writeln!(f, "Invalid {}: {}", field, message)?;
                write!(f, "Suggestion: Run the `setup-config` command and provide a valid value")
            }

            SyncError::StoreAuth { operation, reason } => {
                writeln!(f, "Access denied while {}: {}", operation, reason)?;
                write!(f, "Suggestion: Check the configured access key, secret key and bucket permissions")
            }
            SyncError::StoreUnavailable { operation, reason } => {
                writeln!(f, "Object store error while {}: {}", operation, reason)?;
                write!(f, "Suggestion: Check your network connection, region and bucket name")
            }
            SyncError::StoreNotFound { key } => {
                writeln!(f, "Object not found in bucket: {}", key)?;
                write!(f, "Suggestion: The object may have been deleted, run the command again")
            }

            SyncError::Io { path, operation, source } => {
                if let Some(p) = path {
                    writeln!(f, "I/O error while {} {}: {}", operation, p.display(), source)?;
                } else {
                    writeln!(f, "I/O error while {}: {}", operation, source)?;
                }
                write!(f, "Suggestion: Check file permissions and disk space")
            }

            SyncError::CorruptArchive { path, reason } => {
                if let Some(p) = path {
                    writeln!(f, "Corrupt archive {}: {}", p.display(), reason)?;
                } else {
                    writeln!(f, "Corrupt archive: {}", reason)?;
                }
                write!(f, "Suggestion: Save the world again from a machine that has a good copy")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SyncError {
    /// Create an Io error with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        SyncError::Io {
            path,
            operation: operation.to_string(),
            source: err,
        }
    }

    /// Classify an opendal error by its kind
    pub fn from_store_error(err: opendal::Error, operation: &str, key: &str) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => SyncError::StoreNotFound {
                key: key.to_string(),
            },
            opendal::ErrorKind::PermissionDenied | opendal::ErrorKind::ConfigInvalid => {
                SyncError::StoreAuth {
                    operation: operation.to_string(),
                    reason: err.to_string(),
                }
            }
            _ => SyncError::StoreUnavailable {
                operation: operation.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Short kind name, used in log events
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ConfigMissing { .. } => "config-missing",
            SyncError::ConfigParse { .. } => "config-parse",
            SyncError::Validation { .. } => "validation",
            SyncError::StoreAuth { .. } => "store-auth",
            SyncError::StoreUnavailable { .. } => "store-unavailable",
            SyncError::StoreNotFound { .. } => "store-not-found",
            SyncError::Io { .. } => "io",
            SyncError::CorruptArchive { .. } => "corrupt-archive",
        }
    }
}

impl From<zip::result::ZipError> for SyncError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => SyncError::from_io_error(source, "processing archive", None),
            other => SyncError::CorruptArchive {
                path: None,
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
