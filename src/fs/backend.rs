use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::fs::types::RemoteObject;

/// Progress listener for a single transfer: `(loaded, total)` in bytes.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Remote key/blob store bound to one bucket and one set of credentials.
///
/// Transfers go through files in the scratch directory rather than in-memory
/// buffers so large worlds never need to fit in memory. Every transfer calls
/// `on_progress` zero or more times and always ends with `loaded == total`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object at the bucket root.
    async fn list_objects(&self) -> Result<Vec<RemoteObject>>;

    /// Upload `local_path` under `key`, replacing any existing object.
    async fn upload(&self, local_path: &Path, key: &str, on_progress: ProgressFn<'_>) -> Result<()>;

    /// Download `key` into `local_path`, returning the number of bytes written.
    async fn download(&self, key: &str, local_path: &Path, on_progress: ProgressFn<'_>) -> Result<u64>;

    /// Display name for logs, e.g. `s3://bucket`.
    fn describe(&self) -> String;
}
