use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{layers::TimeoutLayer, services::Memory, services::S3, Operator};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::fs::backend::{ObjectStore, ProgressFn};
use crate::fs::types::RemoteObject;

/// Transfer chunk size. Also the multipart part size for S3 uploads.
pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Timeout for non-IO operations (stat, list)
const OP_TIMEOUT_SECS: u64 = 60;
/// Timeout for a single IO operation (one chunk read or write)
const IO_TIMEOUT_SECS: u64 = 300;

/// Object store client backed by an OpenDAL operator
pub struct OpendalStore {
    operator: Operator,
    name: String,
}

impl OpendalStore {
    /// Create an S3 (or S3-compatible) client from the loaded config
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        let operator = Operator::new(builder)
            .map_err(|e| SyncError::from_store_error(e, "configuring S3 client", ""))?
            .layer(
                TimeoutLayer::default()
                    .with_timeout(Duration::from_secs(OP_TIMEOUT_SECS))
                    .with_io_timeout(Duration::from_secs(IO_TIMEOUT_SECS)),
            )
            .finish();

        Ok(Self {
            operator,
            name: format!("s3://{}", config.bucket),
        })
    }

    /// In-process store backed by the opendal memory service
    pub fn memory() -> Result<Self> {
        let operator = Operator::new(Memory::default())
            .map_err(|e| SyncError::from_store_error(e, "configuring memory store", ""))?
            .finish();

        Ok(Self {
            operator,
            name: "memory://".to_string(),
        })
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}

#[async_trait]
impl ObjectStore for OpendalStore {
    async fn list_objects(&self) -> Result<Vec<RemoteObject>> {
        let mut lister = self
            .operator
            .lister_with("")
            .await
            .map_err(|e| SyncError::from_store_error(e, "listing bucket", ""))?;

        // The lister follows continuation tokens until the listing is exhausted
        let mut objects = Vec::new();
        while let Some(entry) = lister
            .try_next()
            .await
            .map_err(|e| SyncError::from_store_error(e, "listing bucket", ""))?
        {
            let key = entry.path().trim_start_matches('/');
            if key.is_empty() || entry.metadata().is_dir() {
                continue;
            }
            objects.push(RemoteObject::new(key, entry.metadata().content_length()));
        }

        tracing::debug!(store = %self.name, count = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn upload(&self, local_path: &Path, key: &str, on_progress: ProgressFn<'_>) -> Result<()> {
        let mut file = File::open(local_path)
            .await
            .map_err(|e| SyncError::from_io_error(e, "opening", Some(local_path.to_path_buf())))?;
        let total = file
            .metadata()
            .await
            .map_err(|e| SyncError::from_io_error(e, "reading metadata of", Some(local_path.to_path_buf())))?
            .len();

        let store_err = |e| SyncError::from_store_error(e, "uploading", key);
        let mut writer = self
            .operator
            .writer_with(key)
            .chunk(CHUNK_SIZE)
            .await
            .map_err(store_err)?;

        let mut loaded = 0u64;
        on_progress(loaded, total);
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| SyncError::from_io_error(e, "reading", Some(local_path.to_path_buf())))?;
            if n == 0 {
                break;
            }
            writer.write(buf[..n].to_vec()).await.map_err(store_err)?;
            loaded += n as u64;
            // The last chunk is only committed on close
            if loaded < total {
                on_progress(loaded, total);
            }
        }
        writer.close().await.map_err(store_err)?;
        on_progress(total, total);

        tracing::debug!(store = %self.name, key, bytes = total, "uploaded object");
        Ok(())
    }

    async fn download(&self, key: &str, local_path: &Path, on_progress: ProgressFn<'_>) -> Result<u64> {
        let total = self
            .operator
            .stat(key)
            .await
            .map_err(|e| SyncError::from_store_error(e, "downloading", key))?
            .content_length();

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::from_io_error(e, "creating directory", Some(parent.to_path_buf())))?;
        }
        let mut file = File::create(local_path)
            .await
            .map_err(|e| SyncError::from_io_error(e, "creating", Some(local_path.to_path_buf())))?;

        let mut loaded = 0u64;
        on_progress(loaded, total);
        while loaded < total {
            let end = (loaded + CHUNK_SIZE as u64).min(total);
            let chunk = self
                .operator
                .read_with(key)
                .range(loaded..end)
                .await
                .map_err(|e| SyncError::from_store_error(e, "downloading", key))?;
            let bytes = chunk.to_vec();
            if bytes.is_empty() {
                return Err(SyncError::StoreUnavailable {
                    operation: format!("downloading {}", key),
                    reason: format!("object ended after {} of {} bytes", loaded, total),
                });
            }
            file.write_all(&bytes)
                .await
                .map_err(|e| SyncError::from_io_error(e, "writing", Some(local_path.to_path_buf())))?;
            loaded += bytes.len() as u64;
            on_progress(loaded.min(total), total);
        }
        file.flush()
            .await
            .map_err(|e| SyncError::from_io_error(e, "writing", Some(local_path.to_path_buf())))?;

        tracing::debug!(store = %self.name, key, bytes = total, "downloaded object");
        Ok(total)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
