//! Save/pull engine.
//!
//! Save: list local worlds, select, then archive and upload each world in
//! turn. Pull: list remote archives, select, download all selected archives
//! concurrently, then extract them all concurrently once every download has
//! finished. Any failure aborts the whole invocation.

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SyncError};
use crate::fs::local::list_save_dirs;
use crate::fs::types::{archive_key, Direction, RemoteObject};
use crate::fs::ObjectStore;
use crate::sync::archive::{self, CompressionLevel};
use crate::sync::progress::{ProgressReporter, TransferLine};
use crate::sync::selection::{menu, resolve, Selector};
use crate::sync::staging::StagedFile;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Names of the worlds saved or pulled.
    Completed(Vec<String>),
    /// The user backed out of the menu.
    Cancelled,
    /// There was nothing to choose from.
    NothingFound,
}

/// One selected world, for the duration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    /// World name.
    pub name: String,
    /// World directory under the saves root.
    pub local_path: PathBuf,
    /// Object key, `{name}.zip`.
    pub remote_key: String,
    pub direction: Direction,
}

impl TransferJob {
    pub fn save(name: &str, saves_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            local_path: saves_dir.join(name),
            remote_key: archive_key(name),
            direction: Direction::Save,
        }
    }

    /// `None` if the key is not a world archive.
    pub fn pull(object: &RemoteObject, saves_dir: &Path) -> Option<Self> {
        let name = object.world_name()?;
        Some(Self {
            name: name.to_string(),
            local_path: saves_dir.join(name),
            remote_key: object.key.clone(),
            direction: Direction::Pull,
        })
    }
}

/// Engine configuration beyond the store itself.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory holding one subdirectory per world.
    pub saves_dir: PathBuf,
    /// Where archives are staged between archive/upload and download/extract.
    pub scratch_dir: PathBuf,
    pub compression: CompressionLevel,
}

impl EngineConfig {
    pub fn new(saves_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            saves_dir: saves_dir.into(),
            scratch_dir: scratch_dir.into(),
            compression: CompressionLevel::default(),
        }
    }
}

/// Orchestrates save and pull against one object store.
pub struct SyncEngine {
    store: Arc<dyn ObjectStore>,
    config: EngineConfig,
    reporter: ProgressReporter,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn ObjectStore>, config: EngineConfig) -> Self {
        Self::with_reporter(store, config, ProgressReporter::new())
    }

    pub fn with_reporter(store: Arc<dyn ObjectStore>, config: EngineConfig, reporter: ProgressReporter) -> Self {
        Self {
            store,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Archive and upload the selected local worlds, one at a time.
    pub async fn save(&self, selector: &dyn Selector) -> Result<SyncOutcome> {
        let saves = list_save_dirs(&self.config.saves_dir)?;
        tracing::info!(saves_dir = %self.config.saves_dir.display(), count = saves.len(), "found local worlds");
        if saves.is_empty() {
            return Ok(SyncOutcome::NothingFound);
        }

        let Some(choice) = selector.select("Which world do you want to save?", &menu(&saves)).await? else {
            tracing::info!("save cancelled");
            return Ok(SyncOutcome::Cancelled);
        };

        let jobs: Vec<TransferJob> = resolve(saves, choice)
            .iter()
            .map(|name| TransferJob::save(name, &self.config.saves_dir))
            .collect();
        self.ensure_scratch_dir().await?;

        let mut saved = Vec::with_capacity(jobs.len());
        for job in jobs {
            self.save_one(&job).await?;
            saved.push(job.name);
        }

        Ok(SyncOutcome::Completed(saved))
    }

    /// Download and extract the selected remote worlds.
    pub async fn pull(&self, selector: &dyn Selector) -> Result<SyncOutcome> {
        let worlds: Vec<RemoteObject> = self
            .store
            .list_objects()
            .await?
            .into_iter()
            .filter(RemoteObject::is_archive)
            .collect();
        tracing::info!(store = %self.store.describe(), count = worlds.len(), "found remote worlds");
        if worlds.is_empty() {
            return Ok(SyncOutcome::NothingFound);
        }

        let Some(choice) = selector.select(
            "Which world do you want to pull?",
            &menu(worlds.iter().map(|w| &w.key)),
        )
        .await?
        else {
            tracing::info!("pull cancelled");
            return Ok(SyncOutcome::Cancelled);
        };

        let jobs: Vec<TransferJob> = resolve(worlds, choice)
            .iter()
            .filter_map(|obj| TransferJob::pull(obj, &self.config.saves_dir))
            .collect();
        if jobs.is_empty() {
            return Ok(SyncOutcome::Completed(Vec::new()));
        }
        self.ensure_scratch_dir().await?;

        // Fan out downloads; the first failure drops the rest
        let staged = try_join_all(jobs.iter().map(|job| self.download_one(job))).await?;

        // Barrier passed: every archive is on disk
        try_join_all(
            jobs.iter()
                .zip(staged.iter())
                .map(|(job, file)| self.extract_one(job, file.path())),
        )
        .await?;

        for file in staged {
            if let Err(e) = file.remove() {
                tracing::warn!(error = %e, "failed to remove downloaded archive");
            }
        }

        Ok(SyncOutcome::Completed(jobs.into_iter().map(|j| j.name).collect()))
    }

    async fn save_one(&self, job: &TransferJob) -> Result<()> {
        let staged = StagedFile::new(&self.config.scratch_dir, &job.remote_key);

        tracing::info!(world = %job.name, archive = %staged.path().display(), "archiving");
        let line = self.reporter.line(format!("Archiving {}", job.name));
        let source = job.local_path.clone();
        let dest = staged.path().to_path_buf();
        let level = self.config.compression;
        let task_line = line.clone();
        let result = tokio::task::spawn_blocking(move || {
            archive::archive(&source, &dest, level, &|done, total| task_line.report(done, total))
        })
        .await
        .map_err(join_error)
        .and_then(|r| r);
        finish_line(&line, result)?;

        tracing::info!(world = %job.name, key = %job.remote_key, "uploading");
        let line = self.reporter.line(format!("{} {}", job.direction.verb(), job.remote_key));
        let result = self
            .store
            .upload(staged.path(), &job.remote_key, &line.listener())
            .await;
        finish_line(&line, result)?;

        staged.remove()
    }

    async fn download_one(&self, job: &TransferJob) -> Result<StagedFile> {
        let staged = StagedFile::new(&self.config.scratch_dir, &job.remote_key);

        tracing::info!(key = %job.remote_key, path = %staged.path().display(), "downloading");
        let line = self.reporter.line(format!("{} {}", job.direction.verb(), job.remote_key));
        let result = self
            .store
            .download(&job.remote_key, staged.path(), &line.listener())
            .await;
        finish_line(&line, result)?;

        Ok(staged)
    }

    async fn extract_one(&self, job: &TransferJob, archive_path: &Path) -> Result<()> {
        tracing::info!(world = %job.name, dest = %job.local_path.display(), "extracting");
        let line = self.reporter.line(format!("Extracting {}", job.name));
        let source = archive_path.to_path_buf();
        let dest = job.local_path.clone();
        let task_line = line.clone();
        let result = tokio::task::spawn_blocking(move || {
            archive::extract(&source, &dest, &|done, total| task_line.report(done, total))
        })
        .await
        .map_err(join_error)
        .and_then(|r| r);
        finish_line(&line, result)
    }

    async fn ensure_scratch_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| SyncError::from_io_error(e, "creating scratch directory", Some(self.config.scratch_dir.clone())))
    }
}

fn finish_line<T>(line: &TransferLine, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => line.complete(),
        Err(_) => line.abandon(),
    }
    result
}

fn join_error(err: tokio::task::JoinError) -> SyncError {
    SyncError::from_io_error(std::io::Error::other(err.to_string()), "running background task", None)
}

/// Summary printed after a successful save or pull.
pub fn summary(title: &str, names: &[String]) -> String {
    let mut out = format!("{}:", title);
    for name in names {
        out.push_str("\n  - ");
        out.push_str(name);
    }
    out
}
