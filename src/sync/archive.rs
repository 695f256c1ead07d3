//! Directory <-> zip archive codec.
//!
//! Entries are stored relative to the archived directory with `/` separators,
//! so an archive made on Windows extracts cleanly on Linux and vice versa.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, SyncError};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Compression level for deflate (0-9).
#[derive(Debug, Clone, Copy)]
pub struct CompressionLevel(u8);

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(6)
    }
}

impl CompressionLevel {
    /// Create a new compression level (clamped to 0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    pub fn fast() -> Self {
        Self(1)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Archive `source_dir` into a zip file at `dest_file`.
///
/// `on_progress(done, total)` is called with uncompressed byte counts.
pub fn archive(
    source_dir: &Path,
    dest_file: &Path,
    level: CompressionLevel,
    on_progress: &dyn Fn(u64, u64),
) -> Result<()> {
    let entries = collect_entries(source_dir)?;
    let total: u64 = entries.iter().map(|e| e.size).sum();

    let file = File::create(dest_file)
        .map_err(|e| SyncError::from_io_error(e, "creating archive", Some(dest_file.to_path_buf())))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level.value() as i64))
        .large_file(total > u32::MAX as u64);

    let mut done = 0u64;
    on_progress(done, total);
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    for entry in &entries {
        if entry.is_dir {
            zip.add_directory(entry.name.as_str(), options)
                .map_err(|e| with_archive_path(e, dest_file))?;
            continue;
        }

        zip.start_file(entry.name.as_str(), options)
            .map_err(|e| with_archive_path(e, dest_file))?;
        let mut src = File::open(&entry.path)
            .map_err(|e| SyncError::from_io_error(e, "reading", Some(entry.path.clone())))?;
        loop {
            let n = src
                .read(&mut buf)
                .map_err(|e| SyncError::from_io_error(e, "reading", Some(entry.path.clone())))?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n])
                .map_err(|e| SyncError::from_io_error(e, "writing archive", Some(dest_file.to_path_buf())))?;
            done += n as u64;
            on_progress(done, total);
        }
    }

    let mut inner = zip.finish().map_err(|e| with_archive_path(e, dest_file))?;
    inner
        .flush()
        .map_err(|e| SyncError::from_io_error(e, "writing archive", Some(dest_file.to_path_buf())))?;
    on_progress(total, total);

    tracing::debug!(
        source = %source_dir.display(),
        archive = %dest_file.display(),
        entries = entries.len(),
        bytes = total,
        "archived directory"
    );
    Ok(())
}

/// Extract the zip file at `source_file` into `dest_dir`.
///
/// Existing files are overwritten, missing directories are created, and files
/// already in `dest_dir` that the archive does not mention are left alone.
pub fn extract(source_file: &Path, dest_dir: &Path, on_progress: &dyn Fn(u64, u64)) -> Result<()> {
    let file = File::open(source_file)
        .map_err(|e| SyncError::from_io_error(e, "opening archive", Some(source_file.to_path_buf())))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| with_archive_path(e, source_file))?;

    let mut total = 0u64;
    for i in 0..zip.len() {
        total += zip.by_index_raw(i).map_err(|e| with_archive_path(e, source_file))?.size();
    }

    fs::create_dir_all(dest_dir)
        .map_err(|e| SyncError::from_io_error(e, "creating directory", Some(dest_dir.to_path_buf())))?;

    let mut done = 0u64;
    on_progress(done, total);
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| with_archive_path(e, source_file))?;
        let relative = entry
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| SyncError::CorruptArchive {
                path: Some(source_file.to_path_buf()),
                reason: format!("entry escapes the destination: {}", entry.name()),
            })?;
        let target = dest_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| SyncError::from_io_error(e, "creating directory", Some(target.clone())))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SyncError::from_io_error(e, "creating directory", Some(parent.to_path_buf())))?;
        }
        let mut out = BufWriter::new(
            File::create(&target)
                .map_err(|e| SyncError::from_io_error(e, "writing", Some(target.clone())))?,
        );
        let written = io::copy(&mut entry, &mut out).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => SyncError::CorruptArchive {
                path: Some(source_file.to_path_buf()),
                reason: e.to_string(),
            },
            _ => SyncError::from_io_error(e, "writing", Some(target.clone())),
        })?;
        out.flush()
            .map_err(|e| SyncError::from_io_error(e, "writing", Some(target.clone())))?;
        done += written;
        on_progress(done.min(total), total);
    }
    on_progress(total, total);

    tracing::debug!(
        archive = %source_file.display(),
        dest = %dest_dir.display(),
        entries = zip.len(),
        "extracted archive"
    );
    Ok(())
}

struct ArchiveEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    size: u64,
}

/// Walk `root` in a stable order and compute the archive name of every entry.
fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for item in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let item = item.map_err(|e| {
            let path = e.path().map(Path::to_path_buf);
            SyncError::from_io_error(e.into(), "reading", path)
        })?;

        let relative = item.path().strip_prefix(root).unwrap_or(item.path());
        let name = archive_name(relative);
        let file_type = item.file_type();
        if file_type.is_dir() {
            entries.push(ArchiveEntry {
                path: item.path().to_path_buf(),
                name: format!("{}/", name),
                is_dir: true,
                size: 0,
            });
        } else if file_type.is_file() {
            let size = item
                .metadata()
                .map_err(|e| SyncError::from_io_error(e.into(), "reading", Some(item.path().to_path_buf())))?
                .len();
            entries.push(ArchiveEntry {
                path: item.path().to_path_buf(),
                name,
                is_dir: false,
                size,
            });
        }
    }
    Ok(entries)
}

fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn with_archive_path(err: zip::result::ZipError, path: &Path) -> SyncError {
    match SyncError::from(err) {
        SyncError::CorruptArchive { reason, .. } => SyncError::CorruptArchive {
            path: Some(path.to_path_buf()),
            reason,
        },
        SyncError::Io { source, .. } => SyncError::from_io_error(source, "processing archive", Some(path.to_path_buf())),
        other => other,
    }
}
