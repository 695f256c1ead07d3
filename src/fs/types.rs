use std::path::{Component, Path};

/// Extension shared by the archives save produces and the keys pull accepts.
pub const ARCHIVE_EXT: &str = ".zip";

/// An object as reported by the bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub size: u64,
}

impl RemoteObject {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }

    /// Whether the key looks like a world archive.
    pub fn is_archive(&self) -> bool {
        is_archive_key(&self.key)
    }

    /// World name, i.e. the key without the archive extension.
    pub fn world_name(&self) -> Option<&str> {
        world_name(&self.key)
    }
}

/// Object key under which a world is stored: `{name}{ARCHIVE_EXT}`.
pub fn archive_key(world: &str) -> String {
    format!("{}{}", world, ARCHIVE_EXT)
}

pub fn is_archive_key(key: &str) -> bool {
    world_name(key).is_some()
}

/// The key without the archive extension, if what is left can name exactly
/// one directory under the saves root.
pub fn world_name(key: &str) -> Option<&str> {
    let name = key.strip_suffix(ARCHIVE_EXT)?;
    if name.contains(['/', '\\']) {
        return None;
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

/// Direction of a transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Save,
    Pull,
}

impl Direction {
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Save => "Uploading",
            Direction::Pull => "Downloading",
        }
    }
}
