pub mod backend;
pub mod local;
pub mod s3;
pub mod types;

pub use backend::{ObjectStore, ProgressFn};
pub use local::{default_saves_dir, list_save_dirs, OsFamily};
pub use s3::OpendalStore;
pub use types::*;
