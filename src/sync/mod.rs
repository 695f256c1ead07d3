//! Save/pull synchronization.
//!
//! Archives worlds into zip files, moves them through the object store and
//! extracts them back into the saves directory.

pub mod archive;
pub mod engine;
pub mod progress;
pub mod selection;
pub mod staging;

pub use archive::{archive, extract, CompressionLevel};
pub use engine::{summary, EngineConfig, SyncEngine, SyncOutcome, TransferJob};
pub use progress::{human_size, ProgressReporter, TransferLine};
pub use selection::{menu, resolve, FixedSelector, Selector, ALL_CHOICE};
pub use staging::StagedFile;
