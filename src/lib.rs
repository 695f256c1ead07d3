// Library module for save-sync
// Re-exports modules for use in integration tests and the binary

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
pub mod prompt;
pub mod sync;

pub use error::{Result, SyncError};
