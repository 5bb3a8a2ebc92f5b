//! Common utility functions.

pub mod data;
pub mod fs;
pub mod lock;

// Re-export commonly used items
pub use data::deep_merge;
pub use fs::{resolve_path, stage_restricted, write_restricted, StagedFile};
pub use lock::RunLock;
