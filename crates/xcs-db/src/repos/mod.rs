//! Repository modules for the canonical store.
//!
//! Each module adds methods to `SyncService` via `impl SyncService` blocks.

pub mod crystal;
pub mod proposal;
pub mod records;
pub mod tracked_file;
