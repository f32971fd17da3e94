//! Canonical entity structs.
//!
//! `Crystal` is the root entity; `Lab`, `Refinement`, `Dimple` and
//! `DataProcessing` each reference exactly one crystal.

mod crystal;
mod data_processing;
mod dimple;
mod lab;
mod proposal;
mod refinement;
mod tracked_file;

pub use crystal::Crystal;
pub use data_processing::DataProcessing;
pub use dimple::Dimple;
pub use lab::Lab;
pub use proposal::Proposal;
pub use refinement::Refinement;
pub use tracked_file::TrackedFile;
