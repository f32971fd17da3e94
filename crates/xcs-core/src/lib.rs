//! # xcs-core
//!
//! Core types for keeping the canonical crystallography store in step with
//! per-experiment legacy soak databases.
//!
//! This crate has no I/O. It provides:
//! - Tracked-file status enum with a pure transition function
//! - Canonical record structs with static field-accessor tables
//! - Declarative legacy → canonical translation maps
//! - Field value coercion and the reconciliation comparison rules
//! - Proposal/visit extraction from legacy file paths
//! - Cross-cutting error types

pub mod accessor;
pub mod compare;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod proposal_path;
pub mod translation;
pub mod value;
