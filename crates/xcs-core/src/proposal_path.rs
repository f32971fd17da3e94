//! Proposal and visit identifiers derived from legacy file paths.
//!
//! Legacy files live under a fixed directory layout, e.g.
//! `/dls/labxchem/data/2019/lb18145-112/processing/database/soakDBDataFile.sqlite`.
//! Splitting on `/` (the leading empty segment included) puts the visit at
//! index 5; the proposal is the visit up to its first `-`.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Default index of the visit segment.
pub const VISIT_SEGMENT: usize = 5;

/// Segment `idx` of `path` split on `/`. The leading empty segment of an
/// absolute path counts.
#[must_use]
pub fn path_segment(path: &str, idx: usize) -> Option<&str> {
    path.split('/').nth(idx)
}

/// Proposal/visit pair extracted from a legacy file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPath {
    pub visit: String,
    pub proposal: String,
}

impl ProposalPath {
    /// Extract the visit at `visit_segment` and the proposal it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Lookup` if the path has no non-empty segment at
    /// `visit_segment`.
    pub fn parse(path: &str, visit_segment: usize) -> Result<Self, CoreError> {
        let visit = path_segment(path, visit_segment)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                CoreError::Lookup(format!(
                    "path '{path}' has no visit segment at index {visit_segment}"
                ))
            })?;
        let proposal = visit.split('-').next().unwrap_or(visit);
        Ok(Self {
            visit: visit.to_string(),
            proposal: proposal.to_string(),
        })
    }
}

/// Join the given segments of `path` with `_`. Missing segments are skipped.
#[must_use]
pub fn joined_segments(path: &str, segments: &[usize]) -> String {
    segments
        .iter()
        .filter_map(|idx| path_segment(path, *idx))
        .collect::<Vec<_>>()
        .join("_")
}
