//! Diff reports and error artifacts.
//!
//! Names are deterministic: the configured path segments joined with `_`,
//! then the modification time and the record kind. A diff report is JSON
//! Lines, one `DiffEntry` per line; an error artifact is a single pretty
//! JSON document.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xcs_core::compare::DiffEntry;
use xcs_core::enums::RecordKind;
use xcs_core::proposal_path::joined_segments;

use crate::error::DatabaseError;

/// Stem used when none of the configured segments exist in the path.
const FALLBACK_STEM: &str = "soakdb";

/// One failure recorded while validating a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub crystal: Option<String>,
    /// Canonical field being compared, when the failure is field-scoped.
    pub field: Option<String>,
    pub message: String,
}

/// Contents of an `.error.json` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorArtifact {
    pub path: String,
    pub kind: RecordKind,
    pub modification_time: String,
    pub errors: Vec<ErrorEntry>,
    /// Diffs found alongside the errors; not written separately.
    pub diff_count: usize,
}

/// Deterministic report file stem for one (file, kind) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportName {
    stem: String,
}

impl ReportName {
    #[must_use]
    pub fn new(path: &str, segments: &[usize], modification_time: &str, kind: RecordKind) -> Self {
        let prefix = joined_segments(path, segments);
        let prefix = if prefix.trim_matches('_').is_empty() {
            FALLBACK_STEM
        } else {
            prefix.as_str()
        };
        Self {
            stem: format!("{prefix}_{modification_time}_{kind}"),
        }
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn diff_file(&self) -> String {
        format!("{}.diff.jsonl", self.stem)
    }

    #[must_use]
    pub fn error_file(&self) -> String {
        format!("{}.error.json", self.stem)
    }
}

/// Destination for validation output.
pub trait ReportSink: Send + Sync {
    /// Write a diff report; returns where it went.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the report cannot be written.
    fn write_diffs(&self, name: &ReportName, diffs: &[DiffEntry]) -> Result<PathBuf, DatabaseError>;

    /// Write an error artifact; returns where it went.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the artifact cannot be written.
    fn write_errors(
        &self,
        name: &ReportName,
        artifact: &ErrorArtifact,
    ) -> Result<PathBuf, DatabaseError>;
}

/// Writes reports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    directory: PathBuf,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn target(&self, file_name: &str) -> Result<PathBuf, DatabaseError> {
        std::fs::create_dir_all(&self.directory)?;
        Ok(self.directory.join(file_name))
    }
}

impl ReportSink for FileReportSink {
    fn write_diffs(&self, name: &ReportName, diffs: &[DiffEntry]) -> Result<PathBuf, DatabaseError> {
        let target = self.target(&name.diff_file())?;
        serde_jsonlines::write_json_lines(&target, diffs)?;
        Ok(target)
    }

    fn write_errors(
        &self,
        name: &ReportName,
        artifact: &ErrorArtifact,
    ) -> Result<PathBuf, DatabaseError> {
        let target = self.target(&name.error_file())?;
        let writer = BufWriter::new(File::create(&target)?);
        serde_json::to_writer_pretty(writer, artifact)
            .map_err(|e| DatabaseError::Io(e.into()))?;
        Ok(target)
    }
}
