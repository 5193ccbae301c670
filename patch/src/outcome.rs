//! Merge results and diagnostics.

use crate::Pointer;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStatus {
    /// At least one error was reported
    Error,
    /// No errors, and the target changed
    Changed,
    /// No errors, and the target is as it was
    #[default]
    Unchanged,
}

impl MergeStatus {
    /// `Changed` when `changed`, otherwise `Unchanged`.
    pub fn from_changed(changed: bool) -> Self {
        if changed {
            MergeStatus::Changed
        } else {
            MergeStatus::Unchanged
        }
    }

    /// Combine two results: `Error` absorbs everything, `Changed` absorbs
    /// `Unchanged`.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (MergeStatus::Error, _) | (_, MergeStatus::Error) => MergeStatus::Error,
            (MergeStatus::Changed, _) | (_, MergeStatus::Changed) => MergeStatus::Changed,
            _ => MergeStatus::Unchanged,
        }
    }

    pub fn is_error(self) -> bool {
        self == MergeStatus::Error
    }

    pub fn is_changed(self) -> bool {
        self == MergeStatus::Changed
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A message about one location in the patch document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Where in the document
    pub path: Pointer,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{} at {}: {}", self.severity, self.path, self.message)
        }
    }
}

/// Result of one merge call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub status: MergeStatus,
    /// Every diagnostic reported during the call, in order
    pub diagnostics: Vec<Diagnostic>,
}

impl MergeOutcome {
    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    pub fn is_changed(&self) -> bool {
        self.status.is_changed()
    }

    pub fn is_unchanged(&self) -> bool {
        self.status == MergeStatus::Unchanged
    }

    /// Diagnostics of error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Diagnostics of warning severity.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// `Ok(changed)` for a successful merge, or the errors as a report.
    pub fn into_result(self) -> Result<bool, ValidationReport> {
        match self.status {
            MergeStatus::Error => Err(ValidationReport {
                errors: self
                    .diagnostics
                    .into_iter()
                    .filter(|d| d.severity == Severity::Error)
                    .collect(),
            }),
            status => Ok(status.is_changed()),
        }
    }
}

/// Client-facing list of validation errors for a rejected patch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("patch document is invalid ({} error(s))", .errors.len())]
pub struct ValidationReport {
    pub errors: Vec<Diagnostic>,
}
