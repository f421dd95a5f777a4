//! Error taxonomy.
//!
//! Two kinds of failure exist:
//! - document-level failures ([`PrintError`]) abort the current document and
//!   surface as a single `Err`;
//! - per-item issues ([`ItemIssue`]) are recovered in place and collected in
//!   a [`Manifest`] returned next to the document.

use serde::Serialize;
use thiserror::Error;

/// Failure reported by a [`RenderSurface`](crate::surface::RenderSurface).
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing outside of a page: {0}")]
    NoOpenPage(&'static str),

    #[error("document not started")]
    NoDocument,

    #[error("image '{path}' could not be loaded: {reason}")]
    Image { path: String, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document-level error. Any of these aborts the document being printed;
/// no partial output is returned.
#[derive(Debug, Error)]
pub enum PrintError {
    /// A capacity table carries a non-positive value. Raised by configuration
    /// validation before any flow starts.
    #[error(
        "capacity table for {document} is misconfigured: first page {first}, subsequent pages {subsequent} (both must be > 0)"
    )]
    CapacityTableMisconfiguration {
        document: String,
        first: i64,
        subsequent: i64,
    },

    #[error("render surface failure: {0}")]
    RenderSurfaceFailure(#[from] SurfaceError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid print job: {0}")]
    InvalidJob(#[from] serde_json::Error),
}

/// A recoverable problem with one item of a document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemIssue {
    /// The item was skipped; it is not placed and not counted as printed.
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: &'static str },

    /// The value could not be read as a number; `substituted` was used.
    #[error("invalid numeric value {raw:?} for `{field}`, using {substituted}")]
    InvalidNumericValue {
        field: &'static str,
        raw: String,
        substituted: String,
    },
}

/// One manifest line: which item, and what went wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Human-readable identification ("line 3 (Cherokee Purple)").
    pub subject: String,
    pub issue: ItemIssue,
}

/// Per-document collection of recovered issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue and log it.
    pub fn record(&mut self, subject: impl Into<String>, issue: ItemIssue) {
        let subject = subject.into();
        log::warn!("{subject}: {issue}");
        self.entries.push(ManifestEntry { subject, issue });
    }

    /// Entries for items that were skipped entirely.
    pub fn missing(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.issue, ItemIssue::MissingRequiredField { .. }))
    }

    /// Entries where a default value was substituted.
    pub fn substituted(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.issue, ItemIssue::InvalidNumericValue { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: Manifest) {
        self.entries.extend(other.entries);
    }
}
