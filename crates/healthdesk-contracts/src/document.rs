//! Document library record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub uuid::Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a document is in its simulated processing lifecycle.
///
/// Transitions only move forward: `Uploading` → `Processing` → `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Ready,
}

/// Which canned analysis template a filename resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    LabReport,
    Prescription,
    General,
}

/// The canned analysis attached to a processed document.
///
/// Derived from the filename only; file contents are never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub kind: DocumentKind,
    /// True when the filename mentions a health-related keyword.
    pub health_related: bool,
    /// Fixed per template.
    pub confidence: u8,
    pub summary: String,
    pub findings: Vec<String>,
    /// Random count within the range chosen by filename keyword.
    pub extracted_clauses: u32,
}

/// One entry in the document library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    /// Present once the document reaches `Ready`.
    pub analysis: Option<DocumentAnalysis>,
}
