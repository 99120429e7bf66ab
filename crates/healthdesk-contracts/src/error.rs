//! Error types for the HealthDesk assistants.
//!
//! Rule evaluation itself is total and never fails. Errors only surface at the
//! edges: loading rule tables, validating caller input, and looking up records
//! by key or id.

use thiserror::Error;

/// The unified error type for the HealthDesk crates.
#[derive(Debug, Error)]
pub enum HealthdeskError {
    /// A rule table, extraction pattern, or configuration file is malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The caller submitted empty or whitespace-only text.
    #[error("empty input rejected by {surface}")]
    EmptyInput { surface: String },

    /// A structured form (e.g. the disease predictor) failed validation.
    #[error("invalid form: {reason}")]
    InvalidForm { reason: String },

    /// A treatment lookup named a condition key that has no plan.
    #[error("unknown condition '{key}'")]
    UnknownCondition { key: String },

    /// A file was offered to the document library with an unsupported extension.
    #[error("unsupported document '{name}': accepted extensions are {accepted}")]
    UnsupportedDocument { name: String, accepted: String },

    /// A document id did not match anything in the library.
    #[error("document '{id}' not found")]
    DocumentNotFound { id: String },

    /// A document lifecycle step was requested from the wrong status.
    #[error("document '{id}': {reason}")]
    InvalidDocumentState { id: String, reason: String },

    /// The conversation history could not record a message.
    #[error("history write failed: {reason}")]
    HistoryWriteFailed { reason: String },
}

/// Convenience alias used throughout the HealthDesk crates.
pub type HealthdeskResult<T> = Result<T, HealthdeskError>;
