//! Domain-specific error types for the Starbeam client core.
//!
//! All fallible operations return `Result<T, CoreError>`.
//! No panics on invalid input — every error is typed and recoverable.

use thiserror::Error;

/// The canonical error type for the client core.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Host Model Errors ────────────────────────────────────────
    /// A host record is missing its unique identifier.
    #[error("host record has no uuid")]
    MissingUuid,

    /// The parent record belongs to a different host.
    ///
    /// Identity is by uuid; a propagation onto a record with another
    /// uuid would silently corrupt the persisted host list.
    #[error("uuid mismatch: record {record} vs parent {parent}")]
    UuidMismatch { record: String, parent: String },

    // ── Persistence Errors ───────────────────────────────────────
    /// The external host store rejected or failed a save request.
    #[error("store error: {0}")]
    Store(String),

    // ── Configuration Errors ─────────────────────────────────────
    /// Reading or writing a configuration file failed.
    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Encoding or decoding of a configuration document failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Other(s)
    }
}

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Other(s.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(e: toml::ser::Error) -> Self {
        CoreError::Encoding(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Encoding(e.to_string())
    }
}
