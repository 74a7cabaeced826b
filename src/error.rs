//! Error Types
//!
//! Error categories surfaced by the memory system. Lookup misses are
//! expressed as `Option`/`bool` return values rather than errors — see the
//! `recall_*` and `delete_*` operations on [`crate::memory::Memory`].

use crate::model::MemoryKind;

/// Errors surfaced by the public façade and storage layer.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Ingress validation failed before any store mutation occurred.
    #[error("validation error: {0}")]
    Validation(String),
    /// A semantic `concept_name` or procedural `procedure_name` already exists.
    #[error("{kind} record with key {key:?} already exists")]
    UniquenessViolation {
        /// Which kind of memory the violated key belongs to.
        kind: MemoryKind,
        /// The natural key that collided.
        key: String,
    },
    /// Underlying database failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    /// Filesystem failure (backup, database file access).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Export/import document could not be parsed as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// A single malformed configuration key, recorded rather than raised.
///
/// [`crate::config::Config::from_json`] collects these while substituting the
/// built-in default for each offending key; it never aborts the whole parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParseError {
    /// Dotted key that failed to parse (e.g. `"decay.decay_rate"`).
    pub key: String,
    /// Human-readable description of what was wrong.
    pub message: String,
}

impl std::fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config key {:?}: {}", self.key, self.message)
    }
}
