//! Error types for Trimkit.
//!
//! Only failures that must abort a user-visible operation live here. Out of
//! range edits are clamped by the timeline and seek failures are absorbed by
//! the seek coordinator, so neither has a variant.

use thiserror::Error;

use crate::source::TrackKind;

/// Main error type for Trimkit operations.
#[derive(Error, Debug)]
pub enum TrimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(String),

    /// Inserting a track's time range into a composition failed. Fatal for
    /// the source it came from; retrying will not help.
    #[error("Failed to insert {kind:?} track range: {reason}")]
    TrackInsertion { kind: TrackKind, reason: String },

    #[error("No media source loaded")]
    NoSource,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TrimError {
    /// Whether the failure is tied to the media source itself, so the same
    /// request against the same source will keep failing.
    pub fn is_fatal_for_source(&self) -> bool {
        matches!(self, Self::TrackInsertion { .. } | Self::Media(_))
    }
}

/// Result type alias for Trimkit operations.
pub type Result<T> = std::result::Result<T, TrimError>;
