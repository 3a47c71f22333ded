//! Error types for the trainer core
//!
//! Nothing here is fatal. Every variant has a recovery path: illegal moves are
//! reported back to the player, malformed openings are skipped during loading,
//! and an unavailable engine degrades to a random legal move.

use thiserror::Error;

/// Errors that can occur in trainer operations
#[derive(Error, Debug)]
pub enum TrainerError {
    /// The submitted move is not legal (or not parseable) in the current position
    #[error("Illegal move '{mv}' in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// A recorded opening could not be turned into a move sequence
    #[error("Malformed opening: {reason}")]
    MalformedOpening { reason: String },

    /// The external move source produced nothing
    #[error("Fallback move source unavailable: {message}")]
    FallbackUnavailable { message: String },

    /// Opening id not present in the catalog
    #[error("Unknown opening id {id}")]
    UnknownOpening { id: u32 },

    /// User id not present in the catalog
    #[error("Unknown user id {id}")]
    UnknownUser { id: u64 },

    /// Filesystem error while reading recorded openings
    #[error("Opening I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrainerError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TrainerError::MalformedOpening {
            reason: reason.into(),
        }
    }
}

/// Result type alias for trainer operations
pub type TrainerResult<T> = Result<T, TrainerError>;
