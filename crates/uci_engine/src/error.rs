//! Error types for the UCI driver

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking a UCI engine for a move
#[derive(Error, Debug)]
pub enum UciError {
    /// The executable could not be started or failed the handshake
    #[error("Failed to start engine: {message}")]
    Start { message: String },

    /// The engine failed while setting up the position or searching
    #[error("Engine error: {message}")]
    Engine { message: String },

    /// The engine did not answer within the budget
    #[error("Engine did not answer within {budget:?}")]
    Timeout { budget: Duration },

    /// The search thread went away without answering
    #[error("Engine worker exited without a result")]
    Disconnected,
}

/// Result type alias for engine operations
pub type UciResult<T> = Result<T, UciError>;
