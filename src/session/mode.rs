use serde::{Deserialize, Serialize};
use std::fmt;

/// Who decides the opponent's moves
///
/// `Engine` is terminal: once a session leaves theory it never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Opponent plays from the player's learned repertoire
    Theory,
    /// Opponent plays fallback engine moves (or random legal moves)
    Engine,
}

impl SessionMode {
    pub fn in_theory(self) -> bool {
        self == SessionMode::Theory
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Theory => f.write_str("theory"),
            SessionMode::Engine => f.write_str("engine"),
        }
    }
}
