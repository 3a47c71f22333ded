use super::mode::SessionMode;
use crate::opening::OpeningId;
use serde::{Deserialize, Serialize};

/// Result of one player move, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// `false` when the move was rejected; nothing else changed in that case
    pub legal: bool,
    pub mode: SessionMode,
    /// Set only on the move that knocked the player out of theory
    pub mistake_made: bool,
    /// Opponent's reply in SAN, if one was played
    pub opponent_move: Option<String>,
    pub fen: String,
    /// Learned openings still consistent with the game; empty in engine mode
    pub remaining_opening_ids: Vec<OpeningId>,
    pub game_over: bool,
    pub message: String,
}

impl MoveOutcome {
    pub fn in_theory(&self) -> bool {
        self.mode.in_theory()
    }

    pub(crate) fn status_message(mode: SessionMode, mistake_made: bool, game_over: bool) -> String {
        let message = if game_over {
            "Game Over."
        } else if mistake_made {
            "Mistake! Engine taking over."
        } else if mode == SessionMode::Engine {
            "Engine mode."
        } else {
            "Your turn."
        };
        message.to_string()
    }
}
