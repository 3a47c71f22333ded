//! Fallback move sources
//!
//! Once a session leaves theory the opponent asks a [`FallbackMoveSource`] for
//! a move. Returning `None` is a normal outcome (engine missing, crashed, or
//! too slow); the session then picks a random legal move itself.
//!
//! - [`NoFallback`] - never answers
//! - [`UciFallback`] - external UCI engine via the `uci_engine` crate

use crate::notation;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use uci_engine::UciEngine;

/// "Best move for a position" black box
///
/// Implementations must be callable repeatedly and must not block longer than
/// `budget`.
pub trait FallbackMoveSource: Send + Sync {
    fn best_move(&self, position: &Chess, budget: Duration) -> Option<Move>;
}

/// Source used when no engine is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackMoveSource for NoFallback {
    fn best_move(&self, _position: &Chess, _budget: Duration) -> Option<Move> {
        None
    }
}

/// External UCI engine
#[derive(Debug, Clone)]
pub struct UciFallback {
    engine: UciEngine,
}

impl UciFallback {
    pub fn new(engine: UciEngine) -> Self {
        Self { engine }
    }

    /// Locate an engine binary; `None` if nothing usable is installed
    pub fn discover(explicit: Option<&Path>) -> Option<Self> {
        UciEngine::discover(explicit).map(Self::new)
    }
}

impl FallbackMoveSource for UciFallback {
    fn best_move(&self, position: &Chess, budget: Duration) -> Option<Move> {
        let fen = notation::fen(position);
        let reply = match self.engine.best_move(&fen, budget) {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                debug!("[ENGINE] Engine reports no move for {}", fen);
                return None;
            }
            Err(e) => {
                warn!("[ENGINE] Engine error: {}", e);
                return None;
            }
        };

        let mv = UciMove::from_ascii(reply.as_bytes())
            .ok()
            .and_then(|uci| uci.to_move(position).ok());
        if mv.is_none() {
            warn!("[ENGINE] Engine suggested unusable move '{}' for {}", reply, fen);
        }
        mv
    }
}

/// Shared sources are sources too, so callers can hold `Arc<dyn FallbackMoveSource>`
impl<T: FallbackMoveSource + ?Sized> FallbackMoveSource for std::sync::Arc<T> {
    fn best_move(&self, position: &Chess, budget: Duration) -> Option<Move> {
        (**self).best_move(position, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_fallback_never_answers() {
        let start = notation::start_position();
        assert!(NoFallback
            .best_move(&start, Duration::from_millis(10))
            .is_none());
    }

    #[test]
    fn missing_engine_binary_yields_none() {
        let fallback = UciFallback::new(UciEngine::new("/no/such/engine"));
        let start = notation::start_position();
        assert!(fallback
            .best_move(&start, Duration::from_millis(50))
            .is_none());
    }
}
