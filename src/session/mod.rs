//! Training sessions
//!
//! A session is one live game between the player and the trainer's opponent.
//! It tracks the position, the trie nodes still consistent with the moves
//! played (the candidate frontier), and whether the opponent is still
//! answering from theory or has handed over to the fallback engine.
//!
//! # Flow per player move
//!
//! 1. Validate the move; reject without touching any state if illegal
//! 2. Play it and narrow the frontier (theory mode only)
//! 3. An empty frontier is a mistake: switch to engine mode for good
//! 4. Let the opponent reply under the post-transition mode
//! 5. Report mode, mistake flag, reply, position and surviving openings
//!
//! Steps 1 to 4 up to a theory reply read the index; an engine reply does not.
//! `begin_turn` and `finish_turn` expose that split so a caller can drop its
//! index lock before the engine is consulted.
//!
//! # Module Structure
//!
//! - `mode` - [`SessionMode`]
//! - `frontier` - [`CandidateFrontier`]
//! - `outcome` - [`MoveOutcome`] report
//! - `training` - [`TrainingSession`] state machine, [`TurnStep`] and [`Opponent`] settings

mod frontier;
mod mode;
mod outcome;
mod training;


pub use frontier::CandidateFrontier;
pub use mode::SessionMode;
pub use outcome::MoveOutcome;
pub use training::{Opponent, SessionId, TrainingSession, TurnStep};
