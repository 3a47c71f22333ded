//! Chess opening trainer core
//!
//! Compresses recorded opening lines into a shared move trie and walks live
//! training games through it. While the player stays inside the lines they have
//! learned, the opponent answers from the same repertoire; the first deviation
//! hands the opponent over to a fallback engine for the rest of the game.
//!
//! # Module Organization
//!
//! - `core` - Errors, configuration and logging setup
//! - `notation` - SAN/PGN handling on top of `shakmaty`
//! - `opening` - The opening trie index
//! - `session` - Candidate frontier and the per-game state machine
//! - `fallback` - Engine-backed move sources used once theory is exhausted
//! - `catalog` - Recorded openings and per-user learned sets

pub mod catalog;
pub mod core;
pub mod fallback;
pub mod notation;
pub mod opening;
pub mod session;

pub use crate::catalog::{LearnToggle, OpeningCatalog, RecordedOpening, UploadOutcome, UserId};
pub use crate::core::{TrainerConfig, TrainerError, TrainerResult};
pub use crate::fallback::{FallbackMoveSource, NoFallback, UciFallback};
pub use crate::notation::{MoveKey, Ply};
pub use crate::opening::{NodeId, OpeningId, OpeningTrieIndex, TrieNode};
pub use crate::session::{
    CandidateFrontier, MoveOutcome, SessionId, SessionMode, TrainingSession, TurnStep,
};

pub use shakmaty::{Chess, Color, Move};
