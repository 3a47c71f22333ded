use super::frontier::CandidateFrontier;
use super::mode::SessionMode;
use super::outcome::MoveOutcome;
use crate::core::config::DEFAULT_ENGINE_BUDGET_MS;
use crate::core::{TrainerError, TrainerResult};
use crate::fallback::{FallbackMoveSource, NoFallback};
use crate::notation::{self, MoveKey};
use crate::opening::{NodeId, OpeningId, OpeningTrieIndex};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Move, Position};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// How the opponent finds moves once theory runs out
#[derive(Clone)]
pub struct Opponent {
    pub fallback: Arc<dyn FallbackMoveSource>,
    pub budget: Duration,
}

impl Opponent {
    pub fn new(fallback: Arc<dyn FallbackMoveSource>, budget: Duration) -> Self {
        Self { fallback, budget }
    }

    /// No engine at all: every off-book reply is a random legal move
    pub fn offline() -> Self {
        Self::new(
            Arc::new(NoFallback),
            Duration::from_millis(DEFAULT_ENGINE_BUDGET_MS),
        )
    }
}

impl fmt::Debug for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opponent")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// Player move that has been applied against the index but whose engine
/// reply, if one is owed, is still pending
///
/// Produced by [`TrainingSession::begin_turn`] while the caller holds the
/// index; consumed by [`TrainingSession::finish_turn`], which never touches the
/// index and may therefore run after any index lock has been released.
#[derive(Debug)]
#[must_use]
pub struct TurnStep {
    outcome: MoveOutcome,
    engine_owes_reply: bool,
    opening: bool,
}

impl TurnStep {
    /// The engine still has to answer in [`TrainingSession::finish_turn`]
    pub fn needs_engine(&self) -> bool {
        self.engine_owes_reply
    }
}

/// One live training game
///
/// The index is passed into every call rather than stored, so many sessions
/// can share one index behind whatever lock the caller prefers. Node ids the
/// session keeps are only meaningful for the index it was created with; ids
/// another index does not know read as an exhausted frontier. Calls on a single
/// session must be serialized by the caller.
#[derive(Debug)]
pub struct TrainingSession<R = StdRng> {
    id: SessionId,
    position: Chess,
    color: Color,
    learned: BTreeSet<OpeningId>,
    frontier: CandidateFrontier,
    mode: SessionMode,
    opponent: Opponent,
    rng: R,
    opening_reply: Option<String>,
    history: Vec<String>,
}

impl<R: Rng> TrainingSession<R> {
    /// Start a game at the standard position
    ///
    /// `learned` must already be filtered to openings recorded for `color`.
    /// Without any indexed learned opening the session starts in engine mode.
    /// When the player has Black, the opponent's first move is played here.
    pub fn new(
        id: SessionId,
        index: &OpeningTrieIndex,
        learned: BTreeSet<OpeningId>,
        color: Color,
        opponent: Opponent,
        rng: R,
    ) -> Self {
        let (mut session, step) = Self::begin(id, index, learned, color, opponent, rng);
        let _ = session.finish_turn(step);
        session
    }

    /// [`new`](Self::new) split at the index boundary
    ///
    /// Finish the returned step with [`finish_turn`](Self::finish_turn); for a
    /// Black session out of theory that is where the engine's first move is
    /// played.
    pub fn begin(
        id: SessionId,
        index: &OpeningTrieIndex,
        learned: BTreeSet<OpeningId>,
        color: Color,
        opponent: Opponent,
        rng: R,
    ) -> (Self, TurnStep) {
        let frontier = CandidateFrontier::seeded(index, &learned);
        let mode = if frontier.is_empty() {
            SessionMode::Engine
        } else {
            SessionMode::Theory
        };

        info!(
            "[SESSION] {} created: player {:?}, learned {:?}, mode {}",
            id, color, learned, mode
        );

        let mut session = Self {
            id,
            position: notation::start_position(),
            color,
            learned,
            frontier,
            mode,
            opponent,
            rng,
            opening_reply: None,
            history: Vec::new(),
        };

        let opponent_move = if color == Color::Black {
            session.theory_turn(index)
        } else {
            None
        };
        let engine_owes_reply =
            color == Color::Black && opponent_move.is_none() && session.mode == SessionMode::Engine;

        let mut outcome = session.snapshot(index);
        outcome.opponent_move = opponent_move;
        let step = TurnStep {
            outcome,
            engine_owes_reply,
            opening: true,
        };
        (session, step)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        notation::fen(&self.position)
    }

    pub fn learned_opening_ids(&self) -> &BTreeSet<OpeningId> {
        &self.learned
    }

    pub fn frontier(&self) -> &CandidateFrontier {
        &self.frontier
    }

    /// Opponent's first move when the player has Black
    pub fn opening_reply(&self) -> Option<&str> {
        self.opening_reply.as_deref()
    }

    /// SAN of every move played so far, both sides
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_game_over(&self) -> bool {
        notation::is_game_over(&self.position)
    }

    pub fn remaining_opening_ids(&self, index: &OpeningTrieIndex) -> BTreeSet<OpeningId> {
        self.frontier.remaining_opening_ids(index, &self.learned)
    }

    /// Play the player's move and the opponent's reply
    ///
    /// Never fails: a rejected move comes back with `legal == false` and the
    /// session untouched.
    pub fn submit_move(&mut self, index: &OpeningTrieIndex, move_text: &str) -> MoveOutcome {
        let step = self.begin_turn(index, move_text);
        self.finish_turn(step)
    }

    /// Like [`submit_move`](Self::submit_move) but surfaces the rejection reason
    pub fn try_move(
        &mut self,
        index: &OpeningTrieIndex,
        move_text: &str,
    ) -> TrainerResult<MoveOutcome> {
        let step = self.advance(index, move_text)?;
        Ok(self.finish_turn(step))
    }

    /// Index-reading half of [`submit_move`](Self::submit_move)
    ///
    /// Validates and plays the move, narrows the frontier and plays a theory
    /// reply if one exists. A rejected move yields a finished step.
    pub fn begin_turn(&mut self, index: &OpeningTrieIndex, move_text: &str) -> TurnStep {
        match self.advance(index, move_text) {
            Ok(step) => step,
            Err(e) => {
                debug!("[SESSION] {} rejected '{}': {}", self.id, move_text, e);
                let mut outcome = self.snapshot(index);
                outcome.legal = false;
                outcome.message = e.to_string();
                TurnStep {
                    outcome,
                    engine_owes_reply: false,
                    opening: false,
                }
            }
        }
    }

    /// Index-free half: the engine reply, if owed, and the final report
    pub fn finish_turn(&mut self, step: TurnStep) -> MoveOutcome {
        let TurnStep {
            mut outcome,
            engine_owes_reply,
            opening,
        } = step;

        if engine_owes_reply {
            outcome.opponent_move = self.engine_reply();
        }
        if opening {
            self.opening_reply = outcome.opponent_move.clone();
        }
        if !outcome.legal {
            return outcome;
        }

        // Engine mode always has an empty frontier
        if self.mode == SessionMode::Engine {
            outcome.remaining_opening_ids.clear();
        }
        outcome.mode = self.mode;
        outcome.fen = self.fen();
        outcome.game_over = self.is_game_over();
        outcome.message =
            MoveOutcome::status_message(self.mode, outcome.mistake_made, outcome.game_over);
        outcome
    }

    /// Current state as an outcome with no move attached
    pub fn snapshot(&self, index: &OpeningTrieIndex) -> MoveOutcome {
        let game_over = self.is_game_over();
        MoveOutcome {
            legal: true,
            mode: self.mode,
            mistake_made: false,
            opponent_move: None,
            fen: self.fen(),
            remaining_opening_ids: self.remaining_opening_ids(index).into_iter().collect(),
            game_over,
            message: MoveOutcome::status_message(self.mode, false, game_over),
        }
    }

    fn advance(&mut self, index: &OpeningTrieIndex, move_text: &str) -> TrainerResult<TurnStep> {
        let mv = notation::parse_move(&self.position, move_text)?;
        let key = MoveKey::of(&mv);
        self.play(&mv);

        let mut mistake_made = false;
        if self.mode == SessionMode::Theory {
            let next = self.frontier.advance(index, &self.learned, &key);
            if next.is_empty() {
                info!(
                    "[SESSION] {} left theory with {} after {:?}",
                    self.id,
                    move_text.trim(),
                    self.history
                );
                self.enter_engine_mode();
                mistake_made = true;
            } else {
                self.frontier = next;
            }
        }

        let opponent_move = self.theory_turn(index);
        let engine_owes_reply = opponent_move.is_none() && self.mode == SessionMode::Engine;

        let mut outcome = self.snapshot(index);
        outcome.mistake_made = mistake_made;
        outcome.opponent_move = opponent_move;
        Ok(TurnStep {
            outcome,
            engine_owes_reply,
            opening: false,
        })
    }

    fn play(&mut self, mv: &Move) {
        self.history.push(notation::to_san(&self.position, mv));
        self.position = notation::apply_move(&self.position, mv);
    }

    fn enter_engine_mode(&mut self) {
        self.mode = SessionMode::Engine;
        self.frontier.clear();
    }

    /// Theory half of the opponent's turn
    ///
    /// With no learned continuation left the session switches to engine mode
    /// and returns `None`; the engine reply then comes from
    /// [`engine_reply`](Self::engine_reply).
    fn theory_turn(&mut self, index: &OpeningTrieIndex) -> Option<String> {
        if self.mode != SessionMode::Theory {
            return None;
        }

        let possible = self.frontier.continuations(index, &self.learned);
        if possible.is_empty() {
            info!("[SESSION] {} has no learned reply, engine takes over", self.id);
            self.enter_engine_mode();
            return None;
        }
        if self.is_game_over() {
            return None;
        }

        let reply = self.theory_reply(index, possible);
        if reply.is_none() {
            self.enter_engine_mode();
        }
        reply
    }

    /// Random pick among learned continuations, played on the board
    fn theory_reply(
        &mut self,
        index: &OpeningTrieIndex,
        possible: Vec<(MoveKey, NodeId)>,
    ) -> Option<String> {
        let (chosen_key, chosen_node) = possible[self.rng.random_range(0..possible.len())].clone();
        let mv = index.node(chosen_node)?.move_from_parent()?.clone();
        if !self.position.is_legal(&mv) {
            warn!(
                "[SESSION] {} index move {} is illegal here, ignoring theory",
                self.id, chosen_key
            );
            return None;
        }

        let san = notation::to_san(&self.position, &mv);
        self.play(&mv);
        self.frontier = CandidateFrontier::from_nodes(
            possible
                .into_iter()
                .filter(|(key, _)| *key == chosen_key)
                .map(|(_, node)| node),
        );
        debug!("[SESSION] {} theory reply {}", self.id, san);

        // End of the known line is not a mistake, just the end of theory
        if !self.frontier.has_continuation(index, &self.learned) {
            info!("[SESSION] {} reached the end of its learned lines", self.id);
            self.enter_engine_mode();
        }

        Some(san)
    }

    /// Engine suggestion if it is legal here
    pub(super) fn fallback_move(&self) -> TrainerResult<Move> {
        self.opponent
            .fallback
            .best_move(&self.position, self.opponent.budget)
            .filter(|mv| self.position.is_legal(mv))
            .ok_or_else(|| TrainerError::FallbackUnavailable {
                message: "no legal engine move".to_string(),
            })
    }

    /// Fallback engine move, or a random legal move if the engine has none
    ///
    /// Nothing is played, and the engine is not asked, once the game is over.
    fn engine_reply(&mut self) -> Option<String> {
        if self.is_game_over() {
            return None;
        }

        let mv = match self.fallback_move() {
            Ok(mv) => mv,
            Err(e) => {
                debug!("[SESSION] {} {}; playing a random legal move", self.id, e);
                let legal = notation::legal_moves(&self.position);
                if legal.is_empty() {
                    return None;
                }
                legal[self.rng.random_range(0..legal.len())].clone()
            }
        };

        let san = notation::to_san(&self.position, &mv);
        self.play(&mv);
        debug!("[SESSION] {} engine reply {}", self.id, san);
        Some(san)
    }
}
