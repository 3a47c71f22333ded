//! Move notation adapter
//!
//! Thin layer over `shakmaty`: turns recorded PGN text into a sequence of
//! plies, and validates or applies player-submitted moves against a live
//! position. The trie and the session never look at board internals; they only
//! see [`Ply`], [`MoveKey`] and opaque [`Chess`] positions produced here.
//!
//! - `pgn` - Mainline extraction from PGN movetext

mod pgn;

use crate::core::{TrainerError, TrainerResult};
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};
use std::fmt;

pub use pgn::{mainline_tokens, recorded_color};

/// Canonical, position-independent spelling of a move (UCI text)
///
/// SAN depends on the position (disambiguation, check suffixes), so trie
/// children are keyed by the UCI form instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveKey(String);

impl MoveKey {
    pub fn of(mv: &Move) -> Self {
        MoveKey(mv.to_uci(CastlingMode::Standard).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded half-move together with the position it produces
#[derive(Debug, Clone)]
pub struct Ply {
    pub key: MoveKey,
    pub mv: Move,
    pub san: String,
    pub position: Chess,
}

/// Standard starting position
pub fn start_position() -> Chess {
    Chess::default()
}

/// Parse the mainline of a PGN game into plies from the starting position
///
/// Variations, comments and annotations are ignored. Any SAN token that does
/// not resolve to a legal move, or an empty mainline, makes the whole opening
/// malformed.
pub fn parse_sequence(pgn_text: &str) -> TrainerResult<Vec<Ply>> {
    let tokens = mainline_tokens(pgn_text);
    if tokens.is_empty() {
        return Err(TrainerError::malformed("no moves in mainline"));
    }

    let mut position = start_position();
    let mut plies = Vec::with_capacity(tokens.len());

    for (idx, token) in tokens.iter().enumerate() {
        let mv = resolve_san(&position, token).ok_or_else(|| {
            TrainerError::malformed(format!("ply {} '{}' is not legal", idx + 1, token))
        })?;
        let san = to_san(&position, &mv);
        position.play_unchecked(&mv);
        plies.push(Ply {
            key: MoveKey::of(&mv),
            mv,
            san,
            position: position.clone(),
        });
    }

    Ok(plies)
}

fn resolve_san(position: &Chess, text: &str) -> Option<Move> {
    let san_plus = SanPlus::from_ascii(text.as_bytes()).ok()?;
    san_plus.san.to_move(position).ok()
}

fn resolve_uci(position: &Chess, text: &str) -> Option<Move> {
    let uci = UciMove::from_ascii(text.as_bytes()).ok()?;
    uci.to_move(position).ok()
}

/// Validate a player-submitted move (SAN first, then UCI) against `position`
///
/// Pure query: the position is never touched, so a rejected move can simply be
/// resubmitted.
pub fn parse_move(position: &Chess, text: &str) -> TrainerResult<Move> {
    let text = text.trim();
    resolve_san(position, text)
        .or_else(|| resolve_uci(position, text))
        .filter(|mv| position.is_legal(mv))
        .ok_or_else(|| TrainerError::IllegalMove {
            mv: text.to_string(),
            fen: fen(position),
        })
}

/// SAN for `mv` in `position`, with `+`/`#` suffix
pub fn to_san(position: &Chess, mv: &Move) -> String {
    let san = San::from_move(position, mv);
    let mut after = position.clone();
    after.play_unchecked(mv);

    if after.is_checkmate() {
        format!("{}#", san)
    } else if after.is_check() {
        format!("{}+", san)
    } else {
        san.to_string()
    }
}

pub fn legal_moves(position: &Chess) -> Vec<Move> {
    position.legal_moves().into_iter().collect()
}

/// Returns the position after `mv`; the caller guarantees legality
pub fn apply_move(position: &Chess, mv: &Move) -> Chess {
    let mut next = position.clone();
    next.play_unchecked(mv);
    next
}

/// Checkmate, stalemate or a rules draw (insufficient material)
pub fn is_game_over(position: &Chess) -> bool {
    position.is_game_over()
}

pub fn fen(position: &Chess) -> String {
    Fen(position.clone().into_setup(EnPassantMode::Legal)).to_string()
}

pub fn side_to_move(position: &Chess) -> Color {
    position.turn()
}

/// Lowercase colour name used on the wire ("white" / "black")
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Inverse of [`color_name`], case-insensitive
pub fn parse_color(text: &str) -> Option<Color> {
    match text.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}
