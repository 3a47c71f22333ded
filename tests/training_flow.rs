//! Training Flow Integration Tests
//!
//! Drives the public API end to end:
//! - Catalog loading into a shared index
//! - Sessions built from a user's learned openings
//! - Theory, mistakes and the engine hand-over

use opening_trainer::catalog::DEFAULT_USER_ID;
use opening_trainer::session::Opponent;
use opening_trainer::{
    Color, OpeningCatalog, OpeningTrieIndex, SessionId, SessionMode, TrainingSession,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::fs;

const ITALIAN: &str = "[Event \"Italian\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 *";
const CARO_KANN: &str = "[Event \"Caro-Kann\"]\n[Color \"Black\"]\n\n1. e4 c6 2. d4 d5 3. Nc3 dxe4 4. Nxe4 Bf5 *";

/// Catalog + index loaded from a temporary openings directory
fn loaded() -> (OpeningCatalog, OpeningTrieIndex) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("italian_game.pgn"), ITALIAN).unwrap();
    fs::write(dir.path().join("caro_kann.pgn"), CARO_KANN).unwrap();

    let mut catalog = OpeningCatalog::new();
    let mut index = OpeningTrieIndex::new();
    catalog.load_dir(&mut index, dir.path()).unwrap();
    (catalog, index)
}

fn start(
    catalog: &OpeningCatalog,
    index: &OpeningTrieIndex,
    color: Color,
    seed: u64,
) -> TrainingSession {
    let learned = catalog.learned_for_color(DEFAULT_USER_ID, color).unwrap();
    TrainingSession::new(
        SessionId::new(),
        index,
        learned,
        color,
        Opponent::offline(),
        StdRng::seed_from_u64(seed),
    )
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn test_italian_reference_scenario() {
    let (mut catalog, index) = loaded();
    let italian = catalog.find_by_name("Italian Game").unwrap().id;
    catalog.toggle_learned(DEFAULT_USER_ID, italian).unwrap();

    let mut session = start(&catalog, &index, Color::White, 42);

    let r = session.submit_move(&index, "e4");
    assert!(r.legal);
    assert_eq!(r.mode, SessionMode::Theory);
    assert!(!r.mistake_made);
    assert_eq!(r.opponent_move.as_deref(), Some("e5"));

    let r = session.submit_move(&index, "Nf3");
    assert_eq!(r.mode, SessionMode::Theory);
    assert_eq!(r.opponent_move.as_deref(), Some("Nc6"));

    let r = session.submit_move(&index, "h3");
    assert!(r.legal);
    assert_eq!(r.mode, SessionMode::Engine);
    assert!(r.mistake_made);

    let r = session.submit_move(&index, "a3");
    assert_eq!(r.mode, SessionMode::Engine);
    assert!(r.opponent_move.is_some());
}

// ============================================================================
// Colour handling
// ============================================================================

#[test]
fn test_black_repertoire_session_opens_with_white_move() {
    let (mut catalog, index) = loaded();
    let caro = catalog.find_by_name("Caro Kann").unwrap().id;
    catalog.toggle_learned(DEFAULT_USER_ID, caro).unwrap();

    let mut session = start(&catalog, &index, Color::Black, 1);
    assert_eq!(session.opening_reply(), Some("e4"));
    assert_eq!(session.mode(), SessionMode::Theory);

    let r = session.submit_move(&index, "c6");
    assert_eq!(r.opponent_move.as_deref(), Some("d4"));
    assert_eq!(r.remaining_opening_ids, vec![caro]);
}

#[test]
fn test_white_repertoire_is_ignored_when_playing_black() {
    let (mut catalog, index) = loaded();
    let italian = catalog.find_by_name("Italian Game").unwrap().id;
    catalog.toggle_learned(DEFAULT_USER_ID, italian).unwrap();

    // Only a White opening is learned, so Black has no theory at all
    let session = start(&catalog, &index, Color::Black, 2);
    assert_eq!(session.mode(), SessionMode::Engine);
    assert!(session.opening_reply().is_some());
    assert!(session.learned_opening_ids().is_empty());
}

// ============================================================================
// Invariants over a full line
// ============================================================================

#[test]
fn test_remaining_ids_track_mode_over_whole_game() {
    let (mut catalog, index) = loaded();
    let caro = catalog.find_by_name("Caro Kann").unwrap().id;
    catalog.toggle_learned(DEFAULT_USER_ID, caro).unwrap();

    let mut session = start(&catalog, &index, Color::Black, 3);
    let learned: BTreeSet<_> = session.learned_opening_ids().clone();
    let mut left_theory = false;

    for mv in ["c6", "d5", "dxe4", "Bf5", "e6", "Nd7"] {
        let r = session.submit_move(&index, mv);
        if !r.legal {
            // Engine replies are random once out of book; stop when our script no longer fits
            break;
        }
        assert!(!r.mistake_made, "{} follows the recorded line", mv);
        let remaining: BTreeSet<_> = r.remaining_opening_ids.iter().copied().collect();
        assert!(remaining.is_subset(&learned));
        assert_eq!(remaining.is_empty(), r.mode == SessionMode::Engine);

        if left_theory {
            assert_eq!(r.mode, SessionMode::Engine);
        }
        left_theory |= r.mode == SessionMode::Engine;
    }
    assert!(left_theory, "the recorded line is finite");
}

#[test]
fn test_sessions_share_one_index_independently() {
    let (mut catalog, index) = loaded();
    let italian = catalog.find_by_name("Italian Game").unwrap().id;
    catalog.toggle_learned(DEFAULT_USER_ID, italian).unwrap();

    let mut a = start(&catalog, &index, Color::White, 10);
    let mut b = start(&catalog, &index, Color::White, 11);

    let ra = a.submit_move(&index, "d4");
    let rb = b.submit_move(&index, "e4");

    assert!(ra.mistake_made);
    assert_eq!(a.mode(), SessionMode::Engine);
    assert!(!rb.mistake_made);
    assert_eq!(b.mode(), SessionMode::Theory);
}
