//! UCI engine driver
//!
//! Asks an external UCI engine (Stockfish by default) for one best move.
//! Each call drives a fresh engine through the `stockfish` crate on a worker
//! thread; the caller waits on a channel for at most the think budget.
//!
//! ## Module Organization
//!
//! - `error` - [`UciError`]

mod error;

pub use error::{UciError, UciResult};

use crossbeam_channel::RecvTimeoutError;
use log::{debug, info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use stockfish::Stockfish;

/// Environment variable naming the engine executable
pub const ENGINE_PATH_ENV: &str = "STOCKFISH_PATH";

/// Locations tried after the explicit path and the environment variable
pub const DEFAULT_CANDIDATES: [&str; 2] = ["backend/stockfish.exe", "stockfish"];

/// Handle on an engine executable
#[derive(Debug, Clone)]
pub struct UciEngine {
    path: PathBuf,
}

impl UciEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find an engine binary
    ///
    /// Order: `explicit`, then `$STOCKFISH_PATH`, then [`DEFAULT_CANDIDATES`].
    /// Bare names are looked up on `PATH`.
    pub fn discover(explicit: Option<&Path>) -> Option<Self> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(path) = explicit {
            candidates.push(path.to_path_buf());
        }
        if let Some(path) = env::var_os(ENGINE_PATH_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.extend(DEFAULT_CANDIDATES.iter().map(PathBuf::from));

        for candidate in &candidates {
            if let Some(found) = resolve_executable(candidate) {
                info!("[ENGINE] Using UCI engine at {:?}", found);
                return Some(Self::new(found));
            }
        }

        warn!(
            "[ENGINE] No UCI engine found. Searched: {:?}",
            candidates
        );
        None
    }

    /// Best move for `fen` in UCI notation, within `budget` wall-clock time
    ///
    /// `Ok(None)` means the engine reported no legal move. When the budget
    /// runs out the search is abandoned on its worker, which drops the engine
    /// (closing its stdin) once the search returns.
    pub fn best_move(&self, fen: &str, budget: Duration) -> UciResult<Option<String>> {
        let started = Instant::now();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let path = self.path.to_string_lossy().into_owned();
        let fen = fen.to_string();

        thread::Builder::new()
            .name("uci-search".to_string())
            .spawn(move || {
                // The receiver may have given up already
                let _ = tx.send(search(&path, &fen));
            })
            .map_err(|e| UciError::Start {
                message: e.to_string(),
            })?;

        let best = match rx.recv_timeout(budget) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => {
                warn!("[ENGINE] No answer within {:?}", budget);
                return Err(UciError::Timeout { budget });
            }
            Err(RecvTimeoutError::Disconnected) => return Err(UciError::Disconnected),
        };

        debug!(
            "[ENGINE] bestmove {:?} after {:?} (budget {:?})",
            best,
            started.elapsed(),
            budget
        );
        Ok(best)
    }
}

/// One engine session: start, set the position, search, read the move
fn search(path: &str, fen: &str) -> UciResult<Option<String>> {
    let mut engine = Stockfish::new(path).map_err(|e| UciError::Start {
        message: e.to_string(),
    })?;
    engine.set_fen_position(fen).map_err(engine_error)?;
    engine.set_depth(12);
    let output = engine.go().map_err(engine_error)?;
    Ok(uci_move(&output.best_move().to_string()))
}

fn engine_error(e: impl std::fmt::Display) -> UciError {
    UciError::Engine {
        message: e.to_string(),
    }
}

/// `(none)` and the null move both mean the side to move has no legal move
fn uci_move(best: &str) -> Option<String> {
    match best.trim() {
        "" | "(none)" | "0000" => None,
        mv => Some(mv.to_string()),
    }
}

fn resolve_executable(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    // Bare program name: search PATH
    if candidate.components().count() == 1 {
        let path_var = env::var_os("PATH")?;
        return env::split_paths(&path_var)
            .map(|dir| dir.join(candidate))
            .find(|full| full.is_file());
    }
    None
}
