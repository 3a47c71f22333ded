//! Trainer configuration
//!
//! Every field has a serde default so a partial JSON file (or none at all) is
//! enough. The backend binary layers CLI flags and environment variables on top.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Think time handed to the fallback engine per reply
pub const DEFAULT_ENGINE_BUDGET_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Directory scanned for `*.pgn` recorded openings at startup
    pub openings_dir: PathBuf,

    /// Explicit UCI engine executable; `None` searches the usual locations
    pub engine_path: Option<PathBuf>,

    /// Upper bound on a single fallback engine call, in milliseconds
    pub engine_budget_ms: u64,

    /// Socket address the HTTP service binds to
    pub bind: SocketAddr,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,

    /// Seed for the opponent's random choices; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            openings_dir: PathBuf::from("openings"),
            engine_path: None,
            engine_budget_ms: DEFAULT_ENGINE_BUDGET_MS,
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_filter: "info".to_string(),
            seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn engine_budget(&self) -> Duration {
        Duration::from_millis(self.engine_budget_ms)
    }

    /// Load configuration from a JSON file, falling back to defaults
    ///
    /// A missing or unreadable file is not an error: the trainer always starts.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<TrainerConfig>(&contents) {
                Ok(config) => {
                    info!("[CONFIG] Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "[CONFIG] Failed to parse {:?}: {}. Using defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("[CONFIG] Failed to read {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
