//! Recorded-opening catalog
//!
//! Keeps opening metadata (name, intended colour, PGN text), the known users
//! and which openings each user has learned. Every opening accepted here is
//! also inserted into the [`OpeningTrieIndex`] handed in by the caller.
//!
//! Everything is held in memory; durable storage belongs to the embedding
//! application.

use crate::core::{TrainerError, TrainerResult};
use crate::notation::{self, recorded_color};
use crate::opening::{OpeningId, OpeningTrieIndex};
use shakmaty::Color;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub type UserId = u64;

/// User seeded into every new catalog
pub const DEFAULT_USER_ID: UserId = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOpening {
    pub id: OpeningId,
    pub name: String,
    pub color: Color,
    pub pgn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Added(OpeningId),
    /// An opening with this name is already indexed; nothing changed
    AlreadyExists(OpeningId),
}

impl UploadOutcome {
    pub fn opening_id(self) -> OpeningId {
        match self {
            UploadOutcome::Added(id) | UploadOutcome::AlreadyExists(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnToggle {
    Learned,
    Unlearned,
}

#[derive(Debug, Clone)]
pub struct OpeningCatalog {
    openings: BTreeMap<OpeningId, RecordedOpening>,
    users: BTreeMap<UserId, User>,
    learned: BTreeMap<UserId, BTreeSet<OpeningId>>,
    next_opening_id: OpeningId,
}

impl Default for OpeningCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningCatalog {
    /// Empty catalog with the default user already registered
    pub fn new() -> Self {
        let mut catalog = Self {
            openings: BTreeMap::new(),
            users: BTreeMap::new(),
            learned: BTreeMap::new(),
            next_opening_id: 1,
        };
        catalog.users.insert(
            DEFAULT_USER_ID,
            User {
                id: DEFAULT_USER_ID,
                name: "Player 1".to_string(),
            },
        );
        catalog
    }

    pub fn add_user(&mut self, name: impl Into<String>) -> UserId {
        let id = self.users.keys().next_back().map_or(1, |last| last + 1);
        self.users.insert(
            id,
            User {
                id,
                name: name.into(),
            },
        );
        id
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn openings(&self) -> impl Iterator<Item = &RecordedOpening> {
        self.openings.values()
    }

    pub fn opening(&self, id: OpeningId) -> Option<&RecordedOpening> {
        self.openings.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RecordedOpening> {
        self.openings.values().find(|op| op.name == name)
    }

    /// Register a recorded opening and insert it into `index`
    ///
    /// The PGN is parsed before anything is touched, so a malformed upload
    /// leaves both the catalog and the index as they were.
    pub fn add_opening(
        &mut self,
        index: &mut OpeningTrieIndex,
        name: &str,
        pgn: &str,
    ) -> TrainerResult<UploadOutcome> {
        if let Some(existing) = self.find_by_name(name) {
            info!("[CATALOG] Opening '{}' already present as {}", name, existing.id);
            return Ok(UploadOutcome::AlreadyExists(existing.id));
        }

        let plies = notation::parse_sequence(pgn)?;
        let id = self.next_opening_id;
        self.next_opening_id += 1;

        let color = recorded_color(pgn);
        index.insert(id, &plies);
        self.openings.insert(
            id,
            RecordedOpening {
                id,
                name: name.to_string(),
                color,
                pgn: pgn.to_string(),
            },
        );

        info!(
            "[CATALOG] Added opening {} '{}' for {} ({} plies)",
            id,
            name,
            notation::color_name(color),
            plies.len()
        );
        Ok(UploadOutcome::Added(id))
    }

    /// Load every `*.pgn` file in `dir`, in file-name order
    ///
    /// Unreadable or malformed files are logged and skipped. A missing
    /// directory loads nothing. Returns the number of openings added.
    pub fn load_dir(&mut self, index: &mut OpeningTrieIndex, dir: &Path) -> TrainerResult<usize> {
        if !dir.is_dir() {
            warn!("[CATALOG] Openings directory {:?} not found", dir);
            return Ok(0);
        }

        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pgn"))
            })
            .collect();
        files.sort();

        let mut added = 0usize;
        for path in files {
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("[CATALOG] Skipping {:?}: {}", path, e);
                    continue;
                }
            };
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = opening_name_from_stem(&stem);

            match self.add_opening(index, &name, &contents) {
                Ok(UploadOutcome::Added(_)) => added += 1,
                Ok(UploadOutcome::AlreadyExists(_)) => {}
                Err(e) => warn!("[CATALOG] Skipping {:?}: {}", path, e),
            }
        }

        info!("[CATALOG] Loaded {} openings from {:?}", added, dir);
        Ok(added)
    }

    /// Flip whether `user` has learned `opening`
    pub fn toggle_learned(&mut self, user: UserId, opening: OpeningId) -> TrainerResult<LearnToggle> {
        if !self.users.contains_key(&user) {
            return Err(TrainerError::UnknownUser { id: user });
        }
        if !self.openings.contains_key(&opening) {
            return Err(TrainerError::UnknownOpening { id: opening });
        }

        let set = self.learned.entry(user).or_default();
        if set.remove(&opening) {
            Ok(LearnToggle::Unlearned)
        } else {
            set.insert(opening);
            Ok(LearnToggle::Learned)
        }
    }

    pub fn is_learned(&self, user: UserId, opening: OpeningId) -> bool {
        self.learned
            .get(&user)
            .is_some_and(|set| set.contains(&opening))
    }

    /// Learned openings of `user` recorded for `color`
    ///
    /// This is the fixed set a new training session for that colour works with.
    pub fn learned_for_color(&self, user: UserId, color: Color) -> TrainerResult<BTreeSet<OpeningId>> {
        if !self.users.contains_key(&user) {
            return Err(TrainerError::UnknownUser { id: user });
        }

        Ok(self
            .learned
            .get(&user)
            .map(|set| {
                set.iter()
                    .copied()
                    .filter(|id| self.openings.get(id).is_some_and(|op| op.color == color))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// "italian_game" -> "Italian Game"
pub fn opening_name_from_stem(stem: &str) -> String {
    stem.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
