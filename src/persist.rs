//! Roster persistence.
//!
//! Players are kept in an explicit in-memory [`Roster`] handed to whatever
//! drives sessions, and written to disk wholesale as JSON: load everything
//! at startup, save everything at shutdown. There is no partial write and no
//! migration — a save from another format version is rejected.

use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current roster file version.
const ROSTER_VERSION: u32 = 1;

/// The in-memory player registry: one character per player name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    players: HashMap<String, Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character under its own name, returning any displaced one.
    pub fn register(&mut self, character: Character) -> Option<Character> {
        self.players.insert(character.name.clone(), character)
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.players.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.players.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Character> {
        self.players.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    /// Player names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.players.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Quick-access facts about a roster file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterMetadata {
    pub player_count: usize,
    /// Player names, sorted.
    pub names: Vec<String>,
    #[serde(default)]
    pub saved_at: String,
}

/// A roster as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRoster {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created (seconds since the epoch).
    pub saved_at: String,

    /// Every player, keyed by name.
    pub players: HashMap<String, Character>,

    /// Metadata about the save.
    pub metadata: RosterMetadata,
}

impl SavedRoster {
    /// Wrap a roster for saving.
    pub fn new(roster: Roster) -> Self {
        let saved_at = chrono_now();
        let metadata = RosterMetadata {
            player_count: roster.len(),
            names: roster.names(),
            saved_at: saved_at.clone(),
        };
        Self {
            version: ROSTER_VERSION,
            saved_at,
            players: roster.players,
            metadata,
        }
    }

    /// Unwrap back into the in-memory registry.
    pub fn into_roster(self) -> Roster {
        Roster {
            players: self.players,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await?;
        info!(players = self.metadata.player_count, "roster saved");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(&path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != ROSTER_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: ROSTER_VERSION,
                found: saved.version,
            });
        }

        info!(players = saved.metadata.player_count, "roster loaded");
        Ok(saved)
    }

    /// Load a roster file, or start an empty one when the file does not
    /// exist yet (the first run of a fresh install).
    pub async fn load_or_new(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        match Self::load_json(path).await {
            Ok(saved) => Ok(saved),
            Err(PersistError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("no roster file found; starting a new one");
                Ok(Self::new(Roster::new()))
            }
            Err(err) => Err(err),
        }
    }

    /// Read a file's metadata without deserializing every character.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<RosterMetadata, PersistError> {
        let content = fs::read_to_string(&path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: RosterMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != ROSTER_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: ROSTER_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Build a save path for a named roster, with non-alphanumerics flattened
/// to underscores.
pub fn roster_save_path(base_dir: impl AsRef<Path>, name: &str) -> std::path::PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    base_dir.as_ref().join(format!("{sanitized}.json"))
}

/// Get current timestamp as seconds since the epoch.
fn chrono_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}
