#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Leaderboard store implementations for the reflex game.
//!
//! [`InMemoryLeaderboard`] keeps scores for the lifetime of the process.
//! [`JsonFileLeaderboard`] persists them to a JSON document that is rewritten
//! through a temporary file so a crash mid-write never truncates the board.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use reflex_core::{LeaderboardEntry, PlayerName};
use reflex_system_reconciler::{LeaderboardStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

const FILE_FORMAT_VERSION: u32 = 1;

/// Process-local leaderboard.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLeaderboard {
    scores: BTreeMap<PlayerName, u32>,
}

impl InMemoryLeaderboard {
    /// Creates an empty leaderboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players with a stored score.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Reports whether no scores are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl LeaderboardStore for InMemoryLeaderboard {
    fn get(&self, player: &PlayerName) -> Result<Option<u32>, StoreError> {
        Ok(self.scores.get(player).copied())
    }

    fn set_if_higher(&mut self, player: &PlayerName, score: u32) -> Result<(), StoreError> {
        let _ = raise(&mut self.scores, player, score);
        Ok(())
    }

    fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(rank(self.scores.iter(), n))
    }
}

/// Leaderboard persisted as a JSON document on disk.
#[derive(Debug)]
pub struct JsonFileLeaderboard {
    path: PathBuf,
    scores: BTreeMap<PlayerName, u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LeaderboardFile {
    version: u32,
    scores: BTreeMap<PlayerName, u32>,
}

impl JsonFileLeaderboard {
    /// Opens the leaderboard stored at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let scores = match fs::read(&path) {
            Ok(bytes) => decode(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "leaderboard file missing; starting empty");
                BTreeMap::new()
            }
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(Self { path, scores })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let document = LeaderboardFile {
            version: FILE_FORMAT_VERSION,
            scores: self.scores.clone(),
        };
        let json = serde_json::to_vec_pretty(&document)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Io(err));
        }
        Ok(())
    }
}

impl LeaderboardStore for JsonFileLeaderboard {
    fn get(&self, player: &PlayerName) -> Result<Option<u32>, StoreError> {
        Ok(self.scores.get(player).copied())
    }

    fn set_if_higher(&mut self, player: &PlayerName, score: u32) -> Result<(), StoreError> {
        let previous = self.scores.get(player).copied();
        if !raise(&mut self.scores, player, score) {
            return Ok(());
        }

        if let Err(err) = self.persist() {
            match previous {
                Some(best) => {
                    let _ = self.scores.insert(player.clone(), best);
                }
                None => {
                    let _ = self.scores.remove(player);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(rank(self.scores.iter(), n))
    }
}

fn decode(bytes: &[u8]) -> Result<BTreeMap<PlayerName, u32>, StoreError> {
    let document: LeaderboardFile =
        serde_json::from_slice(bytes).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    if document.version != FILE_FORMAT_VERSION {
        return Err(StoreError::Corrupt(format!(
            "unsupported leaderboard version {}; expected {FILE_FORMAT_VERSION}",
            document.version
        )));
    }
    Ok(document.scores)
}

/// Stores `score` when it beats the current best. Returns whether anything changed.
fn raise(scores: &mut BTreeMap<PlayerName, u32>, player: &PlayerName, score: u32) -> bool {
    match scores.get(player) {
        Some(&best) if best >= score => false,
        _ => {
            let _ = scores.insert(player.clone(), score);
            true
        }
    }
}

fn rank<'a, I>(scores: I, n: usize) -> Vec<LeaderboardEntry>
where
    I: Iterator<Item = (&'a PlayerName, &'a u32)>,
{
    let mut entries: Vec<LeaderboardEntry> = scores
        .map(|(player, score)| LeaderboardEntry::new(player.clone(), *score))
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.player.cmp(&b.player)));
    entries.truncate(n);
    entries
}
