#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Leaderboard reconciliation for finished sessions.
//!
//! When the session broadcasts [`Event::SessionEnded`], the [`Reconciler`]
//! compares the final score against the player's stored best and writes it
//! only when it improves on that best. Store and identity failures are logged
//! and swallowed here so they can never reach gameplay.

use reflex_core::{Event, LeaderboardEntry, PlayerName};
use thiserror::Error;
use tracing::{info, warn};

/// Failures reported by a leaderboard store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("leaderboard store unavailable: {0}")]
    Unavailable(String),
    /// Stored data could not be decoded.
    #[error("leaderboard data is corrupt: {0}")]
    Corrupt(String),
    /// Reading or writing the backing file failed.
    #[error("leaderboard I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered key-score store holding one best score per player.
pub trait LeaderboardStore {
    /// Returns the stored score for `player`, if any.
    fn get(&self, player: &PlayerName) -> Result<Option<u32>, StoreError>;

    /// Stores `score` for `player` unless a higher or equal score is already stored.
    fn set_if_higher(&mut self, player: &PlayerName, score: u32) -> Result<(), StoreError>;

    /// Returns up to `n` entries ordered by descending score.
    ///
    /// Ties are ordered by player name so repeated calls agree.
    fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// Failure to determine who is playing.
#[derive(Debug, Error)]
#[error("player identity unavailable: {0}")]
pub struct IdentityError(pub String);

/// Supplies the display name of the current player.
pub trait IdentityProvider {
    /// Returns the current player's name.
    fn current_player(&self) -> Result<PlayerName, IdentityError>;
}

/// Resolves the current player, falling back to the anonymous sentinel.
#[must_use]
pub fn resolve_player(provider: &dyn IdentityProvider) -> PlayerName {
    match provider.current_player() {
        Ok(player) => player,
        Err(err) => {
            warn!("{err}; playing as {}", PlayerName::anonymous());
            PlayerName::anonymous()
        }
    }
}

/// What a reconciliation did to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The final score became the player's stored best.
    Recorded {
        /// Player whose best was written.
        player: PlayerName,
        /// Newly stored score.
        score: u32,
        /// Best score stored before this session, if any.
        previous: Option<u32>,
    },
    /// The stored best was at least as high; nothing was written.
    Kept {
        /// Player whose best was kept.
        player: PlayerName,
        /// Stored best score.
        best: u32,
    },
}

/// Compares `final_score` with the stored best for `player` and persists it when higher.
///
/// Re-running with the same score after a successful write performs no
/// write, and a stored score is never lowered.
pub fn reconcile(
    store: &mut dyn LeaderboardStore,
    player: &PlayerName,
    final_score: u32,
) -> Result<ReconcileOutcome, StoreError> {
    let previous = store.get(player)?;
    match previous {
        Some(best) if final_score <= best => Ok(ReconcileOutcome::Kept {
            player: player.clone(),
            best,
        }),
        _ => {
            store.set_if_higher(player, final_score)?;
            Ok(ReconcileOutcome::Recorded {
                player: player.clone(),
                score: final_score,
                previous,
            })
        }
    }
}

/// Event-driven system that reconciles the leaderboard once per finished session.
#[derive(Debug)]
pub struct Reconciler {
    player: PlayerName,
    last_outcome: Option<ReconcileOutcome>,
}

impl Reconciler {
    /// Creates a reconciler recording scores for `player`.
    #[must_use]
    pub fn new(player: PlayerName) -> Self {
        Self {
            player,
            last_outcome: None,
        }
    }

    /// Player whose scores are reconciled.
    #[must_use]
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    /// Most recent successful reconciliation, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&ReconcileOutcome> {
        self.last_outcome.as_ref()
    }

    /// Consumes session events and reconciles every `SessionEnded` against the store.
    ///
    /// Store failures are logged and skipped; the session has already ended
    /// and keeps its in-memory results regardless.
    pub fn handle(
        &mut self,
        events: &[Event],
        store: &mut dyn LeaderboardStore,
        out: &mut Vec<ReconcileOutcome>,
    ) {
        for event in events {
            let Event::SessionEnded { score, .. } = event else {
                continue;
            };

            match reconcile(store, &self.player, *score) {
                Ok(outcome) => {
                    match &outcome {
                        ReconcileOutcome::Recorded {
                            player,
                            score,
                            previous,
                        } => info!(%player, score, ?previous, "new best score recorded"),
                        ReconcileOutcome::Kept { player, best } => {
                            info!(%player, best, "stored best score kept")
                        }
                    }
                    self.last_outcome = Some(outcome.clone());
                    out.push(outcome);
                }
                Err(err) => {
                    warn!(player = %self.player, score, "leaderboard reconciliation failed: {err}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIdentity(Result<&'static str, &'static str>);

    impl IdentityProvider for FixedIdentity {
        fn current_player(&self) -> Result<PlayerName, IdentityError> {
            self.0
                .map(PlayerName::new)
                .map_err(|reason| IdentityError(reason.to_owned()))
        }
    }

    #[test]
    fn resolve_player_uses_provided_identity() {
        let provider = FixedIdentity(Ok("ada"));
        assert_eq!(resolve_player(&provider).as_str(), "ada");
    }

    #[test]
    fn resolve_player_falls_back_to_anonymous() {
        let provider = FixedIdentity(Err("offline"));
        assert_eq!(resolve_player(&provider), PlayerName::anonymous());
    }
}
