#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure difficulty policy that escalates rounds as the session progresses.
//!
//! Every function in this crate is a deterministic function of the number of
//! rounds completed so far. The session consults [`policy`] exactly once when a
//! round starts and never re-evaluates it mid-round.

use reflex_core::DecoyStrategy;

/// Rounds completed before decoys switch to [`DecoyStrategy::SameShapeFamily`].
pub const SAME_SHAPE_FAMILY_THRESHOLD: u32 = 18;

/// Rounds completed before the background starts churning.
pub const BACKGROUND_CHURN_THRESHOLD: u32 = 35;

/// Round duration schedule as `(exclusive upper bound, seconds)` pairs.
const DURATION_SCHEDULE: [(u32, f32); 5] = [(10, 3.0), (25, 2.0), (40, 1.5), (50, 1.0), (60, 2.0)];

/// Duration applied once every scheduled bracket has been passed.
const FINAL_DURATION: f32 = 1.5;

/// Parameters applied to a single round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundPolicy {
    /// Seconds allotted to the round.
    pub duration: f32,
    /// Strategy used to choose the round's decoys.
    pub strategy: DecoyStrategy,
    /// Whether the background color is randomized while the round runs.
    pub churn_background: bool,
}

/// Derives the round parameters for the provided number of completed rounds.
#[must_use]
pub fn policy(rounds_completed: u32) -> RoundPolicy {
    RoundPolicy {
        duration: round_duration(rounds_completed),
        strategy: decoy_strategy(rounds_completed),
        churn_background: churns_background(rounds_completed),
    }
}

/// Seconds allotted to the round that starts after `rounds_completed` rounds.
#[must_use]
pub fn round_duration(rounds_completed: u32) -> f32 {
    DURATION_SCHEDULE
        .iter()
        .find(|(upper, _)| rounds_completed < *upper)
        .map_or(FINAL_DURATION, |(_, seconds)| *seconds)
}

/// Decoy strategy for the round that starts after `rounds_completed` rounds.
#[must_use]
pub const fn decoy_strategy(rounds_completed: u32) -> DecoyStrategy {
    if rounds_completed < SAME_SHAPE_FAMILY_THRESHOLD {
        DecoyStrategy::Random
    } else {
        DecoyStrategy::SameShapeFamily
    }
}

/// Reports whether the background churns once `rounds_completed` rounds are done.
#[must_use]
pub const fn churns_background(rounds_completed: u32) -> bool {
    rounds_completed >= BACKGROUND_CHURN_THRESHOLD
}

/// Difficulty badge shown on the game screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyBadge {
    /// Opening rounds.
    Easy,
    /// Shown from round 21.
    Medium,
    /// Shown from round 36.
    Hard,
    /// Shown from round 51.
    Extreme,
}

impl DifficultyBadge {
    /// Selects the badge for the provided number of completed rounds.
    #[must_use]
    pub const fn for_rounds(rounds_completed: u32) -> Self {
        if rounds_completed >= 51 {
            Self::Extreme
        } else if rounds_completed >= 36 {
            Self::Hard
        } else if rounds_completed >= 21 {
            Self::Medium
        } else {
            Self::Easy
        }
    }

    /// Image asset representing the badge.
    #[must_use]
    pub const fn image_reference(self) -> &'static str {
        match self {
            Self::Easy => "E.png",
            Self::Medium => "M.png",
            Self::Hard => "H.png",
            Self::Extreme => "X.png",
        }
    }
}

/// Level awarded on the game-over screen, from 1 to 8.
#[must_use]
pub const fn level_achieved(rounds_completed: u32) -> u8 {
    match rounds_completed {
        85.. => 8,
        75..=84 => 7,
        65..=74 => 6,
        50..=64 => 5,
        40..=49 => 4,
        30..=39 => 3,
        20..=29 => 2,
        _ => 1,
    }
}
