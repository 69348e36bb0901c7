#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round generation system that picks a target label and its decoys.
//!
//! Every round draws its target independently from the full palettes. Decoys
//! are chosen according to the [`DecoyStrategy`] selected by the difficulty
//! policy, after which the four labels are shuffled into presentation order.
//! Colors and shapes are drawn from per-round pools that shrink as they are
//! consumed, so labels within a round never repeat.

use rand::{seq::SliceRandom, Rng};
use reflex_core::{Color, DecoyStrategy, Label, Round, Shape, OPTIONS_PER_ROUND};
use reflex_system_difficulty::{policy, RoundPolicy};
use thiserror::Error;

/// Default number of candidate draws allowed before generation gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Failures raised while assembling a round.
///
/// None of these are reachable with the fixed six-color, five-shape palettes;
/// they exist so an invariant violation ends the round instead of looping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Rejection sampling exceeded the configured attempt cap.
    #[error("unable to collect distinct labels after {attempts} draws")]
    AttemptsExhausted {
        /// Number of draws performed before giving up.
        attempts: u32,
    },
    /// A strategy required an unused color or shape but the pool was empty.
    #[error("the per-round {palette} pool ran out of unused values")]
    PaletteExhausted {
        /// Name of the exhausted palette.
        palette: &'static str,
    },
    /// The assembled options violated the round invariants.
    #[error("assembled options do not form a valid round")]
    MalformedRound,
}

/// A round paired with the policy that shaped it.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedRound {
    /// Target and options presented to the player.
    pub round: Round,
    /// Difficulty parameters evaluated for this round.
    pub policy: RoundPolicy,
}

/// Pure system that produces rounds from a caller-provided random source.
#[derive(Clone, Copy, Debug)]
pub struct RoundGenerator {
    max_attempts: u32,
}

impl Default for RoundGenerator {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RoundGenerator {
    /// Creates a generator that caps rejection sampling at `max_attempts` draws.
    #[must_use]
    pub const fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Generates the round that starts after `rounds_completed` rounds.
    ///
    /// The difficulty policy is evaluated exactly once and returned alongside
    /// the round so callers never re-derive it mid-round.
    pub fn generate<R>(
        &self,
        rounds_completed: u32,
        rng: &mut R,
    ) -> Result<GeneratedRound, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let policy = policy(rounds_completed);
        let mut pools = Pools::full();

        let target_shape = pools.take_shape(rng)?;
        let target_color = pools.take_color(rng)?;
        let target = Label::new(target_color, target_shape);

        let mut chosen = Vec::with_capacity(OPTIONS_PER_ROUND);
        chosen.push(target);

        match policy.strategy {
            DecoyStrategy::SameShapeFamily => {
                same_shape_family_decoys(target_shape, &mut pools, &mut chosen, rng)?
            }
            DecoyStrategy::Random => self.random_decoys(&mut pools, &mut chosen, rng)?,
        }

        chosen.shuffle(rng);
        let options: [Label; OPTIONS_PER_ROUND] = chosen
            .try_into()
            .map_err(|_| GenerationError::MalformedRound)?;
        let round = Round::try_new(target, options).ok_or(GenerationError::MalformedRound)?;

        Ok(GeneratedRound { round, policy })
    }

    fn random_decoys<R>(
        &self,
        pools: &mut Pools,
        chosen: &mut Vec<Label>,
        rng: &mut R,
    ) -> Result<(), GenerationError>
    where
        R: Rng + ?Sized,
    {
        let mut attempts = 0;
        while chosen.len() < OPTIONS_PER_ROUND {
            if attempts >= self.max_attempts {
                return Err(GenerationError::AttemptsExhausted { attempts });
            }
            attempts += 1;

            let shape = pools
                .take_shape(rng)
                .unwrap_or_else(|_| Shape::ALL[rng.gen_range(0..Shape::ALL.len())]);
            let color = pools
                .take_color(rng)
                .unwrap_or_else(|_| Color::ALL[rng.gen_range(0..Color::ALL.len())]);
            let candidate = Label::new(color, shape);

            if !chosen.contains(&candidate) {
                chosen.push(candidate);
            }
        }
        Ok(())
    }
}

fn same_shape_family_decoys<R>(
    target_shape: Shape,
    pools: &mut Pools,
    chosen: &mut Vec<Label>,
    rng: &mut R,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
{
    let sibling_color = pools.take_color(rng)?;
    chosen.push(Label::new(sibling_color, target_shape));

    while chosen.len() < OPTIONS_PER_ROUND {
        let shape = pools.take_shape(rng)?;
        let color = pools.take_color(rng)?;
        chosen.push(Label::new(color, shape));
    }
    Ok(())
}

/// Colors and shapes not yet used by the round under construction.
#[derive(Debug)]
struct Pools {
    colors: Vec<Color>,
    shapes: Vec<Shape>,
}

impl Pools {
    fn full() -> Self {
        Self {
            colors: Color::ALL.to_vec(),
            shapes: Shape::ALL.to_vec(),
        }
    }

    fn take_color<R>(&mut self, rng: &mut R) -> Result<Color, GenerationError>
    where
        R: Rng + ?Sized,
    {
        take_random(&mut self.colors, rng).ok_or(GenerationError::PaletteExhausted {
            palette: "color",
        })
    }

    fn take_shape<R>(&mut self, rng: &mut R) -> Result<Shape, GenerationError>
    where
        R: Rng + ?Sized,
    {
        take_random(&mut self.shapes, rng).ok_or(GenerationError::PaletteExhausted {
            palette: "shape",
        })
    }
}

fn take_random<T, R>(pool: &mut Vec<T>, rng: &mut R) -> Option<T>
where
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    Some(pool.remove(index))
}
