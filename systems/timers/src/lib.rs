#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dual timer coordination for the reflex game.
//!
//! The session clock and the round clock count down on the same one-second
//! cadence. [`DualClock`] advances both in a single step so that expiry is
//! resolved with a fixed precedence, and [`TickScheduler`] converts elapsed
//! wall-clock time into [`Command::Tick`] values while a session is running.

use std::time::Duration;

use reflex_core::{Command, SessionPhase, SESSION_SECONDS};

/// Wall-clock time between two consecutive ticks.
pub const TICK_CADENCE: Duration = Duration::from_secs(1);

/// Seconds removed from each clock per tick.
const SECONDS_PER_TICK: f32 = 1.0;

/// Whether a clock still has time left after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockStatus {
    /// Time remains on the clock.
    Running,
    /// The clock has run out.
    Expired,
}

/// Whole-second countdown for the entire session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionClock {
    total: u32,
    remaining: u32,
}

impl SessionClock {
    /// Creates a clock that starts with `seconds` remaining.
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        Self {
            total: seconds,
            remaining: seconds,
        }
    }

    /// Seconds left on the clock.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds consumed since the clock started.
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        self.total.saturating_sub(self.remaining)
    }

    /// Removes one second and reports whether the clock has now run out.
    ///
    /// Expiry is reported on the tick that brings the clock to zero.
    pub fn tick(&mut self) -> ClockStatus {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            ClockStatus::Expired
        } else {
            ClockStatus::Running
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(SESSION_SECONDS)
    }
}

/// Fractional countdown for the current round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundClock {
    total: f32,
    remaining: f32,
}

impl RoundClock {
    /// Creates a clock for a round lasting `duration` seconds.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            total: duration,
            remaining: duration,
        }
    }

    /// Seconds originally allotted to the round.
    #[must_use]
    pub const fn total(&self) -> f32 {
        self.total
    }

    /// Seconds left in the round, never negative.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Fraction of the round still available, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.total).clamp(0.0, 1.0)
    }

    /// Reports whether the clock reads zero when rounded to a tenth of a second.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        (self.remaining * 10.0).round() <= 0.0
    }

    /// Removes one second, clamped at zero, and reports whether the round ran out.
    pub fn tick(&mut self) -> ClockStatus {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - SECONDS_PER_TICK).max(0.0);
        }
        if self.is_expired() {
            ClockStatus::Expired
        } else {
            ClockStatus::Running
        }
    }
}

/// Result of advancing both clocks by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Both clocks still have time left.
    Continue,
    /// The round clock ran out while session time remains.
    RoundTimedOut,
    /// The session clock ran out; takes precedence over a round timeout.
    SessionExpired,
}

/// Session and round clocks advanced together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualClock {
    session: SessionClock,
    round: RoundClock,
}

impl DualClock {
    /// Creates a fresh pair of clocks for a session whose first round lasts `round_duration`.
    #[must_use]
    pub fn new(session_seconds: u32, round_duration: f32) -> Self {
        Self {
            session: SessionClock::new(session_seconds),
            round: RoundClock::new(round_duration),
        }
    }

    /// Session clock snapshot.
    #[must_use]
    pub const fn session(&self) -> &SessionClock {
        &self.session
    }

    /// Round clock snapshot.
    #[must_use]
    pub const fn round(&self) -> &RoundClock {
        &self.round
    }

    /// Resets the round clock for a new round of `duration` seconds.
    pub fn start_round(&mut self, duration: f32) {
        self.round = RoundClock::new(duration);
    }

    /// Advances both clocks by one tick.
    ///
    /// Both clocks always advance; when they run out on the same tick the
    /// session expiry wins and no round timeout is reported.
    pub fn advance(&mut self) -> TickOutcome {
        let session = self.session.tick();
        let round = self.round.tick();

        match (session, round) {
            (ClockStatus::Expired, _) => TickOutcome::SessionExpired,
            (ClockStatus::Running, ClockStatus::Expired) => TickOutcome::RoundTimedOut,
            (ClockStatus::Running, ClockStatus::Running) => TickOutcome::Continue,
        }
    }
}

impl Default for DualClock {
    fn default() -> Self {
        Self::new(SESSION_SECONDS, 0.0)
    }
}

/// Converts elapsed wall-clock time into tick commands while a session runs.
#[derive(Clone, Copy, Debug)]
pub struct TickScheduler {
    cadence: Duration,
    accumulator: Duration,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(TICK_CADENCE)
    }
}

impl TickScheduler {
    /// Creates a scheduler emitting one tick per `cadence` of elapsed time.
    #[must_use]
    pub const fn new(cadence: Duration) -> Self {
        Self {
            cadence,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes elapsed time and emits any tick commands that became due.
    ///
    /// Outside the running phase the accumulated time is discarded, so a
    /// stopped session never receives a tick accumulated before it stopped.
    pub fn handle(&mut self, elapsed: Duration, phase: SessionPhase, out: &mut Vec<Command>) {
        if phase != SessionPhase::Running {
            self.stop();
            return;
        }

        if self.cadence.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        while self.accumulator >= self.cadence {
            self.accumulator -= self.cadence;
            out.push(Command::Tick);
        }
    }

    /// Discards any partially accumulated tick.
    pub fn stop(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Wall-clock time remaining until the next tick becomes due.
    #[must_use]
    pub fn until_next_tick(&self) -> Duration {
        self.cadence.saturating_sub(self.accumulator)
    }
}
