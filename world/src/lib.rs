#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for the reflex game.
//!
//! The [`Session`] owns score, lives, round progress, both clocks and the
//! active screen. It is only ever mutated through [`apply`], which processes
//! one [`Command`] at a time and reports the consequences as [`Event`] values.
//! Round generation happens synchronously inside `apply` whenever the session
//! starts or advances a round.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reflex_core::{
    BackgroundColor, Command, EndReason, Event, MissCause, PageDirection, Round, Screen,
    SessionPhase, POINTS_PER_CORRECT, SESSION_SECONDS, STARTING_LIVES, TUTORIAL_PAGES,
};
use reflex_system_difficulty::churns_background;
use reflex_system_round_generation::RoundGenerator;
use reflex_system_timers::{DualClock, TickOutcome};
use tracing::{debug, error, info};

/// Represents the authoritative state of a single game session.
pub struct Session {
    phase: SessionPhase,
    screen: Screen,
    tutorial_page: u8,
    score: u32,
    lives: u8,
    rounds_completed: u32,
    clock: DualClock,
    round: Option<Round>,
    background: BackgroundColor,
    generator: RoundGenerator,
    rng: Box<dyn RngCore + Send>,
}

impl Session {
    /// Creates an idle session seeded from operating system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Creates an idle session whose rounds replay deterministically for `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates an idle session drawing randomness from the provided source.
    #[must_use]
    pub fn with_rng<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Self {
            phase: SessionPhase::Idle,
            screen: Screen::Menu,
            tutorial_page: 1,
            score: 0,
            lives: STARTING_LIVES,
            rounds_completed: 0,
            clock: DualClock::default(),
            round: None,
            background: BackgroundColor::DEFAULT,
            generator: RoundGenerator::default(),
            rng: Box::new(rng),
        }
    }

    /// Replaces the round generator used for subsequent rounds.
    #[must_use]
    pub fn with_generator(mut self, generator: RoundGenerator) -> Self {
        self.generator = generator;
        self
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        self.phase = SessionPhase::Running;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.rounds_completed = 0;
        self.clock = DualClock::new(SESSION_SECONDS, 0.0);
        self.round = None;

        info!("session started");
        out_events.push(Event::SessionStarted);
        self.show(Screen::Game, out_events);
        self.paint(BackgroundColor::DEFAULT, out_events);
        self.begin_round(out_events);
    }

    fn begin_round(&mut self, out_events: &mut Vec<Event>) {
        let generated = match self
            .generator
            .generate(self.rounds_completed, &mut *self.rng)
        {
            Ok(generated) => generated,
            Err(err) => {
                error!(
                    rounds_completed = self.rounds_completed,
                    "round generation failed: {err}"
                );
                self.end(EndReason::RoundGenerationFailed, out_events);
                return;
            }
        };

        let policy = generated.policy;
        self.clock.start_round(policy.duration);
        if policy.churn_background {
            self.churn_background(out_events);
        }

        debug!(
            round = self.rounds_completed,
            label = %generated.round.target(),
            duration = policy.duration,
            "round started"
        );
        self.round = Some(generated.round.clone());
        out_events.push(Event::RoundStarted {
            round_index: self.rounds_completed,
            round: generated.round,
            duration: policy.duration,
            strategy: policy.strategy,
        });
    }

    fn advance_round(&mut self, out_events: &mut Vec<Event>) {
        self.rounds_completed = self.rounds_completed.saturating_add(1);
        self.begin_round(out_events);
    }

    fn miss(&mut self, cause: MissCause, out_events: &mut Vec<Event>) {
        self.lives = self.lives.saturating_sub(1);
        out_events.push(Event::LifeLost {
            cause,
            lives: self.lives,
        });

        if self.lives == 0 {
            self.end(EndReason::LivesExhausted, out_events);
        } else {
            self.advance_round(out_events);
        }
    }

    fn select(&mut self, label: reflex_core::Label, out_events: &mut Vec<Event>) {
        let Some(round) = self.round.as_ref() else {
            return;
        };

        if round.is_target(label) {
            self.score = self.score.saturating_add(POINTS_PER_CORRECT);
            out_events.push(Event::AnswerAccepted {
                label,
                score: self.score,
            });
            self.advance_round(out_events);
        } else {
            self.miss(MissCause::IncorrectSelection, out_events);
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        let outcome = self.clock.advance();
        out_events.push(Event::ClocksAdvanced {
            session_seconds: self.clock.session().remaining(),
            round_seconds: self.clock.round().remaining(),
        });

        match outcome {
            TickOutcome::SessionExpired => {
                self.end(EndReason::SessionClockExpired, out_events);
                return;
            }
            TickOutcome::RoundTimedOut => self.miss(MissCause::RoundTimeout, out_events),
            TickOutcome::Continue => {}
        }

        if self.phase == SessionPhase::Running && churns_background(self.rounds_completed) {
            self.churn_background(out_events);
        }
    }

    fn end(&mut self, reason: EndReason, out_events: &mut Vec<Event>) {
        self.phase = SessionPhase::Ended;
        self.round = None;

        let elapsed_seconds = self.clock.session().elapsed();
        info!(
            ?reason,
            score = self.score,
            rounds_completed = self.rounds_completed,
            elapsed_seconds,
            "session ended"
        );
        out_events.push(Event::SessionEnded {
            reason,
            score: self.score,
            rounds_completed: self.rounds_completed,
            elapsed_seconds,
        });
        self.show(Screen::GameOver, out_events);
    }

    fn abandon(&mut self, out_events: &mut Vec<Event>) {
        info!(
            score = self.score,
            rounds_completed = self.rounds_completed,
            "session abandoned"
        );
        self.phase = SessionPhase::Idle;
        self.round = None;
        out_events.push(Event::SessionAbandoned);
    }

    fn navigate(&mut self, screen: Screen, out_events: &mut Vec<Event>) {
        if screen == Screen::Game {
            return;
        }

        if self.phase == SessionPhase::Running {
            self.abandon(out_events);
        }

        self.show(screen, out_events);
        if screen == Screen::HowToPlay {
            self.tutorial_page = 1;
            out_events.push(Event::TutorialPageChanged { page: 1 });
        }
    }

    fn flip_tutorial(&mut self, direction: PageDirection, out_events: &mut Vec<Event>) {
        if self.screen != Screen::HowToPlay {
            return;
        }

        match direction {
            PageDirection::Previous if self.tutorial_page > 1 => {
                self.tutorial_page -= 1;
            }
            PageDirection::Previous => return,
            PageDirection::Next if self.tutorial_page < TUTORIAL_PAGES => {
                self.tutorial_page += 1;
            }
            PageDirection::Next => {
                self.show(Screen::Menu, out_events);
                return;
            }
        }

        out_events.push(Event::TutorialPageChanged {
            page: self.tutorial_page,
        });
    }

    fn show(&mut self, screen: Screen, out_events: &mut Vec<Event>) {
        if self.screen != screen {
            self.screen = screen;
            out_events.push(Event::ScreenChanged { screen });
        }
    }

    fn churn_background(&mut self, out_events: &mut Vec<Event>) {
        let value = self.rng.gen_range(0..BackgroundColor::RANDOM_BOUND);
        self.paint(BackgroundColor::from_rgb(value), out_events);
    }

    fn paint(&mut self, color: BackgroundColor, out_events: &mut Vec<Event>) {
        if self.background != color {
            self.background = color;
            out_events.push(Event::BackgroundChanged { color });
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("screen", &self.screen)
            .field("score", &self.score)
            .field("lives", &self.lives)
            .field("rounds_completed", &self.rounds_completed)
            .field("clock", &self.clock)
            .field("round", &self.round)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the session, mutating state deterministically.
///
/// Gameplay commands (`SelectOption`, `Tick`) are ignored unless the session
/// is running, so a stale tick or late click can never touch an ended session.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => session.start(out_events),
        Command::SelectOption { label } => {
            if session.phase == SessionPhase::Running {
                session.select(label, out_events);
            }
        }
        Command::Tick => {
            if session.phase == SessionPhase::Running {
                session.tick(out_events);
            }
        }
        Command::Navigate { screen } => session.navigate(screen, out_events),
        Command::AdvanceTutorialPage { direction } => {
            session.flip_tutorial(direction, out_events)
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use reflex_core::{BackgroundColor, Round, Screen, SessionPhase};
    use reflex_system_difficulty::churns_background;

    use super::Session;

    /// Read-only copy of the values a renderer consumes.
    #[derive(Clone, Debug, PartialEq)]
    pub struct SessionSnapshot {
        /// Current lifecycle phase.
        pub phase: SessionPhase,
        /// Screen currently presented.
        pub screen: Screen,
        /// Points accumulated this session.
        pub score: u32,
        /// Lives left, from zero to three.
        pub lives: u8,
        /// Rounds resolved so far.
        pub rounds_completed: u32,
        /// Seconds left on the session clock.
        pub session_seconds_remaining: u32,
        /// Seconds elapsed on the session clock.
        pub session_seconds_elapsed: u32,
        /// Seconds left in the current round.
        pub round_seconds_remaining: f32,
        /// Seconds allotted to the current round.
        pub round_duration_total: f32,
        /// Fraction of the current round still available, in `0.0..=1.0`.
        pub round_progress: f32,
        /// Whether the background is being randomized every tick.
        pub background_churn: bool,
        /// Current background color.
        pub background: BackgroundColor,
        /// One-based tutorial page.
        pub tutorial_page: u8,
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(session: &Session) -> SessionPhase {
        session.phase
    }

    /// Reports whether a session is running.
    #[must_use]
    pub fn is_active(session: &Session) -> bool {
        session.phase == SessionPhase::Running
    }

    /// Screen currently presented.
    #[must_use]
    pub fn screen(session: &Session) -> Screen {
        session.screen
    }

    /// Points accumulated this session.
    #[must_use]
    pub fn score(session: &Session) -> u32 {
        session.score
    }

    /// Lives left.
    #[must_use]
    pub fn lives(session: &Session) -> u8 {
        session.lives
    }

    /// Rounds resolved so far.
    #[must_use]
    pub fn rounds_completed(session: &Session) -> u32 {
        session.rounds_completed
    }

    /// Round currently awaiting a selection, if any.
    #[must_use]
    pub fn current_round(session: &Session) -> Option<&Round> {
        session.round.as_ref()
    }

    /// Captures every renderer-facing field in one snapshot.
    #[must_use]
    pub fn snapshot(session: &Session) -> SessionSnapshot {
        SessionSnapshot {
            phase: session.phase,
            screen: session.screen,
            score: session.score,
            lives: session.lives,
            rounds_completed: session.rounds_completed,
            session_seconds_remaining: session.clock.session().remaining(),
            session_seconds_elapsed: session.clock.session().elapsed(),
            round_seconds_remaining: session.clock.round().remaining(),
            round_duration_total: session.clock.round().total(),
            round_progress: session.clock.round().progress(),
            background_churn: session.phase == SessionPhase::Running
                && churns_background(session.rounds_completed),
            background: session.background,
            tutorial_page: session.tutorial_page,
        }
    }
}
