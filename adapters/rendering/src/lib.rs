#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for reflex adapters.
//!
//! Adapters never read the session directly. They receive a [`Scene`] built
//! from a [`SessionSnapshot`] and answer with [`Intent`] values, which convert
//! into the session's [`Command`] surface.

use anyhow::Result as AnyResult;
use reflex_core::{
    BackgroundColor, Command, Label, LeaderboardEntry, PageDirection, PlayerName, Round, Screen,
    TUTORIAL_PAGES,
};
use reflex_system_difficulty::level_achieved;
pub use reflex_system_difficulty::DifficultyBadge;
use reflex_world::query::SessionSnapshot;

/// Rows shown on the leaderboard screen.
pub const LEADERBOARD_ROWS: usize = 7;

/// Message shown when nobody has a stored score.
pub const EMPTY_LEADERBOARD_MESSAGE: &str = "No scores yet. Be the first!";

/// Session clock readings below this many seconds are drawn as a warning.
pub const SESSION_WARNING_SECONDS: u32 = 10;

/// Round clock readings below this many seconds are drawn as a warning.
pub const ROUND_WARNING_SECONDS: f32 = 2.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Foreground used for regular text.
    pub const TEXT: Self = Self::from_rgb_u8(0xf5, 0xf5, 0xf5);
    /// Foreground used when a clock is about to run out.
    pub const WARNING: Self = Self::from_rgb_u8(0xff, 0x45, 0x3a);
    /// Base fill for leaderboard rows.
    pub const ROW: Self = Self::from_rgb_u8(0x3a, 0x1f, 0x6b);

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts a session background into a presentable color.
    #[must_use]
    pub const fn from_background(background: BackgroundColor) -> Self {
        let rgb = background.rgb();
        Self::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// User intent reported by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Start, or restart, a session.
    StartGame,
    /// Pick one of the displayed options.
    SelectOption(Label),
    /// Move to another screen.
    Navigate(Screen),
    /// Flip the how-to-play page.
    AdvanceTutorialPage(PageDirection),
}

impl From<Intent> for Command {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::StartGame => Command::StartGame,
            Intent::SelectOption(label) => Command::SelectOption { label },
            Intent::Navigate(screen) => Command::Navigate { screen },
            Intent::AdvanceTutorialPage(direction) => Command::AdvanceTutorialPage { direction },
        }
    }
}

/// Clock readout drawn on the game screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockPresentation {
    /// Remaining time formatted as `m:ss`.
    pub text: String,
    /// Whether the readout uses the warning color.
    pub warning: bool,
}

impl ClockPresentation {
    /// Foreground color for the readout.
    #[must_use]
    pub fn color(&self) -> Color {
        if self.warning {
            Color::WARNING
        } else {
            Color::TEXT
        }
    }
}

/// Per-round countdown bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundTimerPresentation {
    /// Seconds left in the round.
    pub remaining: f32,
    /// Fraction of the round left, within `0.0..=1.0`.
    pub progress: f32,
    /// Whether the bar uses the warning color.
    pub warning: bool,
}

/// One selectable image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionPresentation {
    /// Label the option stands for.
    pub label: Label,
    /// Caption in `"<Color> <Shape>"` form.
    pub caption: String,
    /// Image asset reference.
    pub image: String,
}

impl OptionPresentation {
    /// Describes `label` as a selectable option.
    #[must_use]
    pub fn new(label: Label) -> Self {
        Self {
            label,
            caption: label.to_string(),
            image: label.image_reference(),
        }
    }
}

/// Banner and options for the round in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundPresentation {
    /// Uppercased target label shown above the options.
    pub banner: String,
    /// Options in display order.
    pub options: Vec<OptionPresentation>,
}

impl RoundPresentation {
    /// Describes `round` for display.
    #[must_use]
    pub fn new(round: &Round) -> Self {
        Self {
            banner: round.target().to_string().to_uppercase(),
            options: round
                .options()
                .iter()
                .copied()
                .map(OptionPresentation::new)
                .collect(),
        }
    }
}

/// Everything drawn on the game screen.
#[derive(Clone, Debug, PartialEq)]
pub struct GamePresentation {
    /// Round in progress, absent only if generation failed.
    pub round: Option<RoundPresentation>,
    /// Points accumulated this session.
    pub score: u32,
    /// Lives left.
    pub lives: u8,
    /// Session clock readout.
    pub session_clock: ClockPresentation,
    /// Round countdown bar.
    pub round_timer: RoundTimerPresentation,
    /// Difficulty indicator for the rounds completed so far.
    pub badge: DifficultyBadge,
}

/// Summary drawn once a session has ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOverPresentation {
    /// Final score.
    pub score: u32,
    /// Rounds resolved during the session.
    pub rounds_completed: u32,
    /// Level reached, from 1 to 8.
    pub level: u8,
    /// Image asset for the level reached.
    pub level_image: String,
    /// Seconds the session lasted.
    pub time_taken_seconds: u32,
}

/// One leaderboard line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// One-based position.
    pub rank: usize,
    /// Player name.
    pub player: PlayerName,
    /// Stored best score.
    pub score: u32,
    /// Whether the row belongs to the current player.
    pub highlighted: bool,
}

impl LeaderboardRow {
    /// Fill color for the row.
    #[must_use]
    pub fn fill(&self) -> Color {
        if self.highlighted {
            Color::ROW.lighten(0.35)
        } else {
            Color::ROW
        }
    }
}

/// Leaderboard screen contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardPresentation {
    /// Rows in descending score order.
    pub rows: Vec<LeaderboardRow>,
    /// Message shown instead of rows when the board is empty.
    pub empty_message: Option<&'static str>,
}

impl LeaderboardPresentation {
    /// Builds the visible rows, highlighting `player`.
    #[must_use]
    pub fn new(entries: &[LeaderboardEntry], player: &PlayerName) -> Self {
        let rows: Vec<LeaderboardRow> = entries
            .iter()
            .take(LEADERBOARD_ROWS)
            .enumerate()
            .map(|(index, entry)| LeaderboardRow {
                rank: index + 1,
                player: entry.player.clone(),
                score: entry.score,
                highlighted: &entry.player == player,
            })
            .collect();
        let empty_message = rows.is_empty().then_some(EMPTY_LEADERBOARD_MESSAGE);
        Self {
            rows,
            empty_message,
        }
    }
}

/// How-to-play page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TutorialPresentation {
    /// One-based page number.
    pub page: u8,
    /// Total number of pages.
    pub pages: u8,
    /// Image asset for the page.
    pub image: String,
}

/// Screen-specific scene contents.
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    /// Main menu greeting the current player.
    Menu {
        /// Player the menu greets.
        player: PlayerName,
    },
    /// Active game.
    Game(GamePresentation),
    /// Results of the last session.
    GameOver(GameOverPresentation),
    /// Top scores.
    Leaderboard(LeaderboardPresentation),
    /// Tutorial page.
    HowToPlay(TutorialPresentation),
}

/// Complete description of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Screen the scene belongs to.
    pub screen: Screen,
    /// Background fill.
    pub background: Color,
    /// Screen contents.
    pub view: View,
}

impl Scene {
    /// Builds the scene for the current session state.
    ///
    /// `leaderboard` is only consulted on the leaderboard screen and should
    /// already be ordered by descending score.
    #[must_use]
    pub fn new(
        snapshot: &SessionSnapshot,
        round: Option<&Round>,
        leaderboard: &[LeaderboardEntry],
        player: &PlayerName,
    ) -> Self {
        let view = match snapshot.screen {
            Screen::Menu => View::Menu {
                player: player.clone(),
            },
            Screen::Game => View::Game(game_presentation(snapshot, round)),
            Screen::GameOver => View::GameOver(game_over_presentation(snapshot)),
            Screen::Leaderboard => {
                View::Leaderboard(LeaderboardPresentation::new(leaderboard, player))
            }
            Screen::HowToPlay => View::HowToPlay(TutorialPresentation {
                page: snapshot.tutorial_page,
                pages: TUTORIAL_PAGES,
                image: tutorial_image(snapshot.tutorial_page),
            }),
        };

        Self {
            screen: snapshot.screen,
            background: Color::from_background(snapshot.background),
            view,
        }
    }
}

/// Formats whole seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Image asset for a tutorial page.
#[must_use]
pub fn tutorial_image(page: u8) -> String {
    format!("h{page}.png")
}

fn game_presentation(snapshot: &SessionSnapshot, round: Option<&Round>) -> GamePresentation {
    GamePresentation {
        round: round.map(RoundPresentation::new),
        score: snapshot.score,
        lives: snapshot.lives,
        session_clock: ClockPresentation {
            text: format_clock(snapshot.session_seconds_remaining),
            warning: snapshot.session_seconds_remaining < SESSION_WARNING_SECONDS,
        },
        round_timer: RoundTimerPresentation {
            remaining: snapshot.round_seconds_remaining,
            progress: snapshot.round_progress,
            warning: snapshot.round_seconds_remaining < ROUND_WARNING_SECONDS,
        },
        badge: DifficultyBadge::for_rounds(snapshot.rounds_completed),
    }
}

fn game_over_presentation(snapshot: &SessionSnapshot) -> GameOverPresentation {
    let level = level_achieved(snapshot.rounds_completed);
    GameOverPresentation {
        score: snapshot.score,
        rounds_completed: snapshot.rounds_completed,
        level,
        level_image: format!("{level}.png"),
        time_taken_seconds: snapshot.session_seconds_elapsed,
    }
}

/// Rendering backend capable of presenting reflex scenes.
pub trait RenderingBackend {
    /// Draws `scene`, replacing whatever was presented before.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{Color as Hue, SessionPhase, Shape};

    fn snapshot(screen: Screen) -> SessionSnapshot {
        SessionSnapshot {
            phase: SessionPhase::Running,
            screen,
            score: 0,
            lives: 3,
            rounds_completed: 0,
            session_seconds_remaining: 60,
            session_seconds_elapsed: 0,
            round_seconds_remaining: 3.0,
            round_duration_total: 3.0,
            round_progress: 1.0,
            background_churn: false,
            background: BackgroundColor::DEFAULT,
            tutorial_page: 1,
        }
    }

    #[test]
    fn clock_formats_minutes_and_padded_seconds() {
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn background_converts_channels() {
        let color = Color::from_background(BackgroundColor::from_rgb(0xff_00_80));
        assert_eq!(color, Color::from_rgb_u8(0xff, 0x00, 0x80));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn warnings_trigger_below_thresholds() {
        let mut state = snapshot(Screen::Game);
        state.session_seconds_remaining = 10;
        state.round_seconds_remaining = 2.0;
        let View::Game(calm) = Scene::new(&state, None, &[], &PlayerName::anonymous()).view
        else {
            panic!("game screen expected");
        };
        assert!(!calm.session_clock.warning);
        assert!(!calm.round_timer.warning);

        state.session_seconds_remaining = 9;
        state.round_seconds_remaining = 1.5;
        state.round_progress = 0.5;
        let View::Game(tense) = Scene::new(&state, None, &[], &PlayerName::anonymous()).view
        else {
            panic!("game screen expected");
        };
        assert_eq!(tense.session_clock.text, "0:09");
        assert_eq!(tense.session_clock.color(), Color::WARNING);
        assert!(tense.round_timer.warning);
        assert!((tense.round_timer.progress - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn option_caption_and_image_follow_label() {
        let option = OptionPresentation::new(Label::new(Hue::Violet, Shape::Hexagon));
        assert_eq!(option.caption, "Violet Hexagon");
        assert_eq!(option.image, "Violet Hexagon.png");
    }

    #[test]
    fn game_over_reports_level_and_time_taken() {
        let mut state = snapshot(Screen::GameOver);
        state.rounds_completed = 42;
        state.score = 380;
        state.session_seconds_remaining = 0;
        state.session_seconds_elapsed = 60;

        let scene = Scene::new(&state, None, &[], &PlayerName::anonymous());
        assert_eq!(
            scene.view,
            View::GameOver(GameOverPresentation {
                score: 380,
                rounds_completed: 42,
                level: 4,
                level_image: "4.png".to_owned(),
                time_taken_seconds: 60,
            })
        );
    }

    #[test]
    fn tutorial_page_uses_numbered_image() {
        let mut state = snapshot(Screen::HowToPlay);
        state.tutorial_page = 2;
        let scene = Scene::new(&state, None, &[], &PlayerName::anonymous());
        assert_eq!(
            scene.view,
            View::HowToPlay(TutorialPresentation {
                page: 2,
                pages: 3,
                image: "h2.png".to_owned(),
            })
        );
    }

    #[test]
    fn intents_map_onto_commands() {
        let label = Label::new(Hue::Red, Shape::Star);
        assert_eq!(Command::from(Intent::StartGame), Command::StartGame);
        assert_eq!(
            Command::from(Intent::SelectOption(label)),
            Command::SelectOption { label }
        );
        assert_eq!(
            Command::from(Intent::Navigate(Screen::Leaderboard)),
            Command::Navigate {
                screen: Screen::Leaderboard
            }
        );
        assert_eq!(
            Command::from(Intent::AdvanceTutorialPage(PageDirection::Next)),
            Command::AdvanceTutorialPage {
                direction: PageDirection::Next
            }
        );
    }
}
