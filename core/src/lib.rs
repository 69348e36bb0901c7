#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the reflex game.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`] values
//! describing player intents and clock ticks, the session executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and adapters to react to. Systems never mutate the session
//! directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds on the session clock when a game starts.
pub const SESSION_SECONDS: u32 = 60;

/// Lives granted at the start of every session.
pub const STARTING_LIVES: u8 = 3;

/// Points awarded for every correct selection.
pub const POINTS_PER_CORRECT: u32 = 10;

/// Number of labels offered to the player in every round.
pub const OPTIONS_PER_ROUND: usize = 4;

/// Player name used when the identity provider cannot supply one.
pub const ANONYMOUS_PLAYER: &str = "Anonymous";

/// Number of pages in the how-to-play tutorial.
pub const TUTORIAL_PAGES: u8 = 3;

/// Colors available to round labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    /// Violet.
    Violet,
    /// Orange.
    Orange,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
    /// Red.
    Red,
    /// Green.
    Green,
}

impl Color {
    /// Full color palette in canonical order.
    pub const ALL: [Color; 6] = [
        Self::Violet,
        Self::Orange,
        Self::Blue,
        Self::Yellow,
        Self::Red,
        Self::Green,
    ];

    /// Display name used in labels and image references.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Violet => "Violet",
            Self::Orange => "Orange",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Red => "Red",
            Self::Green => "Green",
        }
    }
}

/// Shapes available to round labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    /// Circle.
    Circle,
    /// Hexagon.
    Hexagon,
    /// Square.
    Square,
    /// Star.
    Star,
    /// Triangle.
    Triangle,
}

impl Shape {
    /// Full shape palette in canonical order.
    pub const ALL: [Shape; 5] = [
        Self::Circle,
        Self::Hexagon,
        Self::Square,
        Self::Star,
        Self::Triangle,
    ];

    /// Display name used in labels and image references.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Hexagon => "Hexagon",
            Self::Square => "Square",
            Self::Star => "Star",
            Self::Triangle => "Triangle",
        }
    }
}

/// Color and shape pair identifying a single image option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    color: Color,
    shape: Shape,
}

impl Label {
    /// Creates a new label from its color and shape.
    #[must_use]
    pub const fn new(color: Color, shape: Shape) -> Self {
        Self { color, shape }
    }

    /// Color component of the label.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Shape component of the label.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Image asset the renderer should display for this label.
    #[must_use]
    pub fn image_reference(&self) -> String {
        format!("{self}.png")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color.name(), self.shape.name())
    }
}

/// Strategy used to choose the decoys of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecoyStrategy {
    /// Decoys are drawn freely from the palettes.
    Random,
    /// One decoy shares the target's shape with a different color.
    SameShapeFamily,
}

/// One target label together with the ordered options presented to the player.
///
/// A round can only be constructed through [`Round::try_new`], which enforces
/// that the options are distinct and contain the target exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    target: Label,
    options: [Label; OPTIONS_PER_ROUND],
}

impl Round {
    /// Validates and assembles a round.
    ///
    /// Returns `None` when the options repeat a label or do not contain the
    /// target.
    #[must_use]
    pub fn try_new(target: Label, options: [Label; OPTIONS_PER_ROUND]) -> Option<Self> {
        for (index, label) in options.iter().enumerate() {
            if options[index + 1..].contains(label) {
                return None;
            }
        }

        if !options.contains(&target) {
            return None;
        }

        Some(Self { target, options })
    }

    /// Label the player is asked to pick.
    #[must_use]
    pub const fn target(&self) -> Label {
        self.target
    }

    /// Options in presentation order.
    #[must_use]
    pub const fn options(&self) -> &[Label; OPTIONS_PER_ROUND] {
        &self.options
    }

    /// Reports whether the provided label is the round's target.
    #[must_use]
    pub fn is_target(&self, label: Label) -> bool {
        self.target == label
    }
}

/// Lifecycle phase of the game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No session has been started; menu, tutorial and leaderboard screens.
    #[default]
    Idle,
    /// A session is in progress and its clocks are ticking.
    Running,
    /// The session terminated and awaits a new start.
    Ended,
}

/// Reasons a running session may terminate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The player lost the final life.
    LivesExhausted,
    /// The session clock reached zero.
    SessionClockExpired,
    /// The next round could not be generated.
    RoundGenerationFailed,
}

/// Causes of a lost life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MissCause {
    /// The player picked a decoy.
    IncorrectSelection,
    /// The round clock ran out before any pick.
    RoundTimeout,
}

/// Screens the renderer can present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Main menu.
    #[default]
    Menu,
    /// Active game screen.
    Game,
    /// Results screen shown after a session ends.
    GameOver,
    /// Top scores.
    Leaderboard,
    /// Paged tutorial.
    HowToPlay,
}

/// Direction of travel through the tutorial pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageDirection {
    /// Move to the previous page.
    Previous,
    /// Move to the next page.
    Next,
}

/// Background color of the game screen expressed as 24-bit RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackgroundColor(u32);

impl BackgroundColor {
    /// Background shown until churn begins.
    pub const DEFAULT: Self = Self(0x31_01_7c);

    /// Exclusive upper bound for randomly drawn background values.
    pub const RANDOM_BOUND: u32 = 0xff_ff_ff;

    /// Creates a background color from a packed RGB value, discarding any alpha byte.
    #[must_use]
    pub const fn from_rgb(value: u32) -> Self {
        Self(value & 0xff_ff_ff)
    }

    /// Packed RGB value.
    #[must_use]
    pub const fn rgb(&self) -> u32 {
        self.0
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the session and begins round zero.
    StartGame,
    /// Player picked one of the presented options.
    SelectOption {
        /// Label the player picked.
        label: Label,
    },
    /// Advances both session clocks by one second.
    Tick,
    /// Requests a switch to another screen.
    Navigate {
        /// Screen to present.
        screen: Screen,
    },
    /// Flips the tutorial page.
    AdvanceTutorialPage {
        /// Direction to flip.
        direction: PageDirection,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A fresh session entered the running phase.
    SessionStarted,
    /// A new round began.
    RoundStarted {
        /// Number of rounds completed before this one.
        round_index: u32,
        /// Generated target and options.
        round: Round,
        /// Seconds allotted to the round.
        duration: f32,
        /// Strategy that produced the decoys.
        strategy: DecoyStrategy,
    },
    /// The player picked the target.
    AnswerAccepted {
        /// Label that was picked.
        label: Label,
        /// Score after the award.
        score: u32,
    },
    /// The player lost a life.
    LifeLost {
        /// What cost the life.
        cause: MissCause,
        /// Lives remaining afterwards.
        lives: u8,
    },
    /// The clocks advanced by one tick.
    ClocksAdvanced {
        /// Seconds left on the session clock.
        session_seconds: u32,
        /// Seconds left on the round clock.
        round_seconds: f32,
    },
    /// The background color changed.
    BackgroundChanged {
        /// New background color.
        color: BackgroundColor,
    },
    /// The running session terminated.
    SessionEnded {
        /// Why the session ended.
        reason: EndReason,
        /// Final score.
        score: u32,
        /// Rounds completed during the session.
        rounds_completed: u32,
        /// Seconds elapsed on the session clock.
        elapsed_seconds: u32,
    },
    /// The player left a running session without finishing it.
    SessionAbandoned,
    /// A different screen became active.
    ScreenChanged {
        /// Screen now presented.
        screen: Screen,
    },
    /// The tutorial page changed.
    TutorialPageChanged {
        /// One-based page now shown.
        page: u8,
    },
}

/// Display name of a player as known to the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Wraps the provided name, falling back to [`ANONYMOUS_PLAYER`] when blank.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::anonymous()
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Sentinel player used when no identity is available.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PLAYER.to_owned())
    }

    /// Name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl From<String> for PlayerName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best score recorded for a single player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player owning the score.
    pub player: PlayerName,
    /// Best score achieved by the player.
    pub score: u32,
}

impl LeaderboardEntry {
    /// Creates a new leaderboard entry.
    #[must_use]
    pub const fn new(player: PlayerName, score: u32) -> Self {
        Self { player, score }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackgroundColor, Color, Label, PlayerName, Round, Shape, ANONYMOUS_PLAYER};

    fn label(color: Color, shape: Shape) -> Label {
        Label::new(color, shape)
    }

    #[test]
    fn label_renders_color_then_shape() {
        let violet_star = label(Color::Violet, Shape::Star);
        assert_eq!(violet_star.to_string(), "Violet Star");
        assert_eq!(violet_star.image_reference(), "Violet Star.png");
    }

    #[test]
    fn round_accepts_distinct_options_containing_target() {
        let target = label(Color::Red, Shape::Circle);
        let round = Round::try_new(
            target,
            [
                label(Color::Blue, Shape::Square),
                target,
                label(Color::Green, Shape::Star),
                label(Color::Red, Shape::Hexagon),
            ],
        )
        .expect("valid round");

        assert!(round.is_target(target));
        assert!(!round.is_target(label(Color::Blue, Shape::Square)));
    }

    #[test]
    fn round_rejects_duplicate_options() {
        let target = label(Color::Red, Shape::Circle);
        let decoy = label(Color::Blue, Shape::Square);
        assert!(Round::try_new(target, [target, decoy, decoy, label(Color::Green, Shape::Star)])
            .is_none());
    }

    #[test]
    fn round_rejects_options_without_target() {
        let target = label(Color::Red, Shape::Circle);
        assert!(Round::try_new(
            target,
            [
                label(Color::Blue, Shape::Square),
                label(Color::Green, Shape::Star),
                label(Color::Violet, Shape::Triangle),
                label(Color::Orange, Shape::Hexagon),
            ],
        )
        .is_none());
    }

    #[test]
    fn background_color_formats_as_hex() {
        assert_eq!(BackgroundColor::DEFAULT.to_string(), "#31017c");
        assert_eq!(BackgroundColor::from_rgb(0xff_00_ff_00).to_string(), "#00ff00");
    }

    #[test]
    fn blank_player_names_fall_back_to_anonymous() {
        assert_eq!(PlayerName::new("   ").as_str(), ANONYMOUS_PLAYER);
        assert_eq!(PlayerName::new(" ada ").as_str(), "ada");
    }

    #[test]
    fn player_name_serializes_transparently() {
        let json = serde_json::to_string(&PlayerName::new("ada")).expect("serialize");
        assert_eq!(json, "\"ada\"");
    }

    #[test]
    fn deserialized_player_names_are_normalized() {
        let padded: PlayerName = serde_json::from_str("\"  ada \"").expect("deserialize");
        assert_eq!(padded.as_str(), "ada");

        let blank: PlayerName = serde_json::from_str("\"\"").expect("deserialize");
        assert_eq!(blank, PlayerName::anonymous());
    }
}
