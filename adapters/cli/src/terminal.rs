use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use reflex_core::{PageDirection, Screen, STARTING_LIVES};
use reflex_rendering::{
    Color, GameOverPresentation, GamePresentation, Intent, LeaderboardPresentation,
    RenderingBackend, Scene, TutorialPresentation, View,
};

const PROGRESS_WIDTH: usize = 20;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";

const TUTORIAL_TEXT: [&str; 3] = [
    "A color and shape appear at the top of the screen.",
    "Pick the matching image before the round clock runs out. Wrong picks and timeouts cost a life.",
    "Rounds get shorter and decoys get trickier. You have one minute and three lives.",
];

/// Line-based input understood by the terminal front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Intent(Intent),
    Quit,
}

/// Maps a typed line onto an action for the scene the player is looking at.
pub(crate) fn parse_input(line: &str, scene: &Scene) -> Option<Action> {
    let input = line.trim().to_ascii_lowercase();
    if matches!(input.as_str(), "q" | "quit" | "exit") {
        return Some(Action::Quit);
    }

    let intent = match (&scene.view, input.as_str()) {
        (View::Game(game), choice) if choice.parse::<usize>().is_ok() => {
            let index = choice.parse::<usize>().ok()?.checked_sub(1)?;
            let option = game.round.as_ref()?.options.get(index)?;
            Intent::SelectOption(option.label)
        }
        (View::HowToPlay(_), "" | "n") => Intent::AdvanceTutorialPage(PageDirection::Next),
        (View::HowToPlay(_), "p") => Intent::AdvanceTutorialPage(PageDirection::Previous),
        (_, "s" | "start") => Intent::StartGame,
        (_, "l") => Intent::Navigate(Screen::Leaderboard),
        (_, "h") => Intent::Navigate(Screen::HowToPlay),
        (_, "m") => Intent::Navigate(Screen::Menu),
        _ => return None,
    };
    Some(Action::Intent(intent))
}

/// Renders scenes as text on a writer, optionally with ANSI colors.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
    ansi: bool,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W, ansi: bool) -> Self {
        Self { out, ansi }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.ansi {
            let [red, green, blue] = channels(color);
            format!("\x1b[38;2;{red};{green};{blue}m{text}{RESET}")
        } else {
            text.to_owned()
        }
    }

    fn game(&mut self, game: &GamePresentation) -> AnyResult<()> {
        let hearts = "♥".repeat(usize::from(game.lives));
        let empty = "·".repeat(usize::from(STARTING_LIVES.saturating_sub(game.lives)));
        let clock = self.paint(&game.session_clock.text, game.session_clock.color());
        writeln!(
            self.out,
            "Score {:<5} Lives {hearts}{empty}   Time {clock}   Difficulty {}",
            game.score,
            game.badge.image_reference()
        )?;

        let Some(round) = &game.round else {
            writeln!(self.out, "No round available.")?;
            return Ok(());
        };
        writeln!(self.out)?;
        writeln!(self.out, "  {}", round.banner)?;
        writeln!(self.out)?;
        for (index, option) in round.options.iter().enumerate() {
            writeln!(self.out, "  [{}] {}", index + 1, option.caption)?;
        }

        let filled = (game.round_timer.progress * PROGRESS_WIDTH as f32).round() as usize;
        let bar = format!(
            "[{}{}] {:.1}s",
            "#".repeat(filled.min(PROGRESS_WIDTH)),
            "-".repeat(PROGRESS_WIDTH.saturating_sub(filled)),
            game.round_timer.remaining
        );
        let bar_color = if game.round_timer.warning {
            Color::WARNING
        } else {
            Color::TEXT
        };
        writeln!(self.out)?;
        writeln!(self.out, "  {}", self.paint(&bar, bar_color))?;
        writeln!(self.out, "Pick 1-4, [m] menu, [q] quit")?;
        Ok(())
    }

    fn game_over(&mut self, summary: &GameOverPresentation) -> AnyResult<()> {
        writeln!(self.out, "GAME OVER")?;
        writeln!(self.out, "Final score   {}", summary.score)?;
        writeln!(self.out, "Rounds        {}", summary.rounds_completed)?;
        writeln!(
            self.out,
            "Level         {} ({})",
            summary.level, summary.level_image
        )?;
        writeln!(self.out, "Time taken    {}s", summary.time_taken_seconds)?;
        writeln!(self.out, "[s] play again  [l] leaderboard  [m] menu  [q] quit")?;
        Ok(())
    }

    fn leaderboard(&mut self, board: &LeaderboardPresentation) -> AnyResult<()> {
        writeln!(self.out, "LEADERBOARD")?;
        if let Some(message) = board.empty_message {
            writeln!(self.out, "{message}")?;
        }
        for row in &board.rows {
            let marker = if row.highlighted { '>' } else { ' ' };
            let line = format!("{marker} {:>2}. {:<20} {:>6}", row.rank, row.player, row.score);
            let line = if row.highlighted {
                self.paint(&line, row.fill())
            } else {
                line
            };
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn tutorial(&mut self, page: &TutorialPresentation) -> AnyResult<()> {
        writeln!(
            self.out,
            "HOW TO PLAY  page {}/{} ({})",
            page.page, page.pages, page.image
        )?;
        let text = usize::from(page.page)
            .checked_sub(1)
            .and_then(|index| TUTORIAL_TEXT.get(index))
            .copied()
            .unwrap_or_default();
        writeln!(self.out, "{text}")?;
        writeln!(self.out, "[n] next  [p] previous  [m] menu")?;
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        if self.ansi {
            write!(self.out, "{CLEAR_SCREEN}")?;
        } else {
            writeln!(self.out, "{}", "=".repeat(40))?;
        }

        match &scene.view {
            View::Menu { player } => {
                writeln!(self.out, "REFLEX")?;
                writeln!(self.out, "Welcome, {player}!")?;
                writeln!(
                    self.out,
                    "[s] start  [l] leaderboard  [h] how to play  [q] quit"
                )?;
            }
            View::Game(game) => self.game(game)?,
            View::GameOver(summary) => self.game_over(summary)?,
            View::Leaderboard(board) => {
                self.leaderboard(board)?;
                writeln!(self.out, "[s] start  [m] menu  [q] quit")?;
            }
            View::HowToPlay(page) => self.tutorial(page)?,
        }

        self.out.flush().context("failed to flush terminal output")
    }
}

fn channels(color: Color) -> [u8; 3] {
    [color.red, color.green, color.blue].map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}
