use std::{
    io::{self, BufRead, IsTerminal, Write},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use reflex_core::{BackgroundColor, Command, Event, LeaderboardEntry, PlayerName, Screen};
use reflex_leaderboard::{InMemoryLeaderboard, JsonFileLeaderboard};
use reflex_rendering::{
    Color, LeaderboardPresentation, RenderingBackend, Scene, View, LEADERBOARD_ROWS,
};
use reflex_system_reconciler::{LeaderboardStore, Reconciler};
use reflex_system_timers::TickScheduler;
use reflex_world::{self as world, query, Session};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    terminal::{parse_input, Action, TerminalBackend},
};

/// How long the loop sleeps waiting for input while no session is running.
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Opens the configured leaderboard, degrading to a process-local board.
pub(crate) fn open_store(settings: &Settings) -> Box<dyn LeaderboardStore> {
    match JsonFileLeaderboard::open(&settings.leaderboard_path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(
                path = %settings.leaderboard_path.display(),
                "leaderboard unavailable, scores will not persist: {err}"
            );
            Box::new(InMemoryLeaderboard::new())
        }
    }
}

/// Prints the top scores without starting a session.
pub(crate) fn print_leaderboard(settings: &Settings, player: &PlayerName) -> Result<()> {
    let store = JsonFileLeaderboard::open(&settings.leaderboard_path).with_context(|| {
        format!(
            "failed to open leaderboard at {}",
            settings.leaderboard_path.display()
        )
    })?;
    let entries = store
        .top_n(LEADERBOARD_ROWS)
        .context("failed to read leaderboard")?;
    let scene = Scene {
        screen: Screen::Leaderboard,
        background: Color::from_background(BackgroundColor::DEFAULT),
        view: View::Leaderboard(LeaderboardPresentation::new(&entries, player)),
    };
    TerminalBackend::new(io::stdout().lock(), false).present(&scene)
}

/// Runs an interactive session on stdin and stdout until the player quits.
pub(crate) fn play(settings: &Settings, player: PlayerName) -> Result<()> {
    let mut session = match settings.seed {
        Some(seed) => {
            info!(seed, "using seeded rounds");
            Session::from_seed(seed)
        }
        None => Session::new(),
    };
    let mut store = open_store(settings);
    let mut reconciler = Reconciler::new(player);
    let stdout = io::stdout();
    let ansi = stdout.is_terminal();
    let mut backend = TerminalBackend::new(stdout.lock(), ansi);

    let input = spawn_input_reader();
    let mut scheduler = TickScheduler::default();
    let mut commands = Vec::new();
    let mut events = Vec::new();
    let mut outcomes = Vec::new();

    let mut scene = build_scene(&session, store.as_ref(), reconciler.player());
    backend.present(&scene)?;
    let mut last_frame = Instant::now();

    loop {
        let wait = if query::is_active(&session) {
            scheduler.until_next_tick()
        } else {
            IDLE_POLL
        };
        let received = input.recv_timeout(wait);

        let action = match received {
            Ok(line) => parse_input(&line, &scene),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Action::Quit),
        };

        let now = Instant::now();
        scheduler.handle(now - last_frame, query::phase(&session), &mut commands);
        last_frame = now;

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut session, command, &mut events);
        }
        match action {
            Some(Action::Quit) => {
                if query::is_active(&session) {
                    world::apply(
                        &mut session,
                        Command::Navigate {
                            screen: Screen::Menu,
                        },
                        &mut events,
                    );
                }
                reconciler.handle(&events, store.as_mut(), &mut outcomes);
                break;
            }
            Some(Action::Intent(intent)) => {
                debug!(?intent, "player input");
                world::apply(&mut session, Command::from(intent), &mut events);
            }
            None => {}
        }

        if events.is_empty() {
            continue;
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::SessionStarted))
        {
            scheduler.stop();
        }

        outcomes.clear();
        reconciler.handle(&events, store.as_mut(), &mut outcomes);
        scene = build_scene(&session, store.as_ref(), reconciler.player());
        backend.present(&scene)?;
    }

    writeln!(io::stderr(), "Thanks for playing.").context("failed to write farewell")?;
    Ok(())
}

fn build_scene(session: &Session, store: &dyn LeaderboardStore, player: &PlayerName) -> Scene {
    let entries = if query::screen(session) == Screen::Leaderboard {
        leaderboard_entries(store)
    } else {
        Vec::new()
    };
    Scene::new(
        &query::snapshot(session),
        query::current_round(session),
        &entries,
        player,
    )
}

fn leaderboard_entries(store: &dyn LeaderboardStore) -> Vec<LeaderboardEntry> {
    store.top_n(LEADERBOARD_ROWS).unwrap_or_else(|err| {
        warn!("failed to read leaderboard: {err}");
        Vec::new()
    })
}

fn spawn_input_reader() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    let _ = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}
