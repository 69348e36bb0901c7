use reflex_core::{
    Command, EndReason, Event, Label, MissCause, PageDirection, Screen, SessionPhase,
    SESSION_SECONDS, STARTING_LIVES,
};
use reflex_system_round_generation::RoundGenerator;
use reflex_world::{self as world, query, Session};

fn started(seed: u64) -> (Session, Vec<Event>) {
    let mut session = Session::from_seed(seed);
    let mut events = Vec::new();
    world::apply(&mut session, Command::StartGame, &mut events);
    (session, events)
}

fn target(session: &Session) -> Label {
    query::current_round(session)
        .expect("running session has a round")
        .target()
}

fn decoy(session: &Session) -> Label {
    let round = query::current_round(session).expect("running session has a round");
    *round
        .options()
        .iter()
        .find(|label| **label != round.target())
        .expect("round has decoys")
}

fn select(session: &mut Session, label: Label) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(session, Command::SelectOption { label }, &mut events);
    events
}

fn tick(session: &mut Session) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(session, Command::Tick, &mut events);
    events
}

/// Answers correctly, skipping straight through the one-second bracket so that
/// a following tick never times the round out.
fn answer(session: &mut Session) -> Vec<Event> {
    let label = target(session);
    let mut events = select(session, label);
    while (40..50).contains(&query::rounds_completed(session)) {
        let label = target(session);
        events.extend(select(session, label));
    }
    events
}

fn rounds_started(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::RoundStarted { .. }))
        .count()
}

fn sessions_ended(events: &[Event]) -> Vec<EndReason> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::SessionEnded { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn start_resets_state_and_generates_round_zero() {
    let (session, events) = started(1);
    let snapshot = query::snapshot(&session);

    assert_eq!(snapshot.phase, SessionPhase::Running);
    assert_eq!(snapshot.screen, Screen::Game);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.lives, STARTING_LIVES);
    assert_eq!(snapshot.rounds_completed, 0);
    assert_eq!(snapshot.session_seconds_remaining, SESSION_SECONDS);
    assert!((snapshot.round_duration_total - 3.0).abs() < f32::EPSILON);
    assert!((snapshot.round_seconds_remaining - 3.0).abs() < f32::EPSILON);
    assert!(!snapshot.background_churn);
    assert_eq!(events.first(), Some(&Event::SessionStarted));
    assert_eq!(rounds_started(&events), 1);
}

#[test]
fn correct_selection_scores_and_advances() {
    let (mut session, _) = started(2);
    let label = target(&session);

    let events = select(&mut session, label);

    assert_eq!(query::score(&session), 10);
    assert_eq!(query::lives(&session), STARTING_LIVES);
    assert_eq!(query::rounds_completed(&session), 1);
    assert_eq!(rounds_started(&events), 1);
    assert!(events.contains(&Event::AnswerAccepted { label, score: 10 }));
}

#[test]
fn incorrect_selection_with_lives_left_costs_a_life_and_advances() {
    let (mut session, _) = started(3);
    let label = decoy(&session);

    let events = select(&mut session, label);

    assert_eq!(query::lives(&session), STARTING_LIVES - 1);
    assert_eq!(query::score(&session), 0);
    assert_eq!(query::rounds_completed(&session), 1);
    assert_eq!(query::phase(&session), SessionPhase::Running);
    assert_eq!(rounds_started(&events), 1);
    assert!(events.contains(&Event::LifeLost {
        cause: MissCause::IncorrectSelection,
        lives: STARTING_LIVES - 1,
    }));
}

#[test]
fn three_incorrect_selections_end_the_session() {
    let (mut session, _) = started(4);

    for _ in 0..2 {
        let label = decoy(&session);
        let _ = select(&mut session, label);
    }
    let label = decoy(&session);
    let last = select(&mut session, label);

    assert_eq!(query::phase(&session), SessionPhase::Ended);
    assert_eq!(query::screen(&session), Screen::GameOver);
    assert_eq!(query::lives(&session), 0);
    assert_eq!(query::rounds_completed(&session), 2);
    assert_eq!(rounds_started(&last), 0, "no round after the final life");
    assert_eq!(sessions_ended(&last), vec![EndReason::LivesExhausted]);
    assert!(query::current_round(&session).is_none());
}

#[test]
fn round_timeout_behaves_like_an_incorrect_selection() {
    let (mut session, _) = started(5);

    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(tick(&mut session));
    }

    assert_eq!(query::lives(&session), STARTING_LIVES - 1);
    assert_eq!(query::rounds_completed(&session), 1);
    assert_eq!(query::phase(&session), SessionPhase::Running);
    assert_eq!(rounds_started(&events), 1);
    assert!(events.contains(&Event::LifeLost {
        cause: MissCause::RoundTimeout,
        lives: STARTING_LIVES - 1,
    }));

    let snapshot = query::snapshot(&session);
    assert!((snapshot.round_seconds_remaining - 3.0).abs() < f32::EPSILON);
    assert_eq!(snapshot.session_seconds_remaining, SESSION_SECONDS - 3);
}

#[test]
fn round_timeouts_alone_exhaust_lives() {
    let (mut session, _) = started(6);

    let mut events = Vec::new();
    for _ in 0..9 {
        events.extend(tick(&mut session));
    }

    assert_eq!(query::phase(&session), SessionPhase::Ended);
    assert_eq!(query::rounds_completed(&session), 2);
    assert_eq!(sessions_ended(&events), vec![EndReason::LivesExhausted]);
}

#[test]
fn session_clock_ends_the_session_mid_round_with_lives_left() {
    let (mut session, _) = started(7);
    let mut events = Vec::new();

    for second in 0..SESSION_SECONDS {
        if query::phase(&session) != SessionPhase::Running {
            panic!("session ended early at second {second}");
        }
        events.extend(answer(&mut session));
        events.extend(tick(&mut session));
    }

    assert_eq!(query::phase(&session), SessionPhase::Ended);
    assert_eq!(query::lives(&session), STARTING_LIVES);
    assert_eq!(sessions_ended(&events), vec![EndReason::SessionClockExpired]);
    assert_eq!(query::snapshot(&session).session_seconds_remaining, 0);
}

#[test]
fn session_expiry_wins_over_simultaneous_round_timeout() {
    let (mut session, _) = started(8);
    let mut events = Vec::new();

    for _ in 0..(SESSION_SECONDS - 1) {
        let _ = answer(&mut session);
        events = tick(&mut session);
    }
    assert_eq!(query::phase(&session), SessionPhase::Running);
    let snapshot = query::snapshot(&session);
    assert_eq!(snapshot.session_seconds_remaining, 1);
    assert!((snapshot.round_seconds_remaining - 0.5).abs() < f32::EPSILON);
    assert!(sessions_ended(&events).is_empty());

    let lives_before = query::lives(&session);
    let last = tick(&mut session);

    assert_eq!(sessions_ended(&last), vec![EndReason::SessionClockExpired]);
    assert_eq!(rounds_started(&last), 0);
    assert_eq!(query::lives(&session), lives_before);
}

#[test]
fn duration_steps_down_after_nine_correct_rounds() {
    let (mut session, _) = started(9);

    for completed in 0..10 {
        let snapshot = query::snapshot(&session);
        assert_eq!(snapshot.rounds_completed, completed);
        assert!(
            (snapshot.round_duration_total - 3.0).abs() < f32::EPSILON,
            "round {completed} should last 3 seconds",
        );
        let label = target(&session);
        let _ = select(&mut session, label);
    }

    let snapshot = query::snapshot(&session);
    assert_eq!(snapshot.rounds_completed, 10);
    assert!((snapshot.round_duration_total - 2.0).abs() < f32::EPSILON);
}

#[test]
fn gameplay_commands_are_ignored_unless_running() {
    let mut session = Session::from_seed(10);
    let mut events = Vec::new();

    world::apply(&mut session, Command::Tick, &mut events);
    world::apply(
        &mut session,
        Command::SelectOption {
            label: Label::new(reflex_core::Color::Red, reflex_core::Shape::Star),
        },
        &mut events,
    );
    assert!(events.is_empty());

    let (mut ended, _) = started(10);
    for _ in 0..3 {
        let label = decoy(&ended);
        let _ = select(&mut ended, label);
    }
    let snapshot = query::snapshot(&ended);
    assert!(tick(&mut ended).is_empty(), "stale tick must be ignored");
    assert_eq!(query::snapshot(&ended), snapshot);
}

#[test]
fn navigating_away_abandons_without_ending() {
    let (mut session, _) = started(11);
    let mut events = Vec::new();

    world::apply(
        &mut session,
        Command::Navigate {
            screen: Screen::Menu,
        },
        &mut events,
    );

    assert_eq!(query::phase(&session), SessionPhase::Idle);
    assert_eq!(query::screen(&session), Screen::Menu);
    assert!(events.contains(&Event::SessionAbandoned));
    assert!(sessions_ended(&events).is_empty());
    assert!(tick(&mut session).is_empty());
}

#[test]
fn restart_after_game_over_resets_everything() {
    let (mut session, _) = started(12);
    let label = target(&session);
    let _ = select(&mut session, label);
    for _ in 0..3 {
        let label = decoy(&session);
        let _ = select(&mut session, label);
    }
    assert_eq!(query::phase(&session), SessionPhase::Ended);

    let mut events = Vec::new();
    world::apply(&mut session, Command::StartGame, &mut events);

    let snapshot = query::snapshot(&session);
    assert_eq!(snapshot.phase, SessionPhase::Running);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.lives, STARTING_LIVES);
    assert_eq!(snapshot.rounds_completed, 0);
    assert_eq!(snapshot.session_seconds_remaining, SESSION_SECONDS);
}

#[test]
fn background_churns_every_tick_after_round_thirty_five() {
    let (mut session, _) = started(13);

    for _ in 0..35 {
        let label = target(&session);
        let _ = select(&mut session, label);
    }
    assert!(query::snapshot(&session).background_churn);

    let churned = tick(&mut session)
        .iter()
        .filter(|event| matches!(event, Event::BackgroundChanged { .. }))
        .count();
    assert_eq!(churned, 1);
    assert_ne!(
        query::snapshot(&session).background,
        reflex_core::BackgroundColor::DEFAULT,
        "background should be randomized once churn starts",
    );
}

#[test]
fn tutorial_pages_advance_and_return_to_menu() {
    let mut session = Session::from_seed(14);
    let mut events = Vec::new();

    world::apply(
        &mut session,
        Command::Navigate {
            screen: Screen::HowToPlay,
        },
        &mut events,
    );
    world::apply(
        &mut session,
        Command::AdvanceTutorialPage {
            direction: PageDirection::Previous,
        },
        &mut events,
    );
    assert_eq!(query::snapshot(&session).tutorial_page, 1);

    for expected in [2, 3] {
        world::apply(
            &mut session,
            Command::AdvanceTutorialPage {
                direction: PageDirection::Next,
            },
            &mut events,
        );
        assert_eq!(query::snapshot(&session).tutorial_page, expected);
    }

    world::apply(
        &mut session,
        Command::AdvanceTutorialPage {
            direction: PageDirection::Next,
        },
        &mut events,
    );
    assert_eq!(query::screen(&session), Screen::Menu);
}

#[test]
fn identical_seeds_replay_identical_event_streams() {
    let replay = |seed: u64| {
        let (mut session, mut events) = started(seed);
        for step in 0..40 {
            if step % 3 == 0 {
                events.extend(tick(&mut session));
            } else if query::current_round(&session).is_some() {
                let label = target(&session);
                events.extend(select(&mut session, label));
            }
        }
        events
    };

    assert_eq!(replay(0xdead_beef), replay(0xdead_beef));
}

#[test]
fn generation_failure_ends_the_session() {
    let mut session = Session::from_seed(1).with_generator(RoundGenerator::with_max_attempts(0));
    let mut events = Vec::new();
    world::apply(&mut session, Command::StartGame, &mut events);

    assert_eq!(
        events,
        vec![
            Event::SessionStarted,
            Event::ScreenChanged { screen: Screen::Game },
            Event::SessionEnded {
                reason: EndReason::RoundGenerationFailed,
                score: 0,
                rounds_completed: 0,
                elapsed_seconds: 0,
            },
            Event::ScreenChanged { screen: Screen::GameOver },
        ]
    );
    assert_eq!(query::phase(&session), SessionPhase::Ended);
    assert_eq!(query::screen(&session), Screen::GameOver);
    assert!(query::current_round(&session).is_none());
    assert!(tick(&mut session).is_empty());
}

#[test]
fn snapshot_reports_round_progress() {
    let (mut session, _) = started(11);
    assert!((query::snapshot(&session).round_progress - 1.0).abs() < f32::EPSILON);

    let _ = tick(&mut session);
    let snapshot = query::snapshot(&session);
    assert!((snapshot.round_progress - 2.0 / 3.0).abs() < 1e-4);
    assert!(
        (snapshot.round_progress - snapshot.round_seconds_remaining / snapshot.round_duration_total)
            .abs()
            < 1e-4
    );
}
