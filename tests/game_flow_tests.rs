//! Whole-game tests: AI tables play to completion, results are
//! reproducible from the seed, and the input boundary rejects bad
//! submissions without side effects.

use siege_dice::core::{ControlKind, EngineError, GameConfig, PlayerId};
use siege_dice::decision::{DecisionKind, GameOption};
use siege_dice::events::GameEvent;
use siege_dice::rules::{Engine, GameResult};
use siege_dice::session::{GameSession, DEFAULT_MAX_STEPS};

/// Route engine logs to the test output; set `RUST_LOG=siege_dice=debug`
/// to follow a game decision by decision.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_ai_tables_of_every_size_finish() {
    init_tracing();
    for seats in 2..=8 {
        let mut session = GameSession::new(GameConfig::all_ai(seats).with_seed(seats as u64 * 97)).unwrap();
        let outcome = session.play_until_game_over(DEFAULT_MAX_STEPS).unwrap();
        let result = outcome.result.expect("game should finish");

        let state = session.engine().state();
        match result {
            GameResult::Winner(winner) => {
                let player = state.player(winner);
                assert!(player.is_alive());
                let sole_survivor = state.living_count() == 1;
                assert!(sole_survivor || player.points() >= state.config.win_points);
            }
            GameResult::Winners(winners) => {
                assert!(winners.len() > 1);
                for winner in winners {
                    assert!(state.player(winner).points() >= state.config.win_points);
                }
            }
            GameResult::Draw => assert_eq!(state.living_count(), 0),
        }
    }
}

#[test]
fn test_same_seed_same_game() {
    let play = |seed: u64| {
        let mut session = GameSession::new(GameConfig::all_ai(4).with_seed(seed)).unwrap();
        let outcome = session.play_until_game_over(DEFAULT_MAX_STEPS).unwrap();
        let history: Vec<String> = session
            .engine()
            .state()
            .history
            .iter()
            .map(ToString::to_string)
            .collect();
        (outcome, history)
    };
    assert_eq!(play(1234), play(1234));
}

#[test]
fn test_history_records_every_resolution() {
    let mut session = GameSession::new(GameConfig::all_ai(3).with_seed(5)).unwrap();
    let outcome = session.play_until_game_over(DEFAULT_MAX_STEPS).unwrap();
    let history = &session.engine().state().history;
    assert_eq!(history.len(), outcome.steps);
    assert_eq!(history.front().map(|r| r.kind), Some(DecisionKind::StartTurn));
    assert!(history.iter().all(|r| r.game == 0));
}

#[test]
fn test_game_over_event_and_new_game() {
    let mut session = GameSession::new(GameConfig::all_ai(3).with_seed(77)).unwrap();
    session.play_until_game_over(DEFAULT_MAX_STEPS).unwrap();
    let events = session.drain_events();
    assert!(matches!(events.last(), Some(GameEvent::GameOver { .. }) | Some(GameEvent::DecisionPresented { .. })));
    assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));

    let decision = session.engine_mut().present().unwrap().clone();
    assert_eq!(decision.kind, DecisionKind::NewGame);
    assert_eq!(decision.player, None);
    session.submit(decision.id, GameOption::NewGame, 0).unwrap();

    {
        let state = session.engine().state();
        assert!(state.result.is_none());
        assert_eq!(state.games_played, 1);
        assert!(state.players.values().all(|p| p.points() == 0 && p.is_alive()));
        assert_eq!(state.clock.day, 1);
    }
    assert_eq!(session.engine_mut().present().unwrap().kind, DecisionKind::StartTurn);
}

#[test]
fn test_stale_submission_is_rejected() {
    let config = GameConfig::new()
        .with_seat("Ada", ControlKind::Human)
        .with_seat("Grace", ControlKind::Human)
        .with_seed(19);
    let mut engine = Engine::standard(config).unwrap();

    let start = engine.present().unwrap().id;
    engine.submit_decision(start, GameOption::StartTurn, 0).unwrap();
    let roll = engine.present().unwrap().id;

    let err = engine.submit_decision(start, GameOption::StartTurn, 0).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidDecisionState { .. } | EngineError::UnknownDecision { .. }
    ));
    assert_eq!(engine.current_decision().map(|d| d.id), Some(roll));
    assert_eq!(engine.state().history.len(), 1);
}

#[test]
fn test_option_index_submission() {
    let config = GameConfig::new()
        .with_seat("Ada", ControlKind::Human)
        .with_seat("Grace", ControlKind::Human)
        .with_seed(19);
    let mut engine = Engine::standard(config).unwrap();
    let id = engine.present().unwrap().id;
    assert!(engine.submit_option_index(id, 3, 0).is_err());
    let record = engine.submit_option_index(id, 0, 0).unwrap();
    assert_eq!(record.option, GameOption::StartTurn);
}

#[test]
fn test_held_dice_survive_a_reroll() {
    let config = GameConfig::new()
        .with_seat("Ada", ControlKind::Human)
        .with_seat("Grace", ControlKind::Human)
        .with_seed(23);
    let mut engine = Engine::standard(config).unwrap();
    for option in [GameOption::StartTurn, GameOption::Roll] {
        let id = engine.present().unwrap().id;
        engine.submit_decision(id, option, 0).unwrap();
    }
    assert_eq!(engine.present().unwrap().kind, DecisionKind::IntermediateRoll);
    let kept = engine.state().dice.result(0);
    assert!(engine.click_die(0));
    assert!(engine.state().dice.is_held(0));

    let id = engine.present().unwrap().id;
    engine.submit_decision(id, GameOption::Roll, 0).unwrap();
    assert_eq!(engine.state().dice.result(0), kept);
    assert_eq!(engine.state().dice.roll_count(), 2);
}

#[test]
fn test_timed_human_seats_play_themselves() {
    init_tracing();
    let config = GameConfig::new()
        .with_seat("Ada", ControlKind::Human)
        .with_seat("Grace", ControlKind::Ai)
        .with_timed_turns(0.5)
        .with_ai_think_time(0.1)
        .with_seed(8);
    let mut session = GameSession::new(config).unwrap();
    let mut resolved = 0;
    for _ in 0..200 {
        if session.tick(0.25).unwrap().is_some() {
            resolved += 1;
        }
    }
    assert!(resolved > 10);
    assert!(session
        .engine()
        .state()
        .history
        .iter()
        .any(|r| r.player == Some(PlayerId::new(0))));
}
