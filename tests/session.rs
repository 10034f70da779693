use std::f32::consts::PI;

use glam::Vec2;
use infiltrator::constants::LOOP_TIME;
use infiltrator::error::GameError;
use infiltrator::events::{CaughtBy, GameEvent};
use infiltrator::input::{Buttons, InputSnapshot};
use infiltrator::level::{CameraPose, LevelConfig, PuzzleConfig, PuzzlePairConfig, SentinelSpec};
use infiltrator::map::raster::RasterCache;
use infiltrator::overlay::Prompt;
use infiltrator::puzzle::PuzzleProgress;
use infiltrator::session::{GameSession, LevelPhase, Outcome};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;
use common::{cell, run, solve_minigame};

fn interact() -> InputSnapshot {
    InputSnapshot::idle().with_buttons(Buttons::INTERACT)
}

fn walk(direction: Vec2) -> InputSnapshot {
    InputSnapshot::moving(direction)
}

/// Spawn at cell (2, 2), one document two cells to the right, exit eight cells further.
fn corridor() -> (LevelConfig, RasterCache) {
    common::level(&common::ROOM, common::distant_patrol(), vec![cell(4, 2)], cell(10, 2))
}

/// Ticks until `done` holds, giving up after `limit` ticks.
fn tick_until(session: &mut GameSession, input: &InputSnapshot, limit: usize, done: impl Fn(&GameSession) -> bool) -> bool {
    for _ in 0..limit {
        session.tick(LOOP_TIME, input);
        if done(session) {
            return true;
        }
    }
    false
}

#[test]
fn test_locked_exit_then_single_victory() {
    let (config, rasters) = corridor();
    let mut session = common::session(config, rasters);

    // Walk onto the exit while it is still locked.
    run(&mut session, &walk(Vec2::X), 90);
    assert_eq!(session.outcome(), Outcome::Playing);
    assert!(session.is_exit_locked());
    assert!(session.player().position.distance(cell(10, 2)) <= 60.0);

    run(&mut session, &walk(Vec2::NEG_X), 90);
    session.drain_events();

    session.tick(LOOP_TIME, &interact());
    assert_that(&session.minigame().is_some()).is_true();
    assert_that(&session.drain_events()).contains(GameEvent::MiniGameStarted { document: 0 });

    solve_minigame(&mut session);
    let events = session.drain_events();
    assert_that(&events).contains(GameEvent::DocumentCollected {
        document: 0,
        narrative: 0,
    });
    assert_that(&events).contains(GameEvent::ExitUnlocked);
    assert!(!session.is_exit_locked());
    assert_eq!(session.documents_collected(), 1);

    let frame = session.frame();
    assert_eq!(frame.narrative.as_deref(), Some("Got it."));
    assert_eq!(frame.compass.objective, None);
    assert_eq!(frame.compass.exit, Some(0.0));

    assert!(tick_until(&mut session, &walk(Vec2::X), 150, |s| s.outcome().is_over()));
    assert_eq!(session.outcome(), Outcome::Victory);

    run(&mut session, &walk(Vec2::X), 30);
    let victories = session
        .drain_events()
        .into_iter()
        .filter(|event| *event == GameEvent::Victory)
        .count();
    assert_eq!(victories, 1);
}

#[test]
fn test_movement_events() {
    let (config, rasters) = corridor();
    let mut session = common::session(config, rasters);

    run(&mut session, &walk(Vec2::Y), 3);
    run(&mut session, &InputSnapshot::idle(), 3);
    assert_eq!(
        session.drain_events(),
        vec![GameEvent::MovementStarted, GameEvent::MovementStopped]
    );
}

#[test]
fn test_camera_sees_through_nothing_but_range() {
    let camera = CameraPose {
        position: cell(8, 2),
        facing: PI,
    };
    let (config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Cameras { poses: vec![camera] },
        vec![cell(4, 2)],
        cell(10, 2),
    );
    let mut session = common::session(config, rasters);

    session.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(session.outcome(), Outcome::Caught(CaughtBy::Sight(0)));
    assert_that(&session.drain_events()).contains(GameEvent::Caught(CaughtBy::Sight(0)));

    // Nothing moves once the level is over.
    let now = session.now();
    session.tick(LOOP_TIME, &walk(Vec2::X));
    assert_eq!(session.now(), now);
    assert_eq!(session.player().position, cell(2, 2));
}

#[test]
fn test_restart_rebuilds_the_level() {
    let camera = CameraPose {
        position: cell(8, 2),
        facing: PI,
    };
    let (config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Cameras { poses: vec![camera] },
        vec![cell(4, 2)],
        cell(10, 2),
    );
    let mut session = common::session(config, rasters);
    session.tick(LOOP_TIME, &InputSnapshot::idle());
    assert!(session.outcome().is_failure());

    assert!(matches!(session.advance(), Err(GameError::InvalidState(_))));

    session.restart().unwrap();
    assert_eq!(session.outcome(), Outcome::Playing);
    assert_eq!(session.player().position, cell(2, 2));
    assert_eq!(session.sentinels().len(), 2);
    assert_eq!(session.documents_collected(), 0);
    assert!(session.is_exit_locked());
    assert_eq!(session.elapsed(), std::time::Duration::ZERO);
}

#[test]
fn test_pursuit_guard_catches_by_contact() {
    let (mut config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Pursuit {
            paths: vec![vec![Vec2::new(162.5, 62.5), Vec2::new(162.5, 162.5)]],
        },
        vec![cell(20, 8)],
        cell(25, 2),
    );
    config.player_spawn = Vec2::new(62.5, 62.5);
    config.open_raster = Some("test".into());
    config.puzzle = Some(PuzzleConfig {
        pairs: vec![PuzzlePairConfig {
            a: cell(20, 5),
            b: cell(20, 9),
        }],
        exit: cell(25, 9),
    });
    let mut session = common::session(config, rasters);

    assert!(tick_until(&mut session, &InputSnapshot::idle(), 240, |s| s.outcome().is_over()));
    assert_eq!(session.outcome(), Outcome::Caught(CaughtBy::Contact(0)));
}

/// A vault floor: one document next to the spawn, the vault door further right and a single
/// puzzle pair below it. The pursuit guard is parked out of earshot.
fn vault() -> (LevelConfig, RasterCache) {
    let (mut config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Pursuit {
            paths: vec![vec![Vec2::new(537.5, 187.5)]],
        },
        vec![Vec2::new(100.0, 62.5)],
        Vec2::new(262.5, 62.5),
    );
    config.player_spawn = Vec2::new(62.5, 62.5);
    config.open_raster = Some("test".into());
    config.puzzle = Some(PuzzleConfig {
        pairs: vec![PuzzlePairConfig {
            a: Vec2::new(270.0, 62.5),
            b: Vec2::new(270.0, 195.0),
        }],
        exit: Vec2::new(400.0, 190.0),
    });
    (config, rasters)
}

/// Collects the document and walks onto the vault door.
fn open_vault(session: &mut GameSession) {
    session.tick(LOOP_TIME, &interact());
    solve_minigame(session);
    assert!(!session.is_exit_locked());
    assert!(tick_until(session, &walk(Vec2::X), 200, |s| s.puzzle().is_some()));
}

#[test]
fn test_vault_phase_and_connection_puzzle() {
    let (config, rasters) = vault();
    let mut session = common::session(config, rasters);

    session.tick(LOOP_TIME, &interact());
    solve_minigame(&mut session);
    assert!(!session.is_exit_locked());
    assert_eq!(session.frame().compass.exit, Some(0.0));

    // The vault door only opens from right next to it.
    assert!(tick_until(&mut session, &walk(Vec2::X), 200, |s| s.puzzle().is_some()));
    assert!(session.player().position.distance(Vec2::new(262.5, 62.5)) <= 10.0);
    assert_that(&session.drain_events()).contains(GameEvent::SecondPhaseStarted);
    assert_eq!(session.frame().prompt, Some(Prompt::PuzzlePoint { pair: 0, endpoint: infiltrator::puzzle::Endpoint::A }));
    let compass = session.frame().compass;
    assert_eq!(compass.exit, None);
    assert_eq!(compass.puzzle_points.len(), 1);

    session.tick(LOOP_TIME, &interact());
    assert_that(&session.drain_events()).contains(GameEvent::Puzzle(PuzzleProgress::Started(0)));
    // The live wire points the compass at B, straight below.
    let to_b = session.frame().compass.puzzle_points;
    assert_eq!(to_b.len(), 1);
    assert!((to_b[0] - PI / 2.0).abs() < 0.2, "bearing {}", to_b[0]);

    run(&mut session, &walk(Vec2::Y), 80);
    session.tick(LOOP_TIME, &interact());
    let events = session.drain_events();
    assert_that(&events).contains(GameEvent::Puzzle(PuzzleProgress::Solved));
    assert_that(&events).contains(GameEvent::ExitUnlocked);
    assert!(matches!(session.phase(), LevelPhase::Escape(_)));

    assert!(tick_until(&mut session, &walk(Vec2::X), 150, |s| s.outcome().is_over()));
    assert_eq!(session.outcome(), Outcome::Victory);
}

#[test]
fn test_minigame_suspends_the_world() {
    let (config, rasters) = corridor();
    let mut session = common::session(config, rasters);
    session.tick(LOOP_TIME, &interact());
    assert_that(&session.minigame().is_some()).is_true();

    let sentinels = session.sentinels().to_vec();
    let position = session.player().position;
    run(&mut session, &walk(Vec2::X), 30);

    assert_eq!(session.sentinels(), sentinels.as_slice());
    assert_eq!(session.player().position, position);
}

#[test]
fn test_minigame_timeout_is_a_catch() {
    let (config, rasters) = corridor();
    let mut session = common::session(config, rasters);
    session.tick(LOOP_TIME, &interact());

    assert!(tick_until(&mut session, &InputSnapshot::idle(), 1300, |s| s.outcome().is_over()));
    assert_eq!(session.outcome(), Outcome::Caught(CaughtBy::MiniGameTimeout));
    assert_that(&session.minigame().is_none()).is_true();
}

#[test]
fn test_frame_snapshot() {
    let (config, rasters) = corridor();
    let session = common::session(config, rasters);
    let frame = session.frame();

    assert_eq!(frame.prompt, Some(Prompt::Document(0)));
    assert_eq!(frame.hud.documents_total, 1);
    assert_eq!(frame.hud.documents_collected, 0);
    assert_eq!(frame.hud.puzzle_remaining, None);
    assert!(frame.exit.locked);
    assert_eq!(frame.player.energy, 1.0);
    assert_eq!(frame.sentinels.len(), 2);
    assert_that(&frame.sentinels.iter().all(|s| s.cone.is_some())).is_true();
    assert_that(&frame.minigame).is_none();
}

#[test]
fn test_builtin_catalog_session_fails_closed_without_rasters() {
    let catalog = infiltrator::level::LevelCatalog::builtin().unwrap();
    let session = GameSession::new(catalog, RasterCache::new(), 9).unwrap();

    assert!(!session.field().is_loaded());
    assert_eq!(session.level_index(), 0);
    assert_eq!(session.sentinels().len(), 18);
}

#[test]
fn test_puzzle_timer_runs_out() {
    let (mut config, rasters) = vault();
    config.tuning.puzzle_time_limit = std::time::Duration::from_secs(2);
    let mut session = common::session(config, rasters);
    open_vault(&mut session);
    session.drain_events();

    assert!(tick_until(&mut session, &InputSnapshot::idle(), 200, |s| s.outcome().is_over()));
    assert_eq!(session.outcome(), Outcome::PuzzleTimeout);
    assert!(session.outcome().is_failure());
    assert_that(&session.drain_events()).contains(GameEvent::PuzzleExpired);

    session.restart().unwrap();
    assert!(matches!(session.phase(), LevelPhase::Infiltration));
}

/// A guard standing still at `post` and facing right, with the player placed at `player`.
fn sentry(layout: &[&str], post: Vec2, player: Vec2) -> GameSession {
    let (mut config, rasters) = common::level(
        layout,
        SentinelSpec::Patrols { paths: vec![vec![post]] },
        vec![cell(25, 9)],
        cell(27, 9),
    );
    config.player_spawn = player;
    common::session(config, rasters)
}

#[test]
fn test_patrol_guard_catches_by_sight() {
    let (mut config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Patrols {
            paths: vec![vec![cell(6, 2), cell(20, 2)]],
        },
        vec![cell(4, 8)],
        cell(27, 9),
    );
    config.player_spawn = cell(14, 2);
    let mut session = common::session(config, rasters);

    session.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(session.outcome(), Outcome::Caught(CaughtBy::Sight(0)));
    assert_that(&session.drain_events()).contains(GameEvent::Caught(CaughtBy::Sight(0)));
}

#[test]
fn test_vision_range_edge() {
    let post = Vec2::new(100.0, 120.0);
    let range = infiltrator::config::Tuning::default().guard.vision_range;

    let mut outside = sentry(&common::ROOM, post, post + Vec2::new(range + 1.0, 0.0));
    outside.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(outside.outcome(), Outcome::Playing);

    let mut inside = sentry(&common::ROOM, post, post + Vec2::new(range - 1.0, 0.0));
    inside.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(inside.outcome(), Outcome::Caught(CaughtBy::Sight(0)));
}

#[test]
fn test_vision_cone_edge() {
    let post = Vec2::new(100.0, 120.0);
    let at = |degrees: f32| post + Vec2::from_angle(degrees.to_radians()) * 150.0;

    // Half the cone is 17.5 degrees either side of the heading.
    let mut outside = sentry(&common::ROOM, post, at(25.0));
    outside.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(outside.outcome(), Outcome::Playing);

    let mut inside = sentry(&common::ROOM, post, at(10.0));
    inside.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(inside.outcome(), Outcome::Caught(CaughtBy::Sight(0)));
}

#[test]
fn test_walls_hide_the_player_from_guards() {
    let (post, player) = (cell(10, 4), cell(18, 4));

    let mut hidden = sentry(&common::SPLIT_ROOM, post, player);
    run(&mut hidden, &InputSnapshot::idle(), 60);
    assert_eq!(hidden.outcome(), Outcome::Playing);

    let mut exposed = sentry(&common::ROOM, post, player);
    exposed.tick(LOOP_TIME, &InputSnapshot::idle());
    assert_eq!(exposed.outcome(), Outcome::Caught(CaughtBy::Sight(0)));
}

#[test]
fn test_compass_lists_nearby_threats() {
    let (config, rasters) = corridor();
    let quiet = common::session(config, rasters).frame().compass;
    assert!(quiet.threats.is_empty());
    assert_eq!(quiet.objective, Some(0.0));
    assert_eq!(quiet.exit, None);

    let (config, rasters) = common::level(
        &common::ROOM,
        SentinelSpec::Patrols {
            paths: vec![vec![cell(12, 2)]],
        },
        vec![cell(4, 2)],
        cell(10, 2),
    );
    let threats = common::session(config, rasters).frame().compass.threats;
    assert_eq!(threats.len(), 2);
    assert_that(&threats.iter().all(|bearing| bearing.abs() < 1e-6)).is_true();
}
