use std::time::Duration;

use glam::Vec2;
use infiltrator::sentinel::patrol::PatrolRoute;
use infiltrator::sentinel::pursuit::{PlayerTrail, PursuitGuard, PursuitMode};
use infiltrator::sentinel::Pose;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;
use common::{cell, Harness};

const INTERVAL: Duration = Duration::from_millis(50);

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_trail_ignores_samples_until_started() {
    let mut trail = PlayerTrail::default();
    trail.record(Vec2::ONE, ms(10), INTERVAL);
    assert!(trail.is_empty());
    assert_eq!(trail.position_at(Duration::ZERO), None);
}

#[test]
fn test_trail_respects_sample_interval() {
    let mut trail = PlayerTrail::default();
    trail.start(ms(1000));

    for step in 0..10u64 {
        trail.record(Vec2::new(step as f32, 0.0), ms(1000 + step * 20), INTERVAL);
    }
    // Ticks every 20 ms, but samples only land at 0, 60, 120 and 180 ms.
    assert_eq!(trail.len(), 4);
}

#[test]
fn test_trail_lookup_by_offset() {
    let mut trail = PlayerTrail::default();
    trail.start(ms(500));
    trail.record(Vec2::new(0.0, 0.0), ms(500), INTERVAL);
    trail.record(Vec2::new(1.0, 0.0), ms(550), INTERVAL);
    trail.record(Vec2::new(2.0, 0.0), ms(600), INTERVAL);

    assert_eq!(trail.position_at(ms(0)), Some(Vec2::new(0.0, 0.0)));
    assert_eq!(trail.position_at(ms(30)), Some(Vec2::new(1.0, 0.0)));
    assert_eq!(trail.position_at(ms(50)), Some(Vec2::new(1.0, 0.0)));
    // Past the end of the recording: the latest sample.
    assert_eq!(trail.position_at(ms(5000)), Some(Vec2::new(2.0, 0.0)));
}

#[test]
fn test_trail_start_is_idempotent() {
    let mut trail = PlayerTrail::default();
    trail.start(ms(100));
    trail.record(Vec2::ZERO, ms(100), INTERVAL);
    trail.start(ms(900));

    assert_eq!(trail.started_at(), Some(ms(100)));
    assert_eq!(trail.len(), 1);
}

fn tick(guard: &mut PursuitGuard, pose: &mut Pose, harness: &mut Harness, player: Vec2, moving: bool) {
    let mut ctx = harness.tick(player, moving);
    guard.update(0, pose, &mut ctx);
}

fn run_until(
    guard: &mut PursuitGuard,
    pose: &mut Pose,
    harness: &mut Harness,
    player: Vec2,
    moving: bool,
    ticks: usize,
    mode: PursuitMode,
) -> bool {
    for _ in 0..ticks {
        tick(guard, pose, harness, player, moving);
        if guard.mode == mode {
            return true;
        }
    }
    false
}

#[test]
fn test_pursuit_lifecycle() {
    let mut harness = Harness::new(common::room());
    let home = cell(10, 5);
    let mut guard = PursuitGuard::new(PatrolRoute::new(vec![home], 0, true), harness.tuning.pursuit.max_energy);
    let mut pose = Pose::new(home, 0.0);
    let player = cell(5, 5);
    let far = cell(28, 10);

    // Heard: plan a path toward the player and start the trail.
    tick(&mut guard, &mut pose, &mut harness, player, false);
    assert_eq!(guard.mode, PursuitMode::Navigating);
    assert_eq!(guard.anchor, Some(home));
    assert_that(&guard.path.is_empty()).is_false();
    assert!(harness.trail.is_recording());

    // Arrives and, with the player standing still, freezes.
    assert!(run_until(&mut guard, &mut pose, &mut harness, player, false, 180, PursuitMode::Following));
    tick(&mut guard, &mut pose, &mut harness, player, false);
    assert!(guard.frozen);
    assert!(pose.position.distance(player) < 25.0);

    // Movement drains the last of its energy.
    guard.energy = 0.05;
    tick(&mut guard, &mut pose, &mut harness, player, true);
    assert_eq!(guard.mode, PursuitMode::Exhausted);
    assert!(!guard.frozen);

    // Rests, recovering energy, then heads home once the player is out of earshot.
    tick(&mut guard, &mut pose, &mut harness, far, true);
    assert!(guard.energy > 0.0);
    assert!(run_until(&mut guard, &mut pose, &mut harness, far, true, 240, PursuitMode::Returning));

    assert!(run_until(&mut guard, &mut pose, &mut harness, far, true, 240, PursuitMode::Patrol));
    assert_eq!(guard.anchor, None);
    assert_eq!(guard.energy, harness.tuning.pursuit.max_energy);
    assert!(pose.position.distance(home) < 25.0);
}

#[test]
fn test_exhausted_guard_resumes_following_if_player_still_heard() {
    let mut harness = Harness::new(common::room());
    let home = cell(10, 5);
    let mut guard = PursuitGuard::new(PatrolRoute::new(vec![home], 0, true), harness.tuning.pursuit.max_energy);
    let mut pose = Pose::new(home, 0.0);
    let player = cell(7, 5);

    guard.mode = PursuitMode::Exhausted;
    guard.energy = 0.0;
    guard.anchor = Some(home);
    guard.exhausted_at = Some(Duration::ZERO);

    assert!(run_until(&mut guard, &mut pose, &mut harness, player, true, 240, PursuitMode::Following));
    assert!(harness.now >= harness.tuning.pursuit.exhaustion);
}

#[test]
fn test_hearing_while_returning_replans_toward_player() {
    let mut harness = Harness::new(common::room());
    let home = cell(20, 5);
    let mut guard = PursuitGuard::new(PatrolRoute::new(vec![home], 0, true), harness.tuning.pursuit.max_energy);
    let mut pose = Pose::new(cell(12, 5), 0.0);

    guard.mode = PursuitMode::Returning;
    guard.anchor = Some(home);

    tick(&mut guard, &mut pose, &mut harness, cell(8, 5), false);
    assert_eq!(guard.mode, PursuitMode::Navigating);
    assert_eq!(guard.anchor, Some(home));
    assert_that(&guard.last_replan).is_some();
}

/// Records the player at the time of the next harness tick, the way the session does before
/// running sentinel controllers.
fn record(harness: &mut Harness, player: Vec2) {
    let next = harness.now + infiltrator::constants::LOOP_TIME;
    let interval = harness.tuning.pursuit.trail_sample_interval;
    harness.trail.record(player, next, interval);
}

fn following_guard(harness: &Harness, at: Vec2) -> PursuitGuard {
    let mut guard = PursuitGuard::new(PatrolRoute::new(vec![at], 0, true), harness.tuning.pursuit.max_energy);
    guard.mode = PursuitMode::Following;
    guard.anchor = Some(at);
    guard
}

#[test]
fn test_following_replays_the_trail_and_drains_energy() {
    let mut harness = Harness::new(common::room());
    let start = cell(5, 5);
    let mut guard = following_guard(&harness, start);
    let mut pose = Pose::new(start, 0.0);
    let mut player = cell(7, 5);
    harness.trail.start(Duration::ZERO);

    // First tick: the target is the recorded position at the current trail offset.
    player.x += 1.0;
    record(&mut harness, player);
    tick(&mut guard, &mut pose, &mut harness, player, true);
    let started = harness.trail.started_at().unwrap();
    let expected = harness.trail.position_at(harness.now - started).unwrap();
    assert_eq!(guard.motion.map(|m| m.target), Some(expected));

    // A second of the player walking right at one pixel per tick.
    for _ in 1..60 {
        player.x += 1.0;
        record(&mut harness, player);
        tick(&mut guard, &mut pose, &mut harness, player, true);
    }

    let tuning = &harness.tuning.pursuit;
    let drained = tuning.max_energy - tuning.drain_rate * 60.0 * infiltrator::constants::LOOP_TIME.as_secs_f32();
    assert_eq!(guard.mode, PursuitMode::Following);
    assert!((guard.energy - drained).abs() < 1e-2, "energy {}", guard.energy);
    assert!(!guard.frozen);
    assert_that(&pose.position.x).is_greater_than(start.x + 40.0);
    assert_that(&pose.position.distance(player)).is_less_than(start.distance(player));
}

#[test]
fn test_following_freezes_while_player_is_still() {
    let mut harness = Harness::new(common::room());
    let start = cell(5, 5);
    let mut guard = following_guard(&harness, start);
    let mut pose = Pose::new(start, 0.0);
    let player = cell(9, 5);
    harness.trail.start(Duration::ZERO);

    for _ in 0..60 {
        record(&mut harness, player);
        tick(&mut guard, &mut pose, &mut harness, player, false);
    }

    assert_eq!(guard.mode, PursuitMode::Following);
    assert!(guard.frozen);
    assert_eq!(guard.energy, harness.tuning.pursuit.max_energy);
    assert_eq!(pose.position, start);
}

#[test]
fn test_replanning_is_throttled() {
    let mut harness = Harness::new(common::room());
    let home = cell(25, 5);
    let mut guard = PursuitGuard::new(PatrolRoute::new(vec![home], 0, true), harness.tuning.pursuit.max_energy);
    let mut pose = Pose::new(home, 0.0);

    tick(&mut guard, &mut pose, &mut harness, cell(17, 5), false);
    assert_eq!(guard.mode, PursuitMode::Navigating);
    let first_plan = guard.last_replan;
    let first_path = guard.path.clone();

    // Heard again somewhere else half a second later: the path stands.
    let moved = cell(17, 8);
    for _ in 0..30 {
        tick(&mut guard, &mut pose, &mut harness, moved, true);
    }
    assert_eq!(guard.mode, PursuitMode::Navigating);
    assert_eq!(guard.last_replan, first_plan);
    assert_eq!(guard.path, first_path);

    // Past the interval the next hearing plans a fresh path.
    for _ in 0..32 {
        tick(&mut guard, &mut pose, &mut harness, moved, true);
    }
    assert_eq!(guard.mode, PursuitMode::Navigating);
    assert_that(&guard.last_replan).is_greater_than(first_plan);
    assert_ne!(guard.path, first_path);
}
