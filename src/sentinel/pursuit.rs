//! Hearing-driven pursuit guards.
//!
//! A pursuit guard walks its beat until it hears the player, paths to the sound with A*,
//! then shadows the player's recorded movement until it runs out of energy. After a rest it
//! either resumes the chase or walks back to where it left its beat.
//!
//! ```text
//! Patrol -> Navigating -> Following <-> Exhausted -> Returning -> Patrol
//!               ^                                       |
//!               +---------------------------------------+
//! ```

use std::time::Duration;

use circular_buffer::CircularBuffer;
use glam::Vec2;
use strum_macros::{Display, IntoStaticStr};
use tracing::{debug, info};

use crate::constants::TRAIL_CAPACITY;
use crate::map::pathfinding::{find_path, GridSpec};
use crate::sentinel::motion::MotionTask;
use crate::sentinel::patrol::{Beat, PatrolRoute};
use crate::sentinel::perception::can_hear;
use crate::sentinel::{Pose, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PursuitMode {
    Patrol,
    Navigating,
    Following,
    Exhausted,
    Returning,
}

/// A recorded player position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub position: Vec2,
    /// Offset from the start of the recording.
    pub offset: Duration,
}

/// Session-wide recording of where the player went, started by the first guard to hear them.
pub struct PlayerTrail {
    samples: Box<CircularBuffer<TRAIL_CAPACITY, TrailSample>>,
    started: Option<Duration>,
    last_sample: Option<Duration>,
}

impl Default for PlayerTrail {
    fn default() -> Self {
        Self {
            samples: CircularBuffer::boxed(),
            started: None,
            last_sample: None,
        }
    }
}

impl std::fmt::Debug for PlayerTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerTrail")
            .field("samples", &self.samples.len())
            .field("started", &self.started)
            .finish()
    }
}

impl PlayerTrail {
    pub fn is_recording(&self) -> bool {
        self.started.is_some()
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Starts a fresh recording unless one is already running.
    pub fn start(&mut self, now: Duration) {
        if self.started.is_none() {
            info!("Player trail recording started");
            self.samples.clear();
            self.started = Some(now);
            self.last_sample = None;
        }
    }

    /// Records `position` if at least `interval` has passed since the last sample.
    pub fn record(&mut self, position: Vec2, now: Duration, interval: Duration) {
        let Some(started) = self.started else {
            return;
        };
        if self.last_sample.is_some_and(|last| now.saturating_sub(last) < interval) {
            return;
        }
        self.last_sample = Some(now);
        self.samples.push_back(TrailSample {
            position,
            offset: now.saturating_sub(started),
        });
    }

    /// The first sample recorded at or after `offset`, else the latest one.
    pub fn position_at(&self, offset: Duration) -> Option<Vec2> {
        self.samples
            .iter()
            .find(|sample| sample.offset >= offset)
            .or_else(|| self.samples.back())
            .map(|sample| sample.position)
    }
}

/// A guard that hunts by ear.
#[derive(Debug, Clone, PartialEq)]
pub struct PursuitGuard {
    pub beat: Beat,
    pub mode: PursuitMode,
    pub energy: f32,
    /// Where the guard left its beat; it walks back here after losing the player.
    pub anchor: Option<Vec2>,
    /// The A* path being walked while navigating or returning.
    pub path: Vec<Vec2>,
    pub path_index: usize,
    /// Motion used off the beat (paths and trail following).
    pub motion: Option<MotionTask>,
    pub last_replan: Option<Duration>,
    pub exhausted_at: Option<Duration>,
    /// Stopped in place because the player is standing still.
    pub frozen: bool,
}

impl PursuitGuard {
    pub fn new(route: PatrolRoute, max_energy: f32) -> Self {
        Self {
            beat: Beat::new(route),
            mode: PursuitMode::Patrol,
            energy: max_energy,
            anchor: None,
            path: Vec::new(),
            path_index: 0,
            motion: None,
            last_replan: None,
            exhausted_at: None,
            frozen: false,
        }
    }

    /// The motion currently driving the guard, whichever mode it is in.
    pub fn active_motion(&self) -> Option<&MotionTask> {
        match self.mode {
            PursuitMode::Patrol => self.beat.motion.as_ref(),
            _ => self.motion.as_ref(),
        }
    }

    pub fn active_motion_mut(&mut self) -> Option<&mut MotionTask> {
        match self.mode {
            PursuitMode::Patrol => self.beat.motion.as_mut(),
            _ => self.motion.as_mut(),
        }
    }

    fn set_mode(&mut self, id: usize, mode: PursuitMode) {
        if self.mode != mode {
            debug!(sentinel = id, from = %self.mode, to = %mode, "Pursuit mode change");
            self.mode = mode;
        }
    }

    fn grid(ctx: &TickContext<'_>) -> GridSpec {
        GridSpec {
            cell_size: ctx.tuning.pursuit.cell_size,
            clearance: ctx.tuning.guard.radius,
            max_iterations: ctx.tuning.pursuit.max_iterations,
        }
    }

    /// Replaces the current path with a fresh A* search and starts walking it.
    fn plan(&mut self, from: Vec2, to: Vec2, ctx: &TickContext<'_>) {
        self.path = find_path(ctx.field, from, to, &Self::grid(ctx)).into_waypoints();
        self.path_index = 0;
        self.motion = self
            .path
            .first()
            .map(|&waypoint| MotionTask::toward(from, waypoint, ctx.tuning.pursuit.speed, ctx.now));
    }

    /// Walks the current path. Returns `true` once its last waypoint has been reached.
    fn follow_path(&mut self, pose: &mut Pose, ctx: &TickContext<'_>) -> bool {
        let now = ctx.now;
        if let Some(motion) = self.motion {
            pose.position = motion.position_at(now);
            if let Some(heading) = motion.heading() {
                pose.base_angle = heading;
            }
        }
        let in_flight = self.motion.is_some_and(|m| !m.is_finished(now));

        let Some(&waypoint) = self.path.get(self.path_index) else {
            return true;
        };
        if in_flight {
            return false;
        }
        if pose.position.distance(waypoint) >= ctx.tuning.pursuit.waypoint_reached {
            // Knocked off course by a wall; walk the rest of the way.
            self.motion = Some(MotionTask::toward(pose.position, waypoint, ctx.tuning.pursuit.speed, now));
            return false;
        }

        self.path_index += 1;
        match self.path.get(self.path_index) {
            Some(&next) => {
                self.motion = Some(MotionTask::toward(pose.position, next, ctx.tuning.pursuit.speed, now));
                false
            }
            None => {
                self.motion = None;
                true
            }
        }
    }

    /// One tick of the pursuit state machine.
    pub fn update(&mut self, id: usize, pose: &mut Pose, ctx: &mut TickContext<'_>) {
        let now = ctx.now;
        let shared = ctx.tuning;
        let tuning = &shared.pursuit;
        let player = ctx.player;
        let hears = can_hear(pose.position, tuning.hearing_range, player.position);

        match self.mode {
            PursuitMode::Patrol => {
                if hears {
                    self.anchor = Some(pose.position);
                    self.beat.motion = None;
                    self.beat.paused_until = None;
                    ctx.trail.start(now);
                    self.plan(pose.position, player.position, ctx);
                    self.last_replan = Some(now);
                    self.set_mode(id, PursuitMode::Navigating);
                    info!(sentinel = id, "Pursuit guard heard the player");
                } else {
                    self.beat.step(pose, tuning.speed, ctx);
                }
            }
            PursuitMode::Navigating => {
                if self.follow_path(pose, ctx) {
                    self.frozen = false;
                    self.motion = None;
                    self.set_mode(id, PursuitMode::Following);
                } else if hears && self.last_replan.is_none_or(|last| now.saturating_sub(last) > tuning.replan_interval) {
                    self.plan(pose.position, player.position, ctx);
                    self.last_replan = Some(now);
                }
            }
            PursuitMode::Following => {
                if let Some(motion) = self.motion {
                    pose.position = motion.position_at(now);
                }
                if !player.moving {
                    if !self.frozen {
                        self.frozen = true;
                        self.motion = None;
                        debug!(sentinel = id, "Pursuit guard frozen, player is still");
                    }
                    return;
                }
                self.frozen = false;

                self.energy = (self.energy - tuning.drain_rate * ctx.dt.as_secs_f32()).max(0.0);
                if self.energy <= 0.0 {
                    self.motion = None;
                    self.exhausted_at = Some(now);
                    self.set_mode(id, PursuitMode::Exhausted);
                    return;
                }

                let in_flight = self.motion.is_some_and(|m| !m.is_finished(now));
                if in_flight {
                    return;
                }
                let Some(started) = ctx.trail.started_at() else {
                    return;
                };
                if let Some(target) = ctx.trail.position_at(now.saturating_sub(started)) {
                    if pose.position.distance(target) > tuning.trail_min_step {
                        let motion = MotionTask::toward(pose.position, target, tuning.speed, now);
                        if let Some(heading) = motion.heading() {
                            pose.base_angle = heading;
                        }
                        self.motion = Some(motion);
                    }
                }
            }
            PursuitMode::Exhausted => {
                self.energy = (self.energy + tuning.recharge_rate * ctx.dt.as_secs_f32()).min(tuning.max_energy);
                let rested = self
                    .exhausted_at
                    .is_none_or(|at| now.saturating_sub(at) >= tuning.exhaustion);
                if !rested {
                    return;
                }
                self.exhausted_at = None;
                if hears {
                    self.set_mode(id, PursuitMode::Following);
                } else {
                    let anchor = self.anchor.unwrap_or(pose.position);
                    self.plan(pose.position, anchor, ctx);
                    self.set_mode(id, PursuitMode::Returning);
                }
            }
            PursuitMode::Returning => {
                if hears {
                    self.plan(pose.position, player.position, ctx);
                    self.last_replan = Some(now);
                    self.set_mode(id, PursuitMode::Navigating);
                } else if self.follow_path(pose, ctx) {
                    self.energy = tuning.max_energy;
                    self.anchor = None;
                    self.path.clear();
                    self.motion = None;
                    self.set_mode(id, PursuitMode::Patrol);
                    self.beat.walk(pose.position, tuning.speed, now);
                    info!(sentinel = id, "Pursuit guard back on patrol");
                }
            }
        }
    }
}
