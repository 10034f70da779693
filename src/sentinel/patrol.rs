//! Waypoint patrols for guards and sweeps for cameras.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use crate::sentinel::motion::MotionTask;
use crate::sentinel::perception::{bearing, can_hear, wrap_angle};
use crate::sentinel::{Pose, TickContext};

/// A ping-pong walk over a fixed list of waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vec2>,
    index: usize,
    forward: bool,
}

impl PatrolRoute {
    /// A route heading toward `waypoints[index]`.
    ///
    /// `index` is clamped into the route; an empty route parks on `Vec2::ZERO`.
    pub fn new(waypoints: Vec<Vec2>, index: usize, forward: bool) -> Self {
        let index = index.min(waypoints.len().saturating_sub(1));
        Self {
            waypoints,
            index,
            forward,
        }
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// The waypoint currently being walked toward.
    pub fn current(&self) -> Vec2 {
        self.waypoints.get(self.index).copied().unwrap_or(Vec2::ZERO)
    }

    /// Steps to the next waypoint, bouncing off either end.
    pub fn advance(&mut self) {
        let len = self.waypoints.len();
        if len < 2 {
            return;
        }
        if self.forward {
            if self.index + 1 >= len {
                self.index = len - 2;
                self.forward = false;
            } else {
                self.index += 1;
            }
        } else if self.index == 0 {
            self.index = 1;
            self.forward = true;
        } else {
            self.index -= 1;
        }
    }

    /// Turns around: heads back to the waypoint before the current one.
    pub fn reverse(&mut self) {
        let len = self.waypoints.len();
        if len < 2 {
            return;
        }
        self.index = if self.forward {
            self.index.saturating_sub(1)
        } else {
            (self.index + 1).min(len - 1)
        };
        self.forward = !self.forward;
    }
}

/// Oscillation of a sentinel's look angle around its heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaze {
    /// Radians per second.
    pub speed: f32,
    /// `1.0` while turning one way, `-1.0` while turning back.
    pub direction: f32,
}

impl Gaze {
    pub fn new(speed: f32) -> Self {
        Self { speed, direction: 1.0 }
    }

    /// Advances `look_angle` and flips direction once it passes `limit` either side.
    pub fn sweep(&mut self, look_angle: &mut f32, limit: f32, dt: Duration) {
        *look_angle += self.speed * self.direction * dt.as_secs_f32();
        if *look_angle > limit {
            self.direction = -1.0;
        } else if *look_angle < -limit {
            self.direction = 1.0;
        }
    }
}

/// Turns `current` toward `target` by at most `max_step`, taking the short way around.
pub fn turn_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = wrap_angle(target - current);
    if diff.abs() > max_step {
        current + diff.signum() * max_step
    } else {
        target
    }
}

/// The walking part of a patrol, shared by patrol guards and pursuit guards on their beat.
#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    pub route: PatrolRoute,
    pub motion: Option<MotionTask>,
    /// Set while standing still at a waypoint.
    pub paused_until: Option<Duration>,
}

impl Beat {
    pub fn new(route: PatrolRoute) -> Self {
        Self {
            route,
            motion: None,
            paused_until: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_until.is_some()
    }

    /// Starts walking from `from` toward the current waypoint, replacing any motion.
    pub fn walk(&mut self, from: Vec2, speed: f32, now: Duration) {
        self.paused_until = None;
        self.motion = Some(MotionTask::toward(from, self.route.current(), speed, now));
    }

    /// Moves the pose along the beat: interpolates the motion, rolls for a pause on arrival
    /// and moves on once the pause is over.
    pub fn step(&mut self, pose: &mut Pose, speed: f32, ctx: &mut TickContext<'_>) {
        let now = ctx.now;
        if let Some(until) = self.paused_until {
            if now < until {
                return;
            }
            self.route.advance();
            self.walk(pose.position, speed, now);
        }

        let Some(motion) = self.motion else {
            self.walk(pose.position, speed, now);
            return;
        };

        pose.position = motion.position_at(now);
        if !motion.is_finished(now) {
            if let Some(heading) = motion.heading() {
                pose.base_angle = heading;
            }
            return;
        }

        self.motion = None;
        let pause = &ctx.tuning.guard;
        if ctx.rng.random_bool(pause.pause_chance.clamp(0.0, 1.0)) {
            trace!(waypoint = self.route.index(), "Pausing at waypoint");
            self.paused_until = Some(now + pause.pause_duration);
        } else {
            self.route.advance();
            self.walk(pose.position, speed, now);
        }
    }

    /// Re-issues an in-flight motion at a new speed from the current position.
    pub fn change_speed(&mut self, from: Vec2, speed: f32, now: Duration) {
        if let Some(motion) = self.motion.as_mut() {
            if !motion.is_finished(now) {
                *motion = MotionTask::toward(from, motion.target, speed, now);
            }
        }
    }
}

/// A guard walking a patrol route, with vision and hearing.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolGuard {
    pub beat: Beat,
    pub gaze: Gaze,
    /// Currently hearing the player.
    pub alerted: bool,
    /// Already turned around for the current hearing event.
    pub redirected: bool,
}

impl PatrolGuard {
    pub fn new(route: PatrolRoute, look_speed: f32) -> Self {
        Self {
            beat: Beat::new(route),
            gaze: Gaze::new(look_speed),
            alerted: false,
            redirected: false,
        }
    }

    pub fn speed(&self, ctx: &TickContext<'_>) -> f32 {
        if self.alerted {
            ctx.tuning.guard.alert_speed
        } else {
            ctx.tuning.guard.patrol_speed
        }
    }

    /// One tick: walk the beat, then react to hearing or look around.
    pub fn update(&mut self, id: usize, pose: &mut Pose, ctx: &mut TickContext<'_>) {
        let speed = self.speed(ctx);
        self.beat.step(pose, speed, ctx);

        let tuning = &ctx.tuning.guard;
        let hears = can_hear(pose.position, tuning.hearing_range, ctx.player.position);

        if hears {
            if !self.alerted {
                self.alerted = true;
                debug!(sentinel = id, "Guard heard the player");
                self.beat.change_speed(pose.position, tuning.alert_speed, ctx.now);
            }

            let target_look = wrap_angle(bearing(pose.position, ctx.player.position) - pose.base_angle);
            if !self.redirected && target_look.abs() > tuning.reverse_threshold {
                self.redirected = true;
                self.beat.route.reverse();
                self.beat.walk(pose.position, tuning.alert_speed, ctx.now);
                debug!(sentinel = id, waypoint = self.beat.route.index(), "Sound from behind, reversing patrol");
            }

            let max_step = tuning.hearing_turn_rate * ctx.dt.as_secs_f32();
            pose.look_angle = turn_toward(pose.look_angle, target_look, max_step);
        } else {
            self.redirected = false;
            if self.alerted {
                self.alerted = false;
                debug!(sentinel = id, "Guard lost the sound");
                self.beat.change_speed(pose.position, tuning.patrol_speed, ctx.now);
            }

            let limit = if self.beat.is_paused() {
                tuning.paused_look_limit
            } else {
                tuning.walking_look_limit
            };
            self.gaze.sweep(&mut pose.look_angle, limit, ctx.dt);
        }
    }
}

/// A fixed camera sweeping a full rotation. Cameras never hear.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub gaze: Gaze,
}

impl Camera {
    pub fn new(sweep_speed: f32) -> Self {
        Self {
            gaze: Gaze::new(sweep_speed),
        }
    }

    pub fn update(&mut self, pose: &mut Pose, ctx: &TickContext<'_>) {
        self.gaze.sweep(&mut pose.look_angle, ctx.tuning.camera.sweep_limit, ctx.dt);
    }
}
