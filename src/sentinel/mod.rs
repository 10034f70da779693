//! Guards and cameras.
//!
//! A [`Sentinel`] is a pose plus a [`Behavior`] payload; the session drives every sentinel
//! once per tick through [`Sentinel::update`] and then asks it what it perceives.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::SmallRng;
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use tracing::trace;

use crate::config::Tuning;
use crate::map::raycast::Occlusion;
use crate::map::CollisionField;

pub mod motion;
pub mod patrol;
pub mod perception;
pub mod pursuit;

use motion::MotionTask;
use patrol::{Camera, PatrolGuard};
use perception::{Senses, Vision};
use pursuit::{PlayerTrail, PursuitGuard};

pub type SentinelId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SentinelKind {
    PatrolGuard,
    Camera,
    PursuitGuard,
}

/// Where a sentinel is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    /// Heading of travel (or the mount direction for cameras), in radians.
    pub base_angle: f32,
    /// Offset from `base_angle` the sentinel is currently looking at.
    pub look_angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, base_angle: f32) -> Self {
        Self {
            position,
            base_angle,
            look_angle: 0.0,
        }
    }

    pub fn facing(&self) -> f32 {
        self.base_angle + self.look_angle
    }
}

/// What the sentinels get to know about the player each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub moving: bool,
}

/// Shared state handed to every sentinel update.
pub struct TickContext<'a> {
    pub now: Duration,
    pub dt: Duration,
    pub field: &'a CollisionField,
    pub player: PlayerView,
    pub trail: &'a mut PlayerTrail,
    pub tuning: &'a Tuning,
    pub rng: &'a mut SmallRng,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Patrol(PatrolGuard),
    Camera(Camera),
    Pursuit(PursuitGuard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentinel {
    pub id: SentinelId,
    pub pose: Pose,
    pub behavior: Behavior,
}

impl Sentinel {
    pub fn kind(&self) -> SentinelKind {
        match self.behavior {
            Behavior::Patrol(_) => SentinelKind::PatrolGuard,
            Behavior::Camera(_) => SentinelKind::Camera,
            Behavior::Pursuit(_) => SentinelKind::PursuitGuard,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pose.position
    }

    pub fn facing(&self) -> f32 {
        self.pose.facing()
    }

    /// Vision and hearing for this sentinel's kind.
    ///
    /// Cameras see through walls and never hear; pursuit guards are blind.
    pub fn senses(&self, tuning: &Tuning) -> Senses {
        match self.behavior {
            Behavior::Patrol(_) => Senses {
                vision: Some(Vision::new(
                    tuning.guard.vision_range,
                    tuning.guard.vision_angle,
                    Occlusion::Walls,
                )),
                hearing_range: Some(tuning.guard.hearing_range),
            },
            Behavior::Camera(_) => Senses {
                vision: Some(Vision::new(
                    tuning.camera.vision_range,
                    tuning.camera.vision_angle,
                    Occlusion::None,
                )),
                hearing_range: None,
            },
            Behavior::Pursuit(_) => Senses {
                vision: None,
                hearing_range: Some(tuning.pursuit.hearing_range),
            },
        }
    }

    pub fn can_see(&self, field: &CollisionField, target: Vec2, tuning: &Tuning) -> bool {
        self.senses(tuning).vision.is_some_and(|vision| {
            perception::can_see(field, self.pose.position, self.facing(), &vision, target, tuning.vision.sight_step)
        })
    }

    pub fn can_hear(&self, target: Vec2, tuning: &Tuning) -> bool {
        self.senses(tuning)
            .hearing_range
            .is_some_and(|range| perception::can_hear(self.pose.position, range, target))
    }

    /// The vision cone polygon for rendering, if this sentinel has vision.
    pub fn cone(&self, field: &CollisionField, tuning: &Tuning) -> Option<SmallVec<[Vec2; 64]>> {
        let vision = self.senses(tuning).vision?;
        Some(perception::cone_polygon(
            field,
            self.pose.position,
            self.facing(),
            &vision,
            tuning.vision.cone_rays,
            tuning.vision.ray_step,
        ))
    }

    /// The motion currently moving this sentinel, if any.
    pub fn motion(&self) -> Option<&MotionTask> {
        match &self.behavior {
            Behavior::Patrol(guard) => guard.beat.motion.as_ref(),
            Behavior::Camera(_) => None,
            Behavior::Pursuit(guard) => guard.active_motion(),
        }
    }

    fn motion_mut(&mut self) -> Option<&mut MotionTask> {
        match &mut self.behavior {
            Behavior::Patrol(guard) => guard.beat.motion.as_mut(),
            Behavior::Camera(_) => None,
            Behavior::Pursuit(guard) => guard.active_motion_mut(),
        }
    }

    /// Pushes a guard out of any wall it overlaps and re-issues its motion from there.
    ///
    /// Cameras are mounted and never move. Returns whether the guard was moved.
    pub fn resolve_walls(&mut self, field: &CollisionField, tuning: &Tuning, now: Duration) -> bool {
        if matches!(self.behavior, Behavior::Camera(_)) {
            return false;
        }
        let Some(push) = field.push_back(
            self.pose.position,
            tuning.guard.radius,
            tuning.player.push_back_samples,
            tuning.player.push_back_strength,
        ) else {
            return false;
        };

        self.pose.position += push;
        trace!(sentinel = self.id, push = ?push, "Guard pushed out of wall");
        let position = self.pose.position;
        if let Some(motion) = self.motion_mut() {
            if !motion.is_finished(now) {
                *motion = motion.reissued(position, now);
            }
        }
        true
    }

    /// Runs this sentinel's controller for one tick.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        let id = self.id;
        match &mut self.behavior {
            Behavior::Patrol(guard) => guard.update(id, &mut self.pose, ctx),
            Behavior::Camera(camera) => camera.update(&mut self.pose, ctx),
            Behavior::Pursuit(guard) => guard.update(id, &mut self.pose, ctx),
        }
    }

    /// Pursuit state, for the guards that have it.
    pub fn pursuit(&self) -> Option<&PursuitGuard> {
        match &self.behavior {
            Behavior::Pursuit(guard) => Some(guard),
            _ => None,
        }
    }

    pub fn patrol(&self) -> Option<&PatrolGuard> {
        match &self.behavior {
            Behavior::Patrol(guard) => Some(guard),
            _ => None,
        }
    }
}
