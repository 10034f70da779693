//! The player body: movement, sprint energy and wall push-back.

use std::time::Duration;

use glam::Vec2;
use tracing::trace;

use crate::config::PlayerTuning;
use crate::map::CollisionField;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    /// Heading of the last movement, in radians.
    pub facing: f32,
    pub moving: bool,
    pub sprinting: bool,
    pub energy: f32,
    pub documents: usize,
}

impl Player {
    pub fn new(position: Vec2, max_energy: f32) -> Self {
        Self {
            position,
            facing: 0.0,
            moving: false,
            sprinting: false,
            energy: max_energy,
            documents: 0,
        }
    }

    /// Moves the player one tick along `direction` (already normalized), spending or
    /// recovering sprint energy, then pushes the body out of any wall it overlaps.
    ///
    /// Returns `Some(moving)` when the moving flag changed this tick.
    pub fn step(
        &mut self,
        direction: Vec2,
        sprint_held: bool,
        dt: Duration,
        field: &CollisionField,
        tuning: &PlayerTuning,
    ) -> Option<bool> {
        let seconds = dt.as_secs_f32();
        let moving = direction != Vec2::ZERO;

        self.sprinting = sprint_held && self.energy >= tuning.sprint_threshold;
        if self.sprinting {
            if moving {
                self.energy = (self.energy - tuning.drain_rate * seconds).max(0.0);
            }
        } else {
            self.energy = (self.energy + tuning.recharge_rate * seconds).min(tuning.max_energy);
        }

        if moving {
            let speed = if self.sprinting {
                tuning.sprint_speed
            } else {
                tuning.walk_speed
            };
            self.position += direction * speed * seconds;
            self.facing = direction.y.atan2(direction.x);
        }

        if let Some(push) = field.push_back(
            self.position,
            tuning.radius,
            tuning.push_back_samples,
            tuning.push_back_strength,
        ) {
            trace!(push = ?push, "Player pushed out of wall");
            self.position += push;
        }

        let changed = self.moving != moving;
        self.moving = moving;
        changed.then_some(moving)
    }
}
