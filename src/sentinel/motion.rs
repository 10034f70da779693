use std::time::Duration;

use glam::Vec2;

/// Upper bound on a single move, for speeds too small to represent.
pub const MAX_MOTION_DURATION: Duration = Duration::from_secs(3600);

/// A straight-line, constant-speed move that is evaluated against the session clock.
///
/// Sentinels hold at most one; issuing a new task replaces (and so cancels) the old one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTask {
    pub from: Vec2,
    pub target: Vec2,
    pub start: Duration,
    pub duration: Duration,
    /// Speed the task was issued at, kept so the move can be re-issued after a push-back.
    pub speed: f32,
}

impl MotionTask {
    /// A move from `from` to `target` at `speed` pixels per second, starting at `now`.
    pub fn toward(from: Vec2, target: Vec2, speed: f32, now: Duration) -> Self {
        let distance = from.distance(target);
        let duration = if speed > 0.0 && distance > 0.0 {
            Duration::try_from_secs_f32(distance / speed).unwrap_or(MAX_MOTION_DURATION)
        } else {
            Duration::ZERO
        };
        Self {
            from,
            target,
            start: now,
            duration,
            speed,
        }
    }

    /// Linear interpolation of the move at `now`, clamped to its endpoints.
    pub fn position_at(&self, now: Duration) -> Vec2 {
        if self.duration.is_zero() {
            return self.target;
        }
        let elapsed = now.saturating_sub(self.start);
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.from.lerp(self.target, t)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }

    /// Direction of travel in radians, or `None` for a move with no length.
    pub fn heading(&self) -> Option<f32> {
        let delta = self.target - self.from;
        (delta.length_squared() > f32::EPSILON).then(|| delta.y.atan2(delta.x))
    }

    /// The same move, restarted from `from` at the original speed.
    pub fn reissued(&self, from: Vec2, now: Duration) -> Self {
        Self::toward(from, self.target, self.speed, now)
    }
}
