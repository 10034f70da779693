//! Runtime tuning.
//!
//! Every threshold, speed and rate the engine uses lives here. The defaults come from
//! [`crate::constants`]; a level pack can override any subset through JSON since every
//! struct is `#[serde(default)]`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::LevelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub vision: VisionTuning,
    pub guard: GuardTuning,
    pub camera: CameraTuning,
    pub pursuit: PursuitTuning,
    pub proximity: ProximityTuning,
    pub minigame: MiniGameTuning,
    pub puzzle_time_limit: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            vision: VisionTuning::default(),
            guard: GuardTuning::default(),
            camera: CameraTuning::default(),
            pursuit: PursuitTuning::default(),
            proximity: ProximityTuning::default(),
            minigame: MiniGameTuning::default(),
            puzzle_time_limit: PUZZLE_TIME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub max_energy: f32,
    pub sprint_threshold: f32,
    pub drain_rate: f32,
    pub recharge_rate: f32,
    pub dead_zone: f32,
    pub push_back_samples: usize,
    pub push_back_strength: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            walk_speed: PLAYER_WALK_SPEED,
            sprint_speed: PLAYER_SPRINT_SPEED,
            max_energy: MAX_SPRINT_ENERGY,
            sprint_threshold: SPRINT_THRESHOLD,
            drain_rate: SPRINT_DRAIN_RATE,
            recharge_rate: SPRINT_RECHARGE_RATE,
            dead_zone: INPUT_DEAD_ZONE,
            push_back_samples: PUSH_BACK_SAMPLES,
            push_back_strength: PUSH_BACK_STRENGTH,
        }
    }
}

/// Ray marching resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionTuning {
    pub cone_rays: usize,
    pub ray_step: f32,
    pub sight_step: f32,
}

impl Default for VisionTuning {
    fn default() -> Self {
        Self {
            cone_rays: CONE_RAYS,
            ray_step: RAY_STEP,
            sight_step: SIGHT_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardTuning {
    pub radius: f32,
    pub patrol_speed: f32,
    pub alert_speed: f32,
    pub vision_range: f32,
    /// Full cone width, in degrees.
    pub vision_angle: f32,
    pub hearing_range: f32,
    pub pause_chance: f64,
    pub pause_duration: Duration,
    pub walking_look_limit: f32,
    pub paused_look_limit: f32,
    pub look_speed: (f32, f32),
    pub hearing_turn_rate: f32,
    pub reverse_threshold: f32,
}

impl Default for GuardTuning {
    fn default() -> Self {
        Self {
            radius: GUARD_RADIUS,
            patrol_speed: GUARD_PATROL_SPEED,
            alert_speed: GUARD_ALERT_SPEED,
            vision_range: GUARD_VISION_RANGE,
            vision_angle: GUARD_VISION_ANGLE,
            hearing_range: GUARD_HEARING_RANGE,
            pause_chance: PAUSE_CHANCE,
            pause_duration: PAUSE_DURATION,
            walking_look_limit: LOOK_LIMIT_WALKING,
            paused_look_limit: LOOK_LIMIT_SWEEP,
            look_speed: GUARD_LOOK_SPEED,
            hearing_turn_rate: HEARING_TURN_RATE,
            reverse_threshold: REVERSE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub vision_range: f32,
    /// Full cone width, in degrees.
    pub vision_angle: f32,
    pub sweep_limit: f32,
    pub look_speed: (f32, f32),
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            vision_range: GUARD_VISION_RANGE,
            vision_angle: CAMERA_VISION_ANGLE,
            sweep_limit: LOOK_LIMIT_SWEEP,
            look_speed: CAMERA_LOOK_SPEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitTuning {
    pub speed: f32,
    pub hearing_range: f32,
    pub catch_range: f32,
    pub max_energy: f32,
    pub drain_rate: f32,
    pub recharge_rate: f32,
    pub exhaustion: Duration,
    pub replan_interval: Duration,
    pub trail_sample_interval: Duration,
    pub waypoint_reached: f32,
    pub trail_min_step: f32,
    pub cell_size: f32,
    pub max_iterations: usize,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            speed: PURSUIT_SPEED,
            hearing_range: PURSUIT_HEARING_RANGE,
            catch_range: PURSUIT_CATCH_RANGE,
            max_energy: MAX_GUARD_ENERGY,
            drain_rate: GUARD_ENERGY_DRAIN_RATE,
            recharge_rate: GUARD_ENERGY_RECHARGE_RATE,
            exhaustion: EXHAUSTION_DURATION,
            replan_interval: REPLAN_INTERVAL,
            trail_sample_interval: TRAIL_SAMPLE_INTERVAL,
            waypoint_reached: WAYPOINT_REACHED,
            trail_min_step: TRAIL_MIN_STEP,
            cell_size: PATHFINDING_CELL_SIZE,
            max_iterations: PATHFINDING_MAX_ITERATIONS,
        }
    }
}

/// Interaction distances, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityTuning {
    pub document: f32,
    pub exit: f32,
    pub phase_door: f32,
    pub puzzle_point: f32,
    /// Radius of the threat ring around the player.
    pub threat_indicator: f32,
    pub objective_indicator: f32,
}

impl Default for ProximityTuning {
    fn default() -> Self {
        Self {
            document: DOCUMENT_INTERACT_RANGE,
            exit: EXIT_RANGE,
            phase_door: PHASE_DOOR_RANGE,
            puzzle_point: PUZZLE_POINT_RANGE,
            threat_indicator: THREAT_INDICATOR_RANGE,
            objective_indicator: OBJECTIVE_INDICATOR_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniGameTuning {
    pub time_limit: Duration,
    pub chars_required: u32,
    pub interstitial: Duration,
    pub miss_display: Duration,
    pub track_width: f32,
    pub slider_speed: f32,
    pub tolerance: f32,
}

impl Default for MiniGameTuning {
    fn default() -> Self {
        Self {
            time_limit: MINIGAME_TIME_LIMIT,
            chars_required: MINIGAME_CHARS_REQUIRED,
            interstitial: MINIGAME_INTERSTITIAL,
            miss_display: MINIGAME_MISS_DISPLAY,
            track_width: SLIDER_TRACK_WIDTH,
            slider_speed: SLIDER_SPEED,
            tolerance: SLIDER_TOLERANCE,
        }
    }
}

impl Tuning {
    /// Checks the relationships the gameplay depends on.
    pub fn validate(&self) -> Result<(), LevelError> {
        let p = &self.proximity;
        if !(self.pursuit.catch_range < p.document && p.document < p.exit) {
            return Err(LevelError::InvalidConfig(format!(
                "proximity must satisfy catch < interact < exit, got {} / {} / {}",
                self.pursuit.catch_range, p.document, p.exit
            )));
        }
        if self.minigame.chars_required == 0 {
            return Err(LevelError::InvalidConfig("mini-game needs at least one character".into()));
        }
        if self.minigame.tolerance * 2.0 >= self.minigame.track_width {
            return Err(LevelError::InvalidConfig("slider tolerance covers the whole track".into()));
        }
        for (name, (min, max)) in [("guard", self.guard.look_speed), ("camera", self.camera.look_speed)] {
            if !(min > 0.0 && min <= max) {
                return Err(LevelError::InvalidConfig(format!("{name} look speed range is invalid")));
            }
        }
        let speeds = [
            ("player walk", self.player.walk_speed),
            ("player sprint", self.player.sprint_speed),
            ("guard patrol", self.guard.patrol_speed),
            ("guard alert", self.guard.alert_speed),
            ("pursuit", self.pursuit.speed),
            ("slider", self.minigame.slider_speed),
        ];
        for (name, speed) in speeds {
            if !(speed.is_finite() && speed >= MIN_SPEED) {
                return Err(LevelError::InvalidConfig(format!(
                    "{name} speed must be finite and at least {MIN_SPEED}, got {speed}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.guard.pause_chance) {
            return Err(LevelError::InvalidConfig(format!(
                "pause chance must be within [0, 1], got {}",
                self.guard.pause_chance
            )));
        }
        if self.pursuit.cell_size <= 0.0 || self.vision.ray_step <= 0.0 || self.vision.sight_step <= 0.0 {
            return Err(LevelError::InvalidConfig("step sizes must be positive".into()));
        }
        Ok(())
    }
}
