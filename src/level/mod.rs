//! Level configuration and sentinel spawning.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Tuning;
use crate::error::LevelError;
use crate::sentinel::patrol::{Camera, PatrolGuard, PatrolRoute};
use crate::sentinel::pursuit::PursuitGuard;
use crate::sentinel::{Behavior, Pose, Sentinel};

pub mod builtin;
pub mod demo;

pub use builtin::{BuiltinLevel, LevelCatalog};

/// A fixed camera mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec2,
    /// Mount direction, in radians.
    pub facing: f32,
}

/// Which sentinels a level spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SentinelSpec {
    /// Two sweeping cameras per pose.
    Cameras { poses: Vec<CameraPose> },
    /// Two guards per path, starting from opposite ends.
    Patrols { paths: Vec<Vec<Vec2>> },
    /// One pursuit guard per path.
    Pursuit { paths: Vec<Vec<Vec2>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuzzlePairConfig {
    pub a: Vec2,
    pub b: Vec2,
}

/// The second phase of a level: the connection puzzle and the final exit it unlocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub pairs: Vec<PuzzlePairConfig>,
    pub exit: Vec2,
}

/// Everything needed to build a level instance. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// Key of the map raster in the raster source.
    pub raster: String,
    /// Raster swapped in when the door to the second phase opens.
    #[serde(default)]
    pub open_raster: Option<String>,
    pub width: u32,
    pub height: u32,
    pub player_spawn: Vec2,
    pub sentinels: SentinelSpec,
    pub documents: Vec<Vec2>,
    pub exit: Vec2,
    #[serde(default)]
    pub puzzle: Option<PuzzleConfig>,
    /// Text decrypted by the mini-game, one per document.
    #[serde(default)]
    pub document_texts: Vec<String>,
    /// Story beat shown after each document, one per document.
    #[serde(default)]
    pub narratives: Vec<String>,
    #[serde(default)]
    pub tuning: Tuning,
}

impl LevelConfig {
    /// Parses and validates a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| Err(LevelError::InvalidConfig(format!("{}: {reason}", self.name)));

        if self.width == 0 || self.height == 0 {
            return invalid("map has zero area".into());
        }
        if self.documents.is_empty() {
            return invalid("no documents".into());
        }
        match &self.sentinels {
            SentinelSpec::Cameras { poses } if poses.is_empty() => return invalid("no camera poses".into()),
            SentinelSpec::Patrols { paths } | SentinelSpec::Pursuit { paths } => {
                if paths.is_empty() {
                    return invalid("no patrol paths".into());
                }
                if let Some(index) = paths.iter().position(Vec::is_empty) {
                    return invalid(format!("patrol path {index} is empty"));
                }
            }
            _ => {}
        }
        if let Some(puzzle) = &self.puzzle {
            if puzzle.pairs.is_empty() {
                return invalid("puzzle has no pairs".into());
            }
            if self.open_raster.is_none() {
                return invalid("puzzle without an opened-door raster".into());
            }
        } else if self.is_advanced() {
            return invalid("pursuit levels need a connection puzzle".into());
        }
        self.tuning.validate()
    }

    /// Whether this level runs the pursuit guards and the two-phase exit.
    pub fn is_advanced(&self) -> bool {
        matches!(self.sentinels, SentinelSpec::Pursuit { .. })
    }

    /// Text the mini-game decrypts for `document`.
    pub fn document_text(&self, document: usize) -> &str {
        self.document_texts.get(document).map(String::as_str).unwrap_or("")
    }

    pub fn narrative(&self, document: usize) -> Option<&str> {
        self.narratives.get(document).map(String::as_str)
    }

    /// Builds a fresh set of sentinels for this level.
    pub fn spawn_sentinels(&self, rng: &mut SmallRng) -> Vec<Sentinel> {
        let tuning = &self.tuning;
        let mut sentinels = Vec::new();
        let mut push = |pose: Pose, behavior: Behavior| {
            let id = sentinels.len();
            sentinels.push(Sentinel { id, pose, behavior });
        };

        match &self.sentinels {
            SentinelSpec::Cameras { poses } => {
                for pose in poses {
                    for _ in 0..2 {
                        let speed = random_speed(rng, tuning.camera.look_speed);
                        push(Pose::new(pose.position, pose.facing), Behavior::Camera(Camera::new(speed)));
                    }
                }
            }
            SentinelSpec::Patrols { paths } => {
                for path in paths.iter().filter(|path| !path.is_empty()) {
                    let last = path.len() - 1;

                    let speed = random_speed(rng, tuning.guard.look_speed);
                    // Both guards stand on an end waypoint, so they start out walking to its neighbour.
                    let route = PatrolRoute::new(path.clone(), 1, true);
                    let facing = heading(path[0], path.get(1).copied().unwrap_or(path[0]));
                    push(Pose::new(path[0], facing), Behavior::Patrol(PatrolGuard::new(route, speed)));

                    let speed = random_speed(rng, tuning.guard.look_speed);
                    let route = PatrolRoute::new(path.clone(), last.saturating_sub(1), false);
                    let previous = path.get(last.wrapping_sub(1)).copied().unwrap_or(path[last]);
                    let facing = heading(path[last], previous);
                    push(Pose::new(path[last], facing), Behavior::Patrol(PatrolGuard::new(route, speed)));
                }
            }
            SentinelSpec::Pursuit { paths } => {
                for path in paths.iter().filter(|path| !path.is_empty()) {
                    let route = PatrolRoute::new(path.clone(), 1, true);
                    let facing = heading(path[0], path.get(1).copied().unwrap_or(path[0]));
                    push(
                        Pose::new(path[0], facing),
                        Behavior::Pursuit(PursuitGuard::new(route, tuning.pursuit.max_energy)),
                    );
                }
            }
        }

        debug!(level = %self.name, count = sentinels.len(), "Sentinels spawned");
        sentinels
    }
}

fn random_speed(rng: &mut SmallRng, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

fn heading(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}
