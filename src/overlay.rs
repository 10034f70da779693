//! Per-tick snapshot for renderers and HUDs.
//!
//! The session never draws; it builds a [`RenderFrame`] on request and whoever owns the
//! screen turns that into pixels.

use std::time::Duration;

use glam::Vec2;
use smallvec::SmallVec;

use crate::minigame::{MiniGamePhase, Slider};
use crate::puzzle::Endpoint;
use crate::sentinel::pursuit::PursuitMode;
use crate::sentinel::{SentinelId, SentinelKind};

/// What pressing interact would do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Document(usize),
    PuzzlePoint { pair: usize, endpoint: Endpoint },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFrame {
    pub position: Vec2,
    pub facing: f32,
    pub sprinting: bool,
    /// Sprint energy as a fraction of the maximum.
    pub energy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentinelFrame {
    pub id: SentinelId,
    pub kind: SentinelKind,
    pub position: Vec2,
    pub facing: f32,
    /// Fan polygon: the sentinel position followed by the ray endpoints.
    pub cone: Option<SmallVec<[Vec2; 64]>>,
    /// Pursuit guards only: energy as a fraction of the maximum.
    pub energy: Option<f32>,
    pub mode: Option<PursuitMode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentFrame {
    pub position: Vec2,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFrame {
    pub position: Vec2,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiniGameFrame {
    pub document: usize,
    pub phase: MiniGamePhase,
    pub progress: f32,
    pub revealed: String,
    pub slider: Option<Slider>,
    pub showing_miss: bool,
    pub remaining: Duration,
}

/// Bearings from the player, in radians, for the indicator ring drawn around them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compass {
    /// Every sentinel inside the threat radius.
    pub threats: SmallVec<[f32; 32]>,
    /// The nearest uncollected document inside the objective radius.
    pub objective: Option<f32>,
    /// The unlocked exit. Hidden once the vault door has opened.
    pub exit: Option<f32>,
    /// Puzzle endpoints still to visit: `A` of each idle pair, `B` of the live wire.
    pub puzzle_points: SmallVec<[f32; 8]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub level: usize,
    pub elapsed: Duration,
    pub documents_collected: usize,
    pub documents_total: usize,
    pub puzzle_remaining: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub player: PlayerFrame,
    pub sentinels: Vec<SentinelFrame>,
    pub documents: Vec<DocumentFrame>,
    pub exit: ExitFrame,
    pub prompt: Option<Prompt>,
    /// Wires to draw while the connection puzzle is up.
    pub puzzle_lines: Vec<(Vec2, Vec2)>,
    pub compass: Compass,
    /// Story text unlocked by the last document picked up.
    pub narrative: Option<String>,
    pub minigame: Option<MiniGameFrame>,
    pub hud: Hud,
}
