#![allow(dead_code)]

use std::time::Duration;

use glam::Vec2;
use infiltrator::config::Tuning;
use infiltrator::constants::LOOP_TIME;
use infiltrator::input::{Buttons, InputSnapshot};
use infiltrator::level::{LevelConfig, SentinelSpec};
use infiltrator::map::parser::LayoutParser;
use infiltrator::map::raster::RasterCache;
use infiltrator::map::CollisionField;
use infiltrator::minigame::MiniGamePhase;
use infiltrator::sentinel::pursuit::PlayerTrail;
use infiltrator::sentinel::{PlayerView, TickContext};
use infiltrator::session::GameSession;
use rand::rngs::SmallRng;
use rand::SeedableRng;

pub const CELL: u32 = 20;

/// A walled room, 30 cells wide and 12 tall.
pub const ROOM: [&str; 12] = [
    "##############################",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "#............................#",
    "##############################",
];

/// The same room split by a wall with a gap at the bottom.
pub const SPLIT_ROOM: [&str; 12] = [
    "##############################",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#.............#..............#",
    "#............................#",
    "#............................#",
    "##############################",
];

pub fn field_from(layout: &[&str], cell_size: u32) -> CollisionField {
    CollisionField::new(LayoutParser::rasterize(layout, cell_size).expect("layout should rasterize"))
}

pub fn room() -> CollisionField {
    field_from(&ROOM, CELL)
}

/// Pixel center of a layout cell at [`CELL`] pixels per cell.
pub fn cell(x: u32, y: u32) -> Vec2 {
    Vec2::new((x as f32 + 0.5) * CELL as f32, (y as f32 + 0.5) * CELL as f32)
}

/// Owns everything a [`TickContext`] borrows.
pub struct Harness {
    pub field: CollisionField,
    pub trail: PlayerTrail,
    pub tuning: Tuning,
    pub rng: SmallRng,
    pub now: Duration,
}

impl Harness {
    pub fn new(field: CollisionField) -> Self {
        Self {
            field,
            trail: PlayerTrail::default(),
            tuning: Tuning::default(),
            rng: SmallRng::seed_from_u64(7),
            now: Duration::ZERO,
        }
    }

    /// Advances the clock one loop tick and hands out a context for it.
    pub fn tick(&mut self, player: Vec2, moving: bool) -> TickContext<'_> {
        self.now += LOOP_TIME;
        TickContext {
            now: self.now,
            dt: LOOP_TIME,
            field: &self.field,
            player: PlayerView { position: player, moving },
            trail: &mut self.trail,
            tuning: &self.tuning,
            rng: &mut self.rng,
        }
    }
}

/// A one-level config over `layout`, with guards parked far from the spawn.
pub fn level(layout: &[&str], sentinels: SentinelSpec, documents: Vec<Vec2>, exit: Vec2) -> (LevelConfig, RasterCache) {
    let mask = LayoutParser::rasterize(layout, CELL).expect("layout should rasterize");
    let (width, height) = (mask.width(), mask.height());
    let config = LevelConfig {
        name: "Test".into(),
        raster: "test".into(),
        open_raster: None,
        width,
        height,
        player_spawn: cell(2, 2),
        sentinels,
        documents,
        exit,
        puzzle: None,
        document_texts: vec!["The quick brown fox".into()],
        narratives: vec!["Got it.".into()],
        tuning: Tuning::default(),
    };
    (config, RasterCache::new().with("test", mask))
}

/// A sentinel spec that stays well out of the way of the spawn in [`ROOM`].
pub fn distant_patrol() -> SentinelSpec {
    SentinelSpec::Patrols {
        paths: vec![vec![cell(27, 9)]],
    }
}

pub fn session(config: LevelConfig, rasters: RasterCache) -> GameSession {
    GameSession::with_level(config, rasters, 42).expect("level should load")
}

/// Runs `ticks` loop ticks with the same input.
pub fn run(session: &mut GameSession, input: &InputSnapshot, ticks: usize) {
    for _ in 0..ticks {
        session.tick(LOOP_TIME, input);
    }
}

/// Plays the open mini-game to completion: types until a checkpoint, then stops each slider
/// near the middle of the track.
pub fn solve_minigame(session: &mut GameSession) {
    let tuning = session.config().tuning.minigame.clone();
    for _ in 0..3000 {
        let Some(game) = session.minigame() else {
            return;
        };
        let centered = (game.slider().position - tuning.track_width / 2.0).abs() <= tuning.tolerance / 2.0;
        let input = if game.phase() == MiniGamePhase::Typing {
            InputSnapshot::idle().with_keystrokes(3)
        } else if game.phase().is_slider() && !game.is_showing_miss() && centered {
            InputSnapshot::idle().with_buttons(Buttons::INTERACT)
        } else {
            InputSnapshot::idle()
        };
        session.tick(LOOP_TIME, &input);
    }
    panic!("mini-game did not finish");
}
