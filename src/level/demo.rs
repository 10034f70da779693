//! A small hand-drawn level for the headless binary and smoke tests.

use glam::Vec2;

use crate::config::Tuning;
use crate::constants::{DEMO_CELL_SIZE, DEMO_LAYOUT};
use crate::level::{LevelConfig, SentinelSpec};
use crate::map::parser::{LayoutError, LayoutParser};
use crate::map::raster::RasterCache;

pub const DEMO_RASTER: &str = "demo";

/// Pixel center of a layout cell.
pub fn cell_center(x: u32, y: u32) -> Vec2 {
    let size = DEMO_CELL_SIZE as f32;
    Vec2::new((x as f32 + 0.5) * size, (y as f32 + 0.5) * size)
}

/// The demo level and a raster source holding its map.
pub fn demo_level() -> Result<(LevelConfig, RasterCache), LayoutError> {
    let mask = LayoutParser::rasterize(&DEMO_LAYOUT[..], DEMO_CELL_SIZE)?;
    let (width, height) = (mask.width(), mask.height());
    let cache = RasterCache::new().with(DEMO_RASTER, mask);

    let config = LevelConfig {
        name: "Demo".into(),
        raster: DEMO_RASTER.into(),
        open_raster: None,
        width,
        height,
        player_spawn: cell_center(2, 2),
        sentinels: SentinelSpec::Patrols {
            paths: vec![vec![Vec2::new(480.0, 480.0), Vec2::new(920.0, 480.0)]],
        },
        documents: vec![cell_center(5, 11), cell_center(22, 2)],
        exit: cell_center(22, 12),
        puzzle: None,
        document_texts: vec![
            "Demo file one. Nothing to see here.".into(),
            "Demo file two. Still nothing to see.".into(),
        ],
        narratives: vec!["One down.".into(), "That is all of them.".into()],
        tuning: Tuning::default(),
    };

    Ok((config, cache))
}
