//! Wall queries over a rasterized opacity mask.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::constants::{CLEARANCE_SAMPLES, WALL_ALPHA_THRESHOLD};
use crate::error::MapError;

/// The alpha channel of a level raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpacityMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl OpacityMask {
    /// Builds a mask from a bare alpha buffer.
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<u8>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(MapError::SizeMismatch {
                width,
                height,
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self { width, height, alpha })
    }

    /// Builds a mask from an RGBA8 pixel buffer, keeping only the alpha channel.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(MapError::SizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let alpha = rgba.chunks_exact(4).map(|px| px[3]).collect();
        Ok(Self { width, height, alpha })
    }

    /// A mask where every pixel has the same alpha.
    pub fn filled(width: u32, height: u32, alpha: u8) -> Result<Self, MapError> {
        Self::from_alpha(width, height, vec![alpha; width as usize * height as usize])
    }

    /// Paints a rectangle, clipped to the mask bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, alpha: u8) {
        let x_start = x.min(self.width) as usize;
        let x_end = x.saturating_add(width).min(self.width) as usize;
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(self.height)..y_end {
            let start = row as usize * self.width as usize;
            self.alpha[start + x_start..start + x_end].fill(alpha);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at a pixel, or `None` outside the mask.
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.alpha.get(y as usize * self.width as usize + x as usize).copied()
    }
}

/// Answers "is this a wall" for every consumer in the engine.
///
/// A field without a mask (raster missing or not loaded yet) reports walls everywhere, so
/// nothing can move, see or path through an unknown map.
#[derive(Debug, Clone, Default)]
pub struct CollisionField {
    mask: Option<OpacityMask>,
}

impl CollisionField {
    pub fn new(mask: OpacityMask) -> Self {
        Self { mask: Some(mask) }
    }

    /// A field with no raster behind it.
    pub fn unloaded() -> Self {
        Self { mask: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.mask.is_some()
    }

    /// Pixel dimensions, if loaded.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.mask.as_ref().map(|m| (m.width, m.height))
    }

    /// Whether the pixel containing `(x, y)` blocks movement and sight.
    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        let Some(mask) = &self.mask else {
            return true;
        };
        if !(x >= 0.0 && y >= 0.0) || x >= mask.width as f32 || y >= mask.height as f32 {
            return true;
        }
        match mask.alpha(x.floor() as u32, y.floor() as u32) {
            Some(alpha) => alpha > WALL_ALPHA_THRESHOLD,
            None => true,
        }
    }

    pub fn is_wall_at(&self, point: Vec2) -> bool {
        self.is_wall(point.x, point.y)
    }

    /// Whether a circular body of `radius` centered at `(x, y)` fits.
    ///
    /// Only the rim is sampled, matching how bodies are pushed out of walls.
    pub fn is_valid_position(&self, x: f32, y: f32, radius: f32) -> bool {
        rim_points(Vec2::new(x, y), radius, CLEARANCE_SAMPLES).all(|p| !self.is_wall_at(p))
    }

    /// Offset that pushes a body of `radius` out of any wall it overlaps.
    ///
    /// Every touching rim sample contributes `strength` pixels away from itself. Returns
    /// `None` when the body is clear.
    pub fn push_back(&self, center: Vec2, radius: f32, samples: usize, strength: f32) -> Option<Vec2> {
        let mut push = Vec2::ZERO;
        let mut touching = false;
        for (i, point) in rim_points(center, radius, samples).enumerate() {
            if self.is_wall_at(point) {
                touching = true;
                let angle = i as f32 / samples as f32 * TAU;
                push -= Vec2::from_angle(angle) * strength;
            }
        }
        touching.then_some(push)
    }
}

/// Evenly spaced points on a circle, starting at angle zero.
fn rim_points(center: Vec2, radius: f32, samples: usize) -> impl Iterator<Item = Vec2> {
    (0..samples).map(move |i| {
        let angle = i as f32 / samples as f32 * TAU;
        center + Vec2::from_angle(angle) * radius
    })
}
