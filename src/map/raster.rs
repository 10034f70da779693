//! Raster access for level maps.
//!
//! Decoding image files is a collaborator's job; the engine only needs the alpha channel,
//! keyed by the raster reference a level config names.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::AssetError;
use crate::map::{CollisionField, OpacityMask};

/// Anything that can hand over a decoded opacity mask by key.
pub trait RasterSource {
    fn load(&self, key: &str) -> Result<OpacityMask, AssetError>;
}

/// Builds a collision field for `key`, failing closed if the raster is unavailable.
pub fn load_field(source: &dyn RasterSource, key: &str) -> CollisionField {
    match source.load(key) {
        Ok(mask) => {
            debug!(raster = key, width = mask.width(), height = mask.height(), "Raster loaded");
            CollisionField::new(mask)
        }
        Err(err) => {
            warn!(raster = key, error = %err, "Raster unavailable, every query will report a wall");
            CollisionField::unloaded()
        }
    }
}

/// In-memory raster store, filled by whoever decodes the images.
#[derive(Debug, Default, Clone)]
pub struct RasterCache {
    rasters: HashMap<String, OpacityMask>,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, mask: OpacityMask) {
        self.rasters.insert(key.into(), mask);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, mask: OpacityMask) -> Self {
        self.insert(key, mask);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rasters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

impl RasterSource for RasterCache {
    fn load(&self, key: &str) -> Result<OpacityMask, AssetError> {
        self.rasters
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }
}
