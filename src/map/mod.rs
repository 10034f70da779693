//! Pixel-map collision, ray marching and grid pathfinding.
//!
//! Everything in here is read-only over a [`CollisionField`]; the session is the single
//! writer and swaps fields wholesale between ticks.

pub mod field;
pub mod parser;
pub mod pathfinding;
pub mod raster;
pub mod raycast;

pub use field::{CollisionField, OpacityMask};
