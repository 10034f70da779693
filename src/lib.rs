//! Stealth detection and patrol-AI engine.
//!
//! Levels are pixel maps whose alpha channel marks walls. Cameras, patrol guards and pursuit
//! guards perceive the player through ray-cast vision cones and hearing; the player collects
//! documents through a decryption mini-game and escapes through the exit.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod input;
pub mod level;
pub mod map;
pub mod minigame;
pub mod overlay;
pub mod player;
pub mod puzzle;
pub mod sentinel;
pub mod session;
