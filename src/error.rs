//! Centralized error types for the engine.
//!
//! Designed gameplay failures (caught, puzzle timeout, mini-game timeout) are not errors;
//! they are session outcomes. The types here cover malformed configuration and rasters.

use std::io;

/// Main error type for the engine.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Raster not found: {0}")]
    NotFound(String),
}

/// Error type for ASCII layout parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in layout: {0}")]
    UnknownCharacter(char),
    #[error("Layout row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("Layout is empty")]
    Empty,
}

/// Errors related to opacity rasters.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("Raster of {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Raster has zero area")]
    Empty,
}

/// Errors related to level configuration.
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("Unknown level: {0}")]
    UnknownLevel(usize),

    #[error("Invalid level configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed level JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type GameResult<T> = Result<T, GameError>;
