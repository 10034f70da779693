//! The three floors the game ships with.

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use tracing::info;

use crate::error::LevelError;
use crate::level::LevelConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinLevel {
    /// Cameras only.
    ServerRoom,
    /// Patrol guards.
    Lobby,
    /// Pursuit guards, then the connection puzzle.
    Vault,
}

impl BuiltinLevel {
    fn json(self) -> &'static str {
        match self {
            BuiltinLevel::ServerRoom => include_str!("../../assets/levels/server_room.json"),
            BuiltinLevel::Lobby => include_str!("../../assets/levels/lobby.json"),
            BuiltinLevel::Vault => include_str!("../../assets/levels/vault.json"),
        }
    }

    pub fn config(self) -> Result<LevelConfig, LevelError> {
        LevelConfig::from_json(self.json())
    }
}

/// An ordered list of levels played one after another.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::InvalidConfig("catalog has no levels".into()));
        }
        Ok(Self { levels })
    }

    /// The shipped floors, in play order.
    pub fn builtin() -> Result<Self, LevelError> {
        let levels = BuiltinLevel::iter().map(BuiltinLevel::config).collect::<Result<Vec<_>, _>>()?;
        info!(count = BuiltinLevel::COUNT, "Built-in levels loaded");
        Self::new(levels)
    }

    pub fn get(&self, index: usize) -> Result<&LevelConfig, LevelError> {
        self.levels.get(index).ok_or(LevelError::UnknownLevel(index))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level after `index`, wrapping back to the first.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }
}
