// Error types for the simulation's external entry points.
//
// Every in-session failure (out-of-bounds access, occupied cell, mining an
// empty or unmineable cell) is recovered locally: the grid is left unchanged
// and the caller receives one of these values instead of a panic. Only
// `ConfigError` concerns data that originates outside a game session.
//
// See also: `grid.rs` (`BlockGrid::place`), `sim.rs` (`mine_at`,
// `place_support_at`), `config.rs` (`GameConfig::from_json`).

use crate::types::GridCoord;
use thiserror::Error;

/// Why a block could not be placed into a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("cell {coord} is outside the grid")]
    OutOfBounds { coord: GridCoord },
    #[error("cell {coord} is already occupied")]
    Occupied { coord: GridCoord },
}

/// Why a mine request did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MineError {
    #[error("cell {coord} is outside the grid")]
    OutOfBounds { coord: GridCoord },
    #[error("cell {coord} is empty")]
    Empty { coord: GridCoord },
    #[error("block at {coord} cannot be mined")]
    NotMineable { coord: GridCoord },
}

/// A game config that could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON for GameConfig: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
