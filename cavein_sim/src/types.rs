// Core types shared across the simulation.
//
// Defines grid coordinates (`GridCoord`), ore categories (`OreKind`), and the
// block kind discriminator (`BlockKind`). All types derive `Serialize` and
// `Deserialize` so configs can key maps by them and snapshots can be handed
// to the presentation layer as JSON.
//
// **Critical constraint: determinism.** `GridCoord` has a total order so it
// can key `BTreeSet`/`BTreeMap` collections; the sim never iterates a
// `HashMap`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position in the 2D block grid.
///
/// - X: columns, increasing to the right.
/// - Y: rows, increasing upward. Row 0 is the ground row (bedrock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The cell directly below (y - 1).
    pub const fn below(self) -> Self {
        self.offset(0, -1)
    }

    /// The cell directly above (y + 1).
    pub const fn above(self) -> Self {
        self.offset(0, 1)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Steps allowed by the downward-connectivity search: straight down,
/// down-left, down-right. Never sideways-only, never upward.
pub const DOWNWARD_STEPS: [(i32, i32); 3] = [(0, -1), (-1, -1), (1, -1)];

/// The eight neighbors of a cell, in scan order (dx outer, dy inner).
pub const NEIGHBOR_OFFSETS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// ---------------------------------------------------------------------------
// Block categories
// ---------------------------------------------------------------------------

/// Ore classification of a terrain block. Drives scoring and ore-vein
/// generation only; structural behavior comes from the material table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OreKind {
    Dirt,
    Iron,
    Gold,
    Diamond,
}

impl OreKind {
    pub const ALL: [OreKind; 4] = [OreKind::Dirt, OreKind::Iron, OreKind::Gold, OreKind::Diamond];
}

/// What a grid cell holds: generated terrain of some ore category, or a
/// player-placed support that has no ore category at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Terrain(OreKind),
    Support,
}

impl BlockKind {
    /// The ore category, if this is terrain.
    pub fn ore(self) -> Option<OreKind> {
        match self {
            BlockKind::Terrain(ore) => Some(ore),
            BlockKind::Support => None,
        }
    }
}
