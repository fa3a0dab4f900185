// Block records and the read-only snapshot handed to presentation.
//
// A `Block` is plain data: its cell, what kind of block it is, the material
// properties copied from config at creation, and two cached display values
// written by the collapse propagator (`stress`, `stability`). Blocks carry no
// neighbor references; every neighbor lookup goes through `BlockGrid` by
// coordinate.
//
// Lifecycle: created by `terrain_gen.rs` (or `SimState::place_support_at`),
// placed into exactly one grid cell, and destroyed whole on removal.
//
// See also: `grid.rs` for storage, `stability.rs` for the pure evaluator
// that reads these fields, `config.rs` for `MaterialProperties`.

use crate::config::MaterialProperties;
use crate::types::{BlockKind, GridCoord, OreKind};
use serde::{Deserialize, Serialize};

/// One terrain unit occupying a grid cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Cell this block occupies. Kept in sync by `BlockGrid::place`.
    pub coord: GridCoord,
    pub kind: BlockKind,
    pub material: MaterialProperties,
    /// Topmost generated block of its column (grass sprite).
    pub surface: bool,
    /// Last computed tension. Cosmetic only.
    pub stress: f32,
    /// Last computed `clamp01(1 - tension / support_strength)`. 1.0 until
    /// first evaluated and for blocks resting directly on another block.
    pub stability: f32,
}

impl Block {
    /// A generated terrain block.
    pub fn terrain(coord: GridCoord, ore: OreKind, material: MaterialProperties) -> Self {
        Self::new(coord, BlockKind::Terrain(ore), material)
    }

    /// A player-placed support block.
    pub fn support(coord: GridCoord, material: MaterialProperties) -> Self {
        Self::new(coord, BlockKind::Support, material)
    }

    fn new(coord: GridCoord, kind: BlockKind, material: MaterialProperties) -> Self {
        Self {
            coord,
            kind,
            material,
            surface: false,
            stress: 0.0,
            stability: 1.0,
        }
    }

    pub fn ore(&self) -> Option<OreKind> {
        self.kind.ore()
    }

    pub fn is_mineable(&self) -> bool {
        self.material.mineable
    }

    /// Read-only view for rendering and UI.
    pub fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot {
            coord: self.coord,
            ore: self.ore(),
            is_support: self.kind == BlockKind::Support,
            mineable: self.material.mineable,
            surface: self.surface,
            stability: self.stability,
            stress_ratio: if self.material.max_stress_capacity > 0.0 {
                (self.stress / self.material.max_stress_capacity).clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

/// What the presentation layer may know about a block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub coord: GridCoord,
    /// `None` for player-placed supports.
    pub ore: Option<OreKind>,
    pub is_support: bool,
    pub mineable: bool,
    pub surface: bool,
    /// Stability ratio for red-to-green color feedback.
    pub stability: f32,
    /// Stress relative to the material's capacity, clamped to [0, 1].
    pub stress_ratio: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_block_reads_fully_stable() {
        let b = Block::terrain(GridCoord::new(1, 2), OreKind::Iron, MaterialProperties::default());
        let snap = b.snapshot();
        assert_eq!(snap.ore, Some(OreKind::Iron));
        assert_eq!(snap.stability, 1.0);
        assert_eq!(snap.stress_ratio, 0.0);
        assert!(snap.mineable);
        assert!(!snap.is_support);
    }

    #[test]
    fn support_snapshot_has_no_ore() {
        let b = Block::support(GridCoord::new(0, 0), MaterialProperties::support_beam());
        let snap = b.snapshot();
        assert_eq!(snap.ore, None);
        assert!(snap.is_support);
    }

    #[test]
    fn stress_ratio_is_clamped() {
        let mut b = Block::terrain(
            GridCoord::new(0, 0),
            OreKind::Dirt,
            MaterialProperties::default(),
        );
        b.stress = 25.0;
        assert_eq!(b.snapshot().stress_ratio, 1.0);
        b.stress = -3.0;
        assert_eq!(b.snapshot().stress_ratio, 0.0);
        b.stress = 5.0;
        assert!((b.snapshot().stress_ratio - 0.5).abs() < 1e-6);
    }
}
