// Ore tally, game-over detection, and final score.
//
// These sit outside the structural core: they only read the grid and the
// per-ore collected counts. Mining a non-default block records it in the
// `OreTally`; blocks destroyed by a collapse are lost, not collected.
//
// Final score:
//
// ```text
// score = max(0, (ore_generated - ore_collected) * uncollected_ore_points
//              + kept_dirt * kept_dirt_points
//              + sum(collected[k] * ore_values[k]))
// ```
//
// `kept_dirt` counts remaining terrain blocks of the default category.
// Player-placed supports count for nothing.

use crate::config::ScoringConfig;
use crate::grid::BlockGrid;
use crate::types::{BlockKind, OreKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-ore counts of blocks the player mined.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreTally {
    collected: BTreeMap<OreKind, u32>,
}

impl OreTally {
    pub fn record(&mut self, ore: OreKind) {
        *self.collected.entry(ore).or_insert(0) += 1;
    }

    pub fn count(&self, ore: OreKind) -> u32 {
        self.collected.get(&ore).copied().unwrap_or(0)
    }

    /// Sum over all recorded categories.
    pub fn total(&self) -> u32 {
        self.collected.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OreKind, u32)> + '_ {
        self.collected.iter().map(|(&ore, &n)| (ore, n))
    }
}

/// Terrain blocks of any non-default category still in the grid.
pub fn remaining_ore(grid: &BlockGrid, default_ore: OreKind) -> usize {
    grid.blocks()
        .filter(|b| matches!(b.kind, BlockKind::Terrain(ore) if ore != default_ore))
        .count()
}

/// True once no non-default block remains.
pub fn is_game_over(grid: &BlockGrid, default_ore: OreKind) -> bool {
    remaining_ore(grid, default_ore) == 0
}

/// Terrain blocks of the default category still in the grid.
pub fn kept_dirt(grid: &BlockGrid, default_ore: OreKind) -> usize {
    grid.blocks()
        .filter(|b| b.kind == BlockKind::Terrain(default_ore))
        .count()
}

pub fn final_score(
    grid: &BlockGrid,
    tally: &OreTally,
    ore_generated: usize,
    default_ore: OreKind,
    scoring: &ScoringConfig,
) -> i64 {
    let collected = tally.total() as i64;
    let uncollected = ore_generated as i64 - collected;
    let ore_value: i64 = tally
        .iter()
        .map(|(ore, n)| n as i64 * scoring.ore_values.get(&ore).copied().unwrap_or(0) as i64)
        .sum();
    let score = uncollected * scoring.uncollected_ore_points
        + kept_dirt(grid, default_ore) as i64 * scoring.kept_dirt_points
        + ore_value;
    score.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::config::{GameConfig, MaterialProperties};
    use crate::types::GridCoord;

    fn grid_of(blocks: &[(i32, i32, BlockKind)]) -> BlockGrid {
        let mut grid = BlockGrid::new(4, 4);
        for &(x, y, kind) in blocks {
            let coord = GridCoord::new(x, y);
            let block = match kind {
                BlockKind::Terrain(ore) => {
                    Block::terrain(coord, ore, MaterialProperties::default())
                }
                BlockKind::Support => Block::support(coord, MaterialProperties::support_beam()),
            };
            grid.place(coord, block).unwrap();
        }
        grid
    }

    #[test]
    fn tally_counts_per_ore() {
        let mut tally = OreTally::default();
        tally.record(OreKind::Gold);
        tally.record(OreKind::Gold);
        tally.record(OreKind::Iron);
        assert_eq!(tally.count(OreKind::Gold), 2);
        assert_eq!(tally.count(OreKind::Diamond), 0);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn game_over_ignores_dirt_and_supports() {
        let grid = grid_of(&[
            (0, 0, BlockKind::Terrain(OreKind::Dirt)),
            (1, 0, BlockKind::Support),
        ]);
        assert!(is_game_over(&grid, OreKind::Dirt));

        let grid = grid_of(&[(0, 0, BlockKind::Terrain(OreKind::Iron))]);
        assert!(!is_game_over(&grid, OreKind::Dirt));
        assert_eq!(remaining_ore(&grid, OreKind::Dirt), 1);
    }

    #[test]
    fn final_score_formula() {
        // 3 dirt kept, 1 support, 1 iron left. Generated 4 ore, collected
        // gold + diamond: (4 - 2) * 10 + 3 * 2 + 10 + 20 = 56.
        let grid = grid_of(&[
            (0, 0, BlockKind::Terrain(OreKind::Dirt)),
            (1, 0, BlockKind::Terrain(OreKind::Dirt)),
            (2, 0, BlockKind::Terrain(OreKind::Dirt)),
            (3, 0, BlockKind::Support),
            (0, 1, BlockKind::Terrain(OreKind::Iron)),
        ]);
        let mut tally = OreTally::default();
        tally.record(OreKind::Gold);
        tally.record(OreKind::Diamond);
        let scoring = GameConfig::default().scoring;
        assert_eq!(final_score(&grid, &tally, 4, OreKind::Dirt, &scoring), 56);
    }

    #[test]
    fn final_score_never_negative() {
        let grid = BlockGrid::new(2, 2);
        let mut tally = OreTally::default();
        for _ in 0..5 {
            tally.record(OreKind::Dirt);
        }
        let scoring = GameConfig::default().scoring;
        // 0 generated, 5 "collected" with no value -> -50, clamped.
        assert_eq!(final_score(&grid, &tally, 0, OreKind::Dirt, &scoring), 0);
    }
}
