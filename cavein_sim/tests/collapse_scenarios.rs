// End-to-end collapse scenarios through the public SimState interface.
//
// Builds grids by hand, wraps them in a SimState, and drives them with the
// same calls the presentation layer uses (mine, place support, query).
// Also checks invariants over seeded, generated terrain: occupancy, the
// direct-support short-circuit, and that every block near a dig is left
// stable once its cascade settles.

use cavein_sim::block::Block;
use cavein_sim::collapse::CollapseReason;
use cavein_sim::command::SimAction;
use cavein_sim::config::{GameConfig, MaterialProperties};
use cavein_sim::event::SimEventKind;
use cavein_sim::grid::BlockGrid;
use cavein_sim::sim::SimState;
use cavein_sim::stability::{self, Stability};
use cavein_sim::types::{GridCoord, OreKind};

/// Helper: a SimState over a hand-built grid of dirt blocks.
fn sim_with(width: u32, height: u32, cells: &[(i32, i32)]) -> SimState {
    let mut config = GameConfig::default();
    config.grid.width = width;
    config.grid.height = height;
    let mut grid = BlockGrid::from_config(&config.grid);
    for &(x, y) in cells {
        let coord = GridCoord::new(x, y);
        grid.place(coord, Block::terrain(coord, OreKind::Dirt, MaterialProperties::default()))
            .unwrap();
    }
    SimState::from_grid(config, grid)
}

/// Helper: every cell of a `width x height` rectangle.
fn solid(width: i32, height: i32) -> Vec<(i32, i32)> {
    (0..width)
        .flat_map(|x| (0..height).map(move |y| (x, y)))
        .collect()
}

/// Every block still in the grid passes evaluation.
fn assert_all_stable(sim: &SimState) {
    assert_stable_where(sim, |_| true);
}

/// Every block still in the grid that matches `keep` passes evaluation.
fn assert_stable_where(sim: &SimState, keep: impl Fn(GridCoord) -> bool) {
    for block in sim.grid().blocks().filter(|b| keep(b.coord)) {
        let verdict = stability::evaluate(sim.grid(), block.coord, &sim.config.stability);
        assert!(
            verdict.is_some_and(Stability::is_stable),
            "block at {} left standing but evaluates {verdict:?}",
            block.coord
        );
    }
}

#[test]
fn vertical_column_falls_when_base_is_mined() {
    let mut sim = sim_with(1, 3, &[(0, 0), (0, 1), (0, 2)]);
    let outcome = sim.mine_at(GridCoord::new(0, 0)).unwrap();

    let fallen: Vec<GridCoord> = outcome.report.collapsed.iter().map(|c| c.coord).collect();
    assert_eq!(fallen, vec![GridCoord::new(0, 1), GridCoord::new(0, 2)]);
    assert!(sim.block_at(GridCoord::new(0, 1)).is_none());
    assert!(sim.block_at(GridCoord::new(0, 2)).is_none());
}

#[test]
fn long_column_collapses_in_one_call() {
    let cells: Vec<(i32, i32)> = (0..200).map(|y| (0, y)).collect();
    let mut sim = sim_with(1, 200, &cells);
    let outcome = sim.mine_at(GridCoord::new(0, 0)).unwrap();
    assert_eq!(outcome.report.collapsed.len(), 199);
    assert_eq!(sim.grid().occupied_count(), 0);
}

#[test]
fn mining_center_of_top_row_keeps_neighbors() {
    // 5-wide row at y=5 over a solid foundation.
    let mut sim = sim_with(5, 6, &solid(5, 6));
    let outcome = sim.mine_at(GridCoord::new(2, 5)).unwrap();
    assert!(outcome.report.collapsed.is_empty());
    assert!(sim.block_at(GridCoord::new(1, 5)).is_some());
    assert!(sim.block_at(GridCoord::new(3, 5)).is_some());
    assert_all_stable(&sim);
}

#[test]
fn undercut_top_row_block_is_braced_by_neighbors() {
    // Mine (2,4) out from under (2,5): tension 1 - 2 * 3 + 0.3 = -4.7.
    let mut sim = sim_with(5, 6, &solid(5, 6));
    sim.mine_at(GridCoord::new(2, 4)).unwrap();
    let snap = sim.block_at(GridCoord::new(2, 5)).unwrap();
    assert_eq!(snap.stability, 1.0);
    assert_all_stable(&sim);
}

#[test]
fn mining_beside_loaded_ground_row_block_topples_it() {
    // Column x=0 y=0..=5 beside a lone (1,0). Row 0 has nothing below it,
    // so once (1,0) is gone (0,0) carries load 6 unbraced and gives way.
    let mut cells: Vec<(i32, i32)> = (0..6).map(|y| (0, y)).collect();
    cells.push((1, 0));
    let mut sim = sim_with(3, 10, &cells);
    let outcome = sim.mine_at(GridCoord::new(1, 0)).unwrap();

    assert_eq!(outcome.report.collapsed.len(), 6);
    assert_eq!(outcome.report.collapsed[0].coord, GridCoord::new(0, 0));
    assert_eq!(
        outcome.report.collapsed[0].reason,
        CollapseReason::Overstressed
    );
    assert_eq!(sim.grid().occupied_count(), 0);
}

#[test]
fn tunnel_under_overhang_brings_it_down() {
    // A 1-wide pillar (x=0) holding up a 4-long roof at y=3. Mining the
    // pillar base disconnects everything above it.
    let mut cells = vec![(0, 0), (0, 1), (0, 2)];
    cells.extend((0..4).map(|x| (x, 3)));
    let mut sim = sim_with(6, 6, &cells);
    let outcome = sim.mine_at(GridCoord::new(0, 0)).unwrap();

    assert_eq!(outcome.report.collapsed.len(), 6);
    assert!(
        outcome
            .report
            .collapsed
            .iter()
            .all(|c| c.reason == CollapseReason::Disconnected)
    );
    assert_eq!(sim.grid().occupied_count(), 0);
}

#[test]
fn support_keeps_column_up() {
    // After (1,0) is mined, (1,1) hangs diagonally off (0,0). A support
    // placed at (1,0) lets (0,0) be mined too.
    let mut sim = sim_with(3, 4, &[(0, 0), (1, 0), (1, 1), (1, 2)]);
    sim.mine_at(GridCoord::new(1, 0)).unwrap();
    // (1,1) perches diagonally on (0,0): load 2, torque 0.6 -> stays.
    assert!(sim.block_at(GridCoord::new(1, 1)).is_some());

    sim.place_support_at(GridCoord::new(1, 0)).unwrap();
    let outcome = sim.mine_at(GridCoord::new(0, 0)).unwrap();
    assert!(outcome.report.collapsed.is_empty());
    assert!(sim.block_at(GridCoord::new(1, 2)).is_some());
    assert_all_stable(&sim);
}

#[test]
fn action_stream_matches_direct_calls() {
    let actions = [
        SimAction::Mine {
            coord: GridCoord::new(2, 4),
        },
        SimAction::PlaceSupport {
            coord: GridCoord::new(2, 4),
        },
        SimAction::Mine {
            coord: GridCoord::new(9, 9),
        },
        SimAction::Mine {
            coord: GridCoord::new(1, 5),
        },
    ];
    let mut sim = sim_with(5, 6, &solid(5, 6));
    let mut rejected = 0;
    for action in actions {
        for event in sim.apply(action) {
            if matches!(event.kind, SimEventKind::ActionRejected { .. }) {
                rejected += 1;
            }
        }
    }
    assert_eq!(rejected, 1);
    assert!(sim.block_at(GridCoord::new(2, 4)).unwrap().is_support);
    assert!(sim.block_at(GridCoord::new(1, 5)).is_none());
}

// ---------------------------------------------------------------------------
// Generated terrain
// ---------------------------------------------------------------------------

#[test]
fn generated_terrain_is_reproducible() {
    let a = SimState::new(2024);
    let b = SimState::new(2024);
    assert_eq!(a.terrain, b.terrain);
    let snaps_a: Vec<_> = a.grid().blocks().map(|bl| bl.snapshot()).collect();
    let snaps_b: Vec<_> = b.grid().blocks().map(|bl| bl.snapshot()).collect();
    assert_eq!(snaps_a, snaps_b);
}

#[test]
fn generated_terrain_fills_columns_without_gaps() {
    let sim = SimState::new(7);
    for (x, &ground) in sim.terrain.ground_heights.iter().enumerate() {
        let x = x as i32;
        for y in 0..sim.grid().height() as i32 {
            let occupied = sim.block_at(GridCoord::new(x, y)).is_some();
            assert_eq!(occupied, y <= ground, "column {x} row {y}, ground {ground}");
        }
        assert!(sim.block_at(GridCoord::new(x, ground)).unwrap().surface);
    }
}

#[test]
fn generated_surface_rows_only_hold_dirt() {
    // Depth ratio 0 is only covered by the default category.
    let sim = SimState::new(99);
    for (x, &ground) in sim.terrain.ground_heights.iter().enumerate() {
        let snap = sim.block_at(GridCoord::new(x as i32, ground)).unwrap();
        assert_eq!(snap.ore, Some(OreKind::Dirt));
    }
}

#[test]
fn mining_generated_terrain_leaves_only_stable_blocks() {
    let mut sim = SimState::new(31);
    // Dig a shaft down the middle column, then undercut both sides.
    let x = sim.grid().width() as i32 / 2;
    let top = sim.terrain.ground_heights[x as usize];
    for y in (top - 20..=top).rev() {
        let _ = sim.mine_at(GridCoord::new(x, y));
    }
    for dx in [-1, 1] {
        for y in top - 25..top - 18 {
            let _ = sim.mine_at(GridCoord::new(x + dx, y));
        }
    }
    // The bottom row carries whole columns and is only reevaluated when a
    // removal comes within range, so check the dug region.
    let reach = sim.config.stability.propagation_radius as i32;
    assert_stable_where(&sim, |c| c.y >= top - 25 - reach);
    assert_eq!(
        sim.grid().occupied_count(),
        sim.grid().blocks().count(),
        "occupied count and block iteration disagree"
    );
}

#[test]
fn block_over_occupied_cell_always_supported() {
    let sim = SimState::new(5);
    for block in sim.grid().blocks() {
        if sim.grid().is_occupied(block.coord.below()) {
            assert_eq!(
                stability::evaluate(sim.grid(), block.coord, &sim.config.stability),
                Some(Stability::Supported)
            );
        }
    }
}
