// Cascading collapse propagation after a block removal.
//
// Whenever a cell becomes empty, `propagate()` reevaluates every occupied
// cell in a square neighborhood (side `2 * propagation_radius + 1`, clipped
// to the grid) centered on it. Each block the support evaluator reports
// unstable is removed on the spot, and its coordinate becomes the center of
// a later pass. Passes run from an explicit FIFO work queue rather than the
// call stack, so a collapse spanning the whole map cannot overflow the stack.
//
// ## Pass order
//
// Within one pass the neighborhood is scanned `x` outer, `y` inner, both
// ascending. Blocks removed during the pass are collected in a `BTreeSet`
// keyed by coordinate and enqueued in coordinate order once the scan ends.
// A block removed earlier in the scan is simply absent when the scan reaches
// its cell, so no block is ever processed twice.
//
// A block removed as `Disconnected` also triggers a reevaluation of the block
// resting directly on it. That chain continues upward while the removals
// keep being disconnections, so an unsupported column comes down in a single
// pass even when it is taller than the radius.
//
// Blocks found stable get their cosmetic `stress` / `stability` refreshed.
//
// ## Termination
//
// Every queued pass is caused by an actual removal, and each removal strictly
// shrinks the occupied-cell count, so the queue drains after at most
// `occupied + 1` passes.
//
// See also: `stability.rs` for the per-block verdicts, `grid.rs` for the raw
// `take()` primitive, `sim.rs` which turns reports into `SimEvent`s.
//
// **Critical constraint: determinism.** Scan order, the BTreeSet of
// collected coordinates, and the FIFO queue fix the order of removals.

use crate::block::Block;
use crate::config::StabilityConfig;
use crate::grid::BlockGrid;
use crate::stability::{self, Stability};
use crate::types::{BlockKind, GridCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Why the propagator removed a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollapseReason {
    /// No downward path to the ground row or a directly-supported block.
    Disconnected,
    /// Tension exceeded the block's support strength.
    Overstressed,
}

/// A block destroyed by a cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollapsedBlock {
    pub coord: GridCoord,
    pub kind: BlockKind,
    pub reason: CollapseReason,
}

/// Outcome of one removal plus everything it brought down.
#[derive(Clone, Debug, Default)]
pub struct CollapseReport {
    /// The block whose removal started the cascade, if there was one.
    pub removed: Option<Block>,
    /// Blocks the cascade destroyed, in removal order.
    pub collapsed: Vec<CollapsedBlock>,
    /// Neighborhood passes run, including the initial one.
    pub passes: u32,
}

impl CollapseReport {
    /// Total blocks that left the grid: the initial removal plus collapses.
    pub fn removed_count(&self) -> usize {
        usize::from(self.removed.is_some()) + self.collapsed.len()
    }
}

/// Remove the block at `coord` and run the cascade it triggers. Empty or
/// out-of-bounds cells are a no-op and yield an empty report.
pub fn remove_and_propagate(
    grid: &mut BlockGrid,
    coord: GridCoord,
    config: &StabilityConfig,
) -> CollapseReport {
    let Some(removed) = grid.take(coord) else {
        return CollapseReport::default();
    };
    let mut report = propagate(grid, coord, config);
    report.removed = Some(removed);
    report
}

/// Reevaluate the neighborhood of a freshly emptied cell until no pass finds
/// an unstable block.
pub fn propagate(
    grid: &mut BlockGrid,
    origin: GridCoord,
    config: &StabilityConfig,
) -> CollapseReport {
    let mut report = CollapseReport::default();
    let mut queue = VecDeque::from([origin]);

    while let Some(center) = queue.pop_front() {
        report.passes += 1;
        let removed = run_pass(grid, center, config, &mut report.collapsed);
        queue.extend(removed);
    }

    if report.collapsed.is_empty() {
        log::debug!("removal at {origin} settled with no collapse");
    } else {
        log::info!(
            "cascade from {origin} settled: {} blocks collapsed over {} passes",
            report.collapsed.len(),
            report.passes
        );
    }
    report
}

/// One neighborhood scan. Returns the coordinates removed during the scan.
fn run_pass(
    grid: &mut BlockGrid,
    center: GridCoord,
    config: &StabilityConfig,
    collapsed: &mut Vec<CollapsedBlock>,
) -> BTreeSet<GridCoord> {
    let mut removed = BTreeSet::new();
    let Some((min, max)) = neighborhood(grid, center, config.propagation_radius) else {
        return removed;
    };

    for x in min.x..=max.x {
        for y in min.y..=max.y {
            let coord = GridCoord::new(x, y);
            let Some(verdict) = stability::evaluate(grid, coord, config) else {
                continue;
            };
            if !apply_verdict(grid, coord, verdict, collapsed, &mut removed) {
                continue;
            }
            if verdict == Stability::Disconnected {
                collapse_upward(grid, coord, config, collapsed, &mut removed);
            }
        }
    }
    removed
}

/// Walk up from a disconnected removal, reevaluating each block that was
/// resting on the one just removed.
fn collapse_upward(
    grid: &mut BlockGrid,
    from: GridCoord,
    config: &StabilityConfig,
    collapsed: &mut Vec<CollapsedBlock>,
    removed: &mut BTreeSet<GridCoord>,
) {
    let mut current = from.above();
    while let Some(verdict) = stability::evaluate(grid, current, config) {
        let was_removed = apply_verdict(grid, current, verdict, collapsed, removed);
        if !was_removed || verdict != Stability::Disconnected {
            break;
        }
        current = current.above();
    }
}

/// Cache display values on a stable block, or remove an unstable one.
/// Returns true if the block was removed.
fn apply_verdict(
    grid: &mut BlockGrid,
    coord: GridCoord,
    verdict: Stability,
    collapsed: &mut Vec<CollapsedBlock>,
    removed: &mut BTreeSet<GridCoord>,
) -> bool {
    let reason = match verdict {
        Stability::Disconnected => CollapseReason::Disconnected,
        Stability::Overstressed { .. } => CollapseReason::Overstressed,
        Stability::Supported | Stability::Braced { .. } => {
            if let Some(block) = grid.get_mut(coord) {
                let (stress, stability) = verdict.display_values();
                block.stress = stress;
                block.stability = stability;
            }
            return false;
        }
    };

    let Some(block) = grid.take(coord) else {
        return false;
    };
    log::debug!("block at {coord} collapsed ({reason:?})");
    collapsed.push(CollapsedBlock {
        coord,
        kind: block.kind,
        reason,
    });
    removed.insert(coord);
    true
}

/// Inclusive corners of the square around `center`, clipped to the grid.
/// `None` if the clipped square is empty.
fn neighborhood(
    grid: &BlockGrid,
    center: GridCoord,
    radius: u32,
) -> Option<(GridCoord, GridCoord)> {
    let r = i32::try_from(radius).unwrap_or(i32::MAX);
    let max_x = grid.width() as i32 - 1;
    let max_y = grid.height() as i32 - 1;
    let min = GridCoord::new(
        center.x.saturating_sub(r).max(0),
        center.y.saturating_sub(r).max(0),
    );
    let max = GridCoord::new(
        center.x.saturating_add(r).min(max_x),
        center.y.saturating_add(r).min(max_y),
    );
    if min.x > max.x || min.y > max.y {
        None
    } else {
        Some((min, max))
    }
}
