// Per-block structural stability evaluator.
//
// Decides whether a single block can stay where it is, given the grid's
// current occupancy. Support is never stored; it is recomputed from the grid
// on every evaluation. The evaluator is a pure function of `(grid, coord,
// config)`: it never mutates the grid and never recurses into neighbor
// evaluation. The collapse propagator (`collapse.rs`) acts on its verdicts.
//
// ## Evaluation order
//
// 1. **Direct support.** The cell below is occupied: stable, nothing else is
//    computed. This is the common case for solid terrain. Row 0 has no cell
//    below, so its blocks fall through to the tension check unless
//    `ground_row_rests_on_floor` is set.
// 2. **Downward connectivity.** BFS from the block through occupied cells,
//    stepping only straight down or diagonally down, looking for a node on
//    row 0 or a node with direct support. No such path: unstable, whatever
//    the tension would be.
// 3. **Tension.** For connected but unsupported blocks:
//
//    ```text
//    load     = weight * (1 + occupied cells above, same column, to the top)
//    lateral  = direct_support_value * (connected left/right neighbors)
//    torque   = torque_factor * max(support_distance(-1), support_distance(+1))
//    tension  = load - lateral * support_multiplier + torque
//    ```
//
//    `tension > support_strength` is unstable. Otherwise the block is braced
//    and `clamp01(1 - tension / support_strength)` is reported for color
//    feedback.
//
// `diagonal_support_value` is not part of the tension formula; see DESIGN.md.
//
// **Critical constraint: determinism.** The BFS visits cells in a fixed step
// order and tracks visited cells in a `BTreeSet` keyed by coordinate.

use crate::config::{MaterialProperties, StabilityConfig};
use crate::grid::BlockGrid;
use crate::types::{DOWNWARD_STEPS, GridCoord};
use std::collections::{BTreeSet, VecDeque};

/// Verdict for one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stability {
    /// Resting directly on another block (or the world floor).
    Supported,
    /// Connected downward without direct support, with tension within limits.
    Braced { tension: f32, ratio: f32 },
    /// No downward path to the ground row or to any directly-supported block.
    Disconnected,
    /// Connected, but tension exceeds the block's support strength.
    Overstressed { tension: f32 },
}

impl Stability {
    pub fn is_stable(self) -> bool {
        matches!(self, Stability::Supported | Stability::Braced { .. })
    }

    /// `(stress, stability ratio)` to cache on a block for display.
    pub fn display_values(self) -> (f32, f32) {
        match self {
            Stability::Supported => (0.0, 1.0),
            Stability::Braced { tension, ratio } => (tension, ratio),
            Stability::Disconnected => (0.0, 0.0),
            Stability::Overstressed { tension } => (tension, 0.0),
        }
    }
}

/// Whether the cell directly below `coord` is occupied.
pub fn has_direct_support(grid: &BlockGrid, coord: GridCoord) -> bool {
    grid.is_occupied(coord.below())
}

/// Direct support, or resting on the world floor when opted in.
fn rests_on_something(grid: &BlockGrid, coord: GridCoord, config: &StabilityConfig) -> bool {
    (config.ground_row_rests_on_floor && coord.y == 0) || has_direct_support(grid, coord)
}

/// BFS from `start` following only downward steps through occupied cells.
/// Returns true as soon as a visited node is on row 0 or has direct support.
///
/// `start` itself is always expanded, even if its own cell is empty, so a
/// caller can ask "would something here be anchored?".
pub fn is_connected_downwards(grid: &BlockGrid, start: GridCoord) -> bool {
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current.y == 0 || has_direct_support(grid, current) {
            return true;
        }
        for (dx, dy) in DOWNWARD_STEPS {
            let next = current.offset(dx, dy);
            if grid.is_occupied(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Support from the immediate left and right neighbors that are themselves
/// downward-connected.
pub fn lateral_support(grid: &BlockGrid, coord: GridCoord, config: &StabilityConfig) -> f32 {
    [coord.offset(-1, 0), coord.offset(1, 0)]
        .into_iter()
        .filter(|&n| grid.is_occupied(n) && is_connected_downwards(grid, n))
        .count() as f32
        * config.direct_support_value
}

/// Cells walked along the row in `direction` (-1 or +1), starting at `coord`
/// itself, before reaching a block with direct support. Empty cells and
/// unsupported blocks both count. Runs to the grid edge if nothing is found.
pub fn support_distance(grid: &BlockGrid, coord: GridCoord, direction: i32) -> f32 {
    let mut distance = 0.0;
    let mut current = coord;
    while grid.in_bounds(current) {
        if grid.is_occupied(current) && has_direct_support(grid, current) {
            break;
        }
        distance += 1.0;
        current = current.offset(direction, 0);
    }
    distance
}

/// Net load on an unsupported block after lateral bracing and torque.
pub fn tension(
    grid: &BlockGrid,
    coord: GridCoord,
    material: &MaterialProperties,
    config: &StabilityConfig,
) -> f32 {
    let vertical_load = (grid.count_above(coord) as f32 + 1.0) * material.weight;
    let lateral = lateral_support(grid, coord, config);
    let offset = support_distance(grid, coord, -1).max(support_distance(grid, coord, 1));
    let torque = offset * material.torque_factor;
    vertical_load - lateral * config.support_multiplier + torque
}

/// Evaluate the block at `coord`. Returns `None` if the cell is empty or out
/// of bounds.
pub fn evaluate(
    grid: &BlockGrid,
    coord: GridCoord,
    config: &StabilityConfig,
) -> Option<Stability> {
    let block = grid.get(coord)?;

    if rests_on_something(grid, coord, config) {
        return Some(Stability::Supported);
    }

    if !is_connected_downwards(grid, coord) {
        return Some(Stability::Disconnected);
    }

    let material = &block.material;
    let tension = tension(grid, coord, material, config);
    if tension > material.support_strength {
        Some(Stability::Overstressed { tension })
    } else {
        let ratio = if material.support_strength > 0.0 {
            (1.0 - tension / material.support_strength).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(Stability::Braced { tension, ratio })
    }
}
