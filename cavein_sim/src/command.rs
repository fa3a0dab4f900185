// Player actions that mutate the simulation.
//
// All player-driven mutations go through `SimAction`, applied by
// `SimState::apply()` in `sim.rs`. The presentation layer translates input
// (mouse click on a cell with the pickaxe or support tool selected) into an
// action, applies it, and reads back the resulting `SimEvent`s.
//
// Current actions:
// - `Mine`: remove a mineable block and run the collapse it triggers.
// - `PlaceSupport`: put a player-placed support into an empty cell.
//
// See also: `sim.rs` for the dispatch, `event.rs` for what comes back.
//
// **Critical constraint: determinism.** Actions are the sole external input
// to a running session. Applying the same actions in the same order to the
// same seeded session yields the same grid.

use crate::types::GridCoord;
use serde::{Deserialize, Serialize};

/// A single player action against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimAction {
    /// Mine the block at `coord`.
    Mine { coord: GridCoord },
    /// Place a support block at `coord`.
    PlaceSupport { coord: GridCoord },
}

impl SimAction {
    /// The cell this action targets.
    pub fn coord(self) -> GridCoord {
        match self {
            SimAction::Mine { coord } | SimAction::PlaceSupport { coord } => coord,
        }
    }
}
