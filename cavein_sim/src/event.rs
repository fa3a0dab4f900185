// Simulation events emitted to the presentation layer.
//
// The sim never calls back into the UI. Instead every external mutation
// returns the `SimEvent`s it caused, in the order they happened, and
// `SimState` also keeps them in an outbox the UI drains once per update
// (`SimState::drain_events()`). A `dirty` flag on `SimState` gives a cheaper
// "anything changed?" check for callers that redraw wholesale.
//
// See also: `sim.rs` which produces these, `collapse.rs` for
// `CollapseReason`.
//
// **Critical constraint: determinism.** `sequence` is a per-session counter,
// so events have a total order independent of wall-clock time.

use crate::collapse::CollapseReason;
use crate::command::SimAction;
use crate::types::{BlockKind, GridCoord, OreKind};
use serde::{Deserialize, Serialize};

/// An event emitted by the simulation for the UI / effects layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Monotonic per-session sequence number, starting at 0.
    pub sequence: u64,
    pub kind: SimEventKind,
}

/// Types of events visible to the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// The player mined a block. `collected` is the ore added to the tally,
    /// if any.
    BlockMined {
        coord: GridCoord,
        kind: BlockKind,
        collected: Option<OreKind>,
    },
    /// A block fell as part of a cascade.
    BlockCollapsed {
        coord: GridCoord,
        kind: BlockKind,
        reason: CollapseReason,
    },
    /// The player placed a support.
    SupportPlaced { coord: GridCoord },
    /// The cascade started at `origin` has run to completion.
    CascadeSettled {
        origin: GridCoord,
        collapsed: usize,
        passes: u32,
    },
    /// An action left the grid unchanged.
    ActionRejected { action: SimAction, reason: String },
}
