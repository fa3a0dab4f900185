// Session state and the external entry points.
//
// `SimState` is the single source of truth for one mining session. It owns
// the game config, the PRNG, the block grid, the ore tally, and the event
// outbox. Nothing else holds grid state; the presentation layer reads
// snapshots and mutates only through the methods here.
//
// On construction (`new()`/`with_config()`), the session generates terrain
// via `terrain_gen.rs` from its seed. `from_grid()` wraps a hand-built grid
// instead, for scenario tests and tools.
//
// ## Entry points
//
// - `mine_at()`: validate bounds and mineability, remove the block, run the
//   cascade, tally collected ore.
// - `place_support_at()` / `can_place_support()`: player reinforcement.
// - `remove_block()`: removal that bypasses mining rules (external collapse);
//   still cascades, never tallies.
// - `block_at()`: read-only `BlockSnapshot` for rendering.
// - `apply()`: the same operations driven by `SimAction`, returning the
//   `SimEvent`s they caused.
// - `is_game_over()` / `final_score()`: scoring queries (see `scoring.rs`).
//
// Every mutation runs to completion before returning: a mine call does not
// return until its cascade has settled.
//
// See also: `collapse.rs` for the cascade, `command.rs` / `event.rs` for the
// action and event types, `config.rs` for `GameConfig`.
//
// **Critical constraint: determinism.** The only randomness is `rng`, used
// during generation. Given a seed, config, and sequence of calls, the grid
// and the event stream are identical on every run.

use crate::block::{Block, BlockSnapshot};
use crate::collapse::{self, CollapseReport};
use crate::command::SimAction;
use crate::config::GameConfig;
use crate::error::{MineError, PlaceError};
use crate::event::{SimEvent, SimEventKind};
use crate::grid::BlockGrid;
use crate::prng::GameRng;
use crate::scoring::{self, OreTally};
use crate::stability;
use crate::terrain_gen::{self, TerrainStats};
use crate::types::{GridCoord, OreKind};

/// One mining session.
#[derive(Clone, Debug)]
pub struct SimState {
    /// Game configuration (immutable after initialization).
    pub config: GameConfig,

    /// The session's deterministic PRNG.
    pub rng: GameRng,

    /// The block grid. Private so every removal goes through the cascade;
    /// read it through `grid()`.
    grid: BlockGrid,

    /// Ore the player has mined, per category.
    pub tally: OreTally,

    /// What terrain generation produced.
    pub terrain: TerrainStats,

    next_sequence: u64,
    outbox: Vec<SimEvent>,
    dirty: bool,
}

/// What a successful `mine_at` did.
#[derive(Clone, Debug)]
pub struct MineOutcome {
    /// Ore added to the tally, if the mined block was of a non-default
    /// category.
    pub collected: Option<OreKind>,
    /// The mined block and the cascade it caused.
    pub report: CollapseReport,
}

impl SimState {
    /// Create a new session with default config and the given seed.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    /// Create a new session with the given seed and config.
    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        let mut rng = GameRng::new(seed);
        let mut grid = BlockGrid::from_config(&config.grid);
        let terrain = terrain_gen::generate_from_seed(&mut grid, &config, &mut rng);
        Self::assemble(config, rng, grid, terrain)
    }

    /// Wrap an existing grid. Every non-default terrain block counts as
    /// generated ore.
    pub fn from_grid(config: GameConfig, grid: BlockGrid) -> Self {
        let terrain = TerrainStats {
            ground_heights: Vec::new(),
            total_blocks: grid.occupied_count(),
            ore_blocks: scoring::remaining_ore(&grid, config.terrain.default_ore),
        };
        Self::assemble(config, GameRng::new(0), grid, terrain)
    }

    fn assemble(
        config: GameConfig,
        rng: GameRng,
        grid: BlockGrid,
        terrain: TerrainStats,
    ) -> Self {
        Self {
            config,
            rng,
            grid,
            tally: OreTally::default(),
            terrain,
            next_sequence: 0,
            outbox: Vec::new(),
            dirty: true,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Mine the block at `coord`. On success the block and everything its
    /// removal brought down are gone from the grid.
    pub fn mine_at(&mut self, coord: GridCoord) -> Result<MineOutcome, MineError> {
        if !self.grid.in_bounds(coord) {
            return Err(MineError::OutOfBounds { coord });
        }
        let block = self.grid.get(coord).ok_or(MineError::Empty { coord })?;
        if !block.is_mineable() {
            return Err(MineError::NotMineable { coord });
        }
        let kind = block.kind;

        let report = collapse::remove_and_propagate(&mut self.grid, coord, &self.config.stability);
        let collected = kind
            .ore()
            .filter(|&ore| ore != self.config.terrain.default_ore);
        if let Some(ore) = collected {
            self.tally.record(ore);
        }
        log::debug!("mined {kind:?} at {coord}");

        self.emit(SimEventKind::BlockMined {
            coord,
            kind,
            collected,
        });
        self.emit_cascade(coord, &report);
        Ok(MineOutcome { collected, report })
    }

    /// Place a support block into an empty in-bounds cell.
    ///
    /// Placement never triggers a cascade. The new block's display values
    /// are computed right away so it renders with the right color.
    pub fn place_support_at(&mut self, coord: GridCoord) -> Result<(), PlaceError> {
        let block = Block::support(coord, self.config.support_beam.clone());
        self.grid.place(coord, block)?;
        let verdict = stability::evaluate(&self.grid, coord, &self.config.stability);
        if let (Some(verdict), Some(placed)) = (verdict, self.grid.get_mut(coord)) {
            (placed.stress, placed.stability) = verdict.display_values();
        }
        log::debug!("placed support at {coord}");
        self.emit(SimEventKind::SupportPlaced { coord });
        Ok(())
    }

    /// Remove whatever is at `coord` without mining rules or tallying, and
    /// run the cascade. No-op for empty or out-of-bounds cells.
    pub fn remove_block(&mut self, coord: GridCoord) -> CollapseReport {
        let report = collapse::remove_and_propagate(&mut self.grid, coord, &self.config.stability);
        if report.removed.is_some() {
            self.emit_cascade(coord, &report);
        }
        report
    }

    /// Apply one action and return the events it produced. Rejected actions
    /// produce a single `ActionRejected` event and leave the grid unchanged.
    pub fn apply(&mut self, action: SimAction) -> Vec<SimEvent> {
        let start = self.outbox.len();
        let rejection = match action {
            SimAction::Mine { coord } => self.mine_at(coord).err().map(|e| e.to_string()),
            SimAction::PlaceSupport { coord } => {
                self.place_support_at(coord).err().map(|e| e.to_string())
            }
        };
        if let Some(reason) = rejection {
            self.emit(SimEventKind::ActionRejected { action, reason });
        }
        self.outbox[start..].to_vec()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Read-only view of the grid.
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// Snapshot of the block at `coord`, or `None` if empty or out of bounds.
    pub fn block_at(&self, coord: GridCoord) -> Option<BlockSnapshot> {
        self.grid.get(coord).map(Block::snapshot)
    }

    /// Whether the cell is a valid target for `place_support_at`.
    pub fn can_place_support(&self, coord: GridCoord) -> bool {
        self.grid.in_bounds(coord) && !self.grid.is_occupied(coord)
    }

    pub fn world_to_cell(&self, pos: [f32; 2]) -> GridCoord {
        self.grid.frame().world_to_cell(pos)
    }

    pub fn cell_center(&self, coord: GridCoord) -> [f32; 2] {
        self.grid.frame().cell_center(coord)
    }

    /// Non-default terrain blocks still in the grid.
    pub fn remaining_ore(&self) -> usize {
        scoring::remaining_ore(&self.grid, self.config.terrain.default_ore)
    }

    pub fn is_game_over(&self) -> bool {
        scoring::is_game_over(&self.grid, self.config.terrain.default_ore)
    }

    pub fn final_score(&self) -> i64 {
        scoring::final_score(
            &self.grid,
            &self.tally,
            self.terrain.ore_blocks,
            self.config.terrain.default_ore,
            &self.config.scoring,
        )
    }

    // -----------------------------------------------------------------------
    // Change notification
    // -----------------------------------------------------------------------

    /// True if anything changed since the last call. Clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// All events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, kind: SimEventKind) {
        if !matches!(kind, SimEventKind::ActionRejected { .. }) {
            self.dirty = true;
        }
        self.outbox.push(SimEvent {
            sequence: self.next_sequence,
            kind,
        });
        self.next_sequence += 1;
    }

    fn emit_cascade(&mut self, origin: GridCoord, report: &CollapseReport) {
        for fallen in &report.collapsed {
            self.emit(SimEventKind::BlockCollapsed {
                coord: fallen.coord,
                kind: fallen.kind,
                reason: fallen.reason,
            });
        }
        self.emit(SimEventKind::CascadeSettled {
            origin,
            collapsed: report.collapsed.len(),
            passes: report.passes,
        });
    }
}
