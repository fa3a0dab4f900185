// Dense 2D block grid: the simulation's spatial truth.
//
// The grid is stored as a flat `Vec<Option<Block>>` indexed by
// `x + y * width`, giving O(1) access. A cell is either empty or holds
// exactly one block. Every access is bounds-checked: out-of-bounds reads
// return `None`, out-of-bounds takes are no-ops, and out-of-bounds or
// occupied placements are rejected with a `PlaceError`.
//
// `take()` is the raw removal primitive. It does not reevaluate anything;
// the removal that triggers a cascade is `collapse::remove_and_propagate`,
// which calls `take()` and then runs the propagator.
//
// `GridFrame` holds the world-space mapping (origin + cell size) used to
// convert between world positions and cell indices for the presentation
// layer.
//
// See also: `block.rs` for the cell contents, `stability.rs` and
// `collapse.rs` which read and mutate the grid, `sim.rs` which owns it.
//
// **Critical constraint: determinism.** All grid mutations happen on the
// calling thread inside generation or propagation. Nothing else holds a
// mutable reference to the grid.

use crate::block::Block;
use crate::config::GridConfig;
use crate::error::PlaceError;
use crate::types::GridCoord;

/// World-space placement of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFrame {
    /// World position of the bottom-left corner of cell (0, 0).
    pub origin: [f32; 2],
    /// World units per cell edge. Always positive.
    pub cell_size: f32,
}

impl Default for GridFrame {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            cell_size: 1.0,
        }
    }
}

impl GridFrame {
    /// World position to cell indices: `floor((pos - origin) / cell_size)`.
    /// The result may lie outside the grid; callers bounds-check.
    pub fn world_to_cell(&self, pos: [f32; 2]) -> GridCoord {
        GridCoord::new(
            ((pos[0] - self.origin[0]) / self.cell_size).floor() as i32,
            ((pos[1] - self.origin[1]) / self.cell_size).floor() as i32,
        )
    }

    /// World position of a cell's center, for placing visuals and effects.
    pub fn cell_center(&self, coord: GridCoord) -> [f32; 2] {
        [
            self.origin[0] + (coord.x as f32 + 0.5) * self.cell_size,
            self.origin[1] + (coord.y as f32 + 0.5) * self.cell_size,
        ]
    }
}

/// Dense 2D grid of optional blocks.
#[derive(Clone, Debug, Default)]
pub struct BlockGrid {
    /// Flat storage: index = x + y * width.
    cells: Vec<Option<Block>>,
    width: u32,
    height: u32,
    frame: GridFrame,
}

impl BlockGrid {
    /// Create an empty grid with the default frame (origin 0, unit cells).
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_frame(width, height, GridFrame::default())
    }

    pub fn with_frame(width: u32, height: u32, frame: GridFrame) -> Self {
        let total = width as usize * height as usize;
        Self {
            cells: vec![None; total],
            width,
            height,
            frame,
        }
    }

    /// Create an empty grid sized and placed per config.
    pub fn from_config(config: &GridConfig) -> Self {
        Self::with_frame(
            config.width,
            config.height,
            GridFrame {
                origin: config.origin,
                cell_size: config.cell_size,
            },
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// True iff `0 <= x < width` and `0 <= y < height`.
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.x as usize + coord.y as usize * self.width as usize)
        } else {
            None
        }
    }

    /// The block at `coord`, or `None` if empty or out of bounds.
    pub fn get(&self, coord: GridCoord) -> Option<&Block> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut Block> {
        match self.index(coord) {
            Some(i) => self.cells[i].as_mut(),
            None => None,
        }
    }

    /// Whether a block occupies `coord`. Out-of-bounds cells are never occupied.
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Insert a block into an empty in-bounds cell. The block's `coord` is
    /// overwritten with `coord` so the two can never disagree.
    pub fn place(&mut self, coord: GridCoord, mut block: Block) -> Result<(), PlaceError> {
        let i = self.index(coord).ok_or(PlaceError::OutOfBounds { coord })?;
        if self.cells[i].is_some() {
            return Err(PlaceError::Occupied { coord });
        }
        block.coord = coord;
        self.cells[i] = Some(block);
        Ok(())
    }

    /// Remove and return the block at `coord` without triggering any
    /// reevaluation. No-op for empty or out-of-bounds cells.
    pub fn take(&mut self, coord: GridCoord) -> Option<Block> {
        self.index(coord).and_then(|i| self.cells[i].take())
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// All blocks in flat-array order (x inner, y outer).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.cells.iter().flatten()
    }

    /// Number of occupied cells strictly above `coord` in its column, up to
    /// the top of the grid. Gaps do not stop the scan.
    pub fn count_above(&self, coord: GridCoord) -> u32 {
        if !self.in_bounds(coord) {
            return 0;
        }
        (coord.y + 1..self.height as i32)
            .filter(|&y| self.is_occupied(GridCoord::new(coord.x, y)))
            .count() as u32
    }
}
