// Procedural terrain and ore generation.
//
// Fills an empty grid at world-build time. Each column gets a ground height
// from smooth 1D noise; every cell at or below it gets a block whose ore
// category is drawn by weighted random choice.
//
// ## Per-cell ore choice
//
// 1. **Depth ratio** `(ground - y) / ground`: 0 at the column's surface, 1 at
//    its bottom cell. A column of ground height 0 has ratio 0 everywhere.
// 2. **Candidates**: every ore-table row whose `[min_depth, max_depth]`
//    contains the ratio. Non-default rows are zeroed when the 2D ore noise
//    is at or below the threshold, and scaled by
//    `(noise - threshold) / (1 - threshold)` above it.
// 3. **Clustering bias**: among already-placed 8-neighbors holding a
//    non-default ore, take the majority category (first seen wins ties). If
//    any candidate is of that category, only those candidates remain.
// 4. **Weighted pick** via `GameRng::weighted_index`. No candidates, or no
//    positive weight, falls back to the default category.
//
// Cells are visited row-major from the bottom (`y` outer, `x` inner), so the
// "already placed" neighbors are the row below and the left neighbor.
//
// ## Noise
//
// Smooth noise is read through the `TerrainNoise` trait so tests can pin it
// to fixed values. `PerlinTerrainNoise` is the production source: one
// `noise::Perlin` seeded from the run's `GameRng`, remapped to [0, 1], with
// per-run offsets from the same RNG.
//
// See also: `config.rs` (`TerrainConfig`) for every constant used here,
// `sim.rs` which calls `generate_from_seed()` when building a session.
//
// **Critical constraint: determinism.** Given the same seed and config, the
// RNG draw sequence (noise seed, offsets, one weighted pick per cell with
// positive total weight) is identical, so the terrain is identical.

use crate::block::Block;
use crate::config::{GameConfig, TerrainConfig};
use crate::grid::BlockGrid;
use crate::prng::GameRng;
use crate::types::{BlockKind, GridCoord, NEIGHBOR_OFFSETS_8, OreKind};
use noise::{NoiseFn, Perlin};
use smallvec::SmallVec;

/// Candidate list: one slot per ore category fits inline.
type Candidates = SmallVec<[(OreKind, f32); 4]>;

// ---------------------------------------------------------------------------
// Noise source
// ---------------------------------------------------------------------------

/// Smooth noise consumed by the generator. Both methods return values in
/// `[0, 1]` and must be pure functions of their arguments.
pub trait TerrainNoise {
    /// Ground-height noise for column `x`.
    fn column(&self, x: i32) -> f32;
    /// Ore-placement noise for cell `(x, y)`.
    fn field(&self, x: i32, y: i32) -> f32;
}

/// Perlin noise with per-run offsets.
pub struct PerlinTerrainNoise {
    perlin: Perlin,
    ground_scale: f64,
    ground_offset: f64,
    ore_scale: f64,
    ore_offset: [f64; 2],
}

impl PerlinTerrainNoise {
    /// Seed the permutation table and draw the three offsets from `rng`.
    pub fn new(config: &TerrainConfig, rng: &mut GameRng) -> Self {
        let perlin = Perlin::new(rng.next_u32());
        let mut offset = || {
            if config.noise_offset_range > 0.0 {
                rng.range_f32(0.0, config.noise_offset_range) as f64
            } else {
                0.0
            }
        };
        let ground_offset = offset();
        let ore_offset = [offset(), offset()];
        Self {
            perlin,
            ground_scale: config.ground_noise_scale as f64,
            ground_offset,
            ore_scale: config.ore_noise_scale as f64,
            ore_offset,
        }
    }

    fn sample(&self, x: f64, y: f64) -> f32 {
        let raw = self.perlin.get([x, y]);
        (((raw + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

impl TerrainNoise for PerlinTerrainNoise {
    fn column(&self, x: i32) -> f32 {
        self.sample((x as f64 + self.ground_offset) * self.ground_scale, 0.0)
    }

    fn field(&self, x: i32, y: i32) -> f32 {
        self.sample(
            (x as f64 + self.ore_offset[0]) * self.ore_scale,
            (y as f64 + self.ore_offset[1]) * self.ore_scale,
        )
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// What a generation run produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainStats {
    /// Surface row per column, indexed by `x`.
    pub ground_heights: Vec<i32>,
    pub total_blocks: usize,
    /// Blocks of any category other than the default.
    pub ore_blocks: usize,
}

/// Seed a `PerlinTerrainNoise` from `rng` and generate with it.
pub fn generate_from_seed(
    grid: &mut BlockGrid,
    config: &GameConfig,
    rng: &mut GameRng,
) -> TerrainStats {
    let noise = PerlinTerrainNoise::new(&config.terrain, rng);
    generate(grid, config, &noise, rng)
}

/// Populate `grid` with terrain. Cells that are already occupied are left
/// untouched and do not count toward the stats.
pub fn generate(
    grid: &mut BlockGrid,
    config: &GameConfig,
    noise: &impl TerrainNoise,
    rng: &mut GameRng,
) -> TerrainStats {
    let terrain = &config.terrain;
    let height = grid.height();
    let ground_heights: Vec<i32> = (0..grid.width() as i32)
        .map(|x| ground_height(noise.column(x), height, terrain))
        .collect();

    let mut stats = TerrainStats {
        ground_heights,
        ..TerrainStats::default()
    };

    for y in 0..height as i32 {
        for (x, &ground) in stats.ground_heights.iter().enumerate() {
            if y > ground {
                continue;
            }
            let coord = GridCoord::new(x as i32, y);
            if grid.is_occupied(coord) {
                continue;
            }
            let ratio = depth_ratio(ground, y);
            let ore = choose_ore(grid, coord, ratio, noise.field(coord.x, y), terrain, rng);
            let mut block = Block::terrain(coord, ore, config.material(ore));
            block.surface = y == ground;
            if grid.place(coord, block).is_ok() {
                stats.total_blocks += 1;
                if ore != terrain.default_ore {
                    stats.ore_blocks += 1;
                }
            }
        }
    }

    log::info!(
        "generated terrain {}x{}: {} blocks, {} ore",
        grid.width(),
        height,
        stats.total_blocks,
        stats.ore_blocks
    );
    stats
}

/// Surface row for a column with noise value `n`, clamped into the grid.
pub fn ground_height(n: f32, grid_height: u32, terrain: &TerrainConfig) -> i32 {
    let h = grid_height as f32;
    let raw =
        (n * h * terrain.ground_amplitude_fraction + h * terrain.ground_base_fraction).floor();
    let top = grid_height.saturating_sub(1) as i32;
    (raw as i32).clamp(0, top)
}

/// Normalized depth of row `y` in a column whose surface is at `ground`.
pub fn depth_ratio(ground: i32, y: i32) -> f32 {
    if ground <= 0 {
        return 0.0;
    }
    (ground - y) as f32 / ground as f32
}

/// Pick the ore category for one cell.
pub fn choose_ore(
    grid: &BlockGrid,
    coord: GridCoord,
    depth_ratio: f32,
    ore_noise: f32,
    terrain: &TerrainConfig,
    rng: &mut GameRng,
) -> OreKind {
    let mut candidates = candidates(depth_ratio, ore_noise, terrain);
    if candidates.is_empty() {
        log::warn!("no ore table entry covers depth {depth_ratio} at {coord}; using default");
        return terrain.default_ore;
    }

    let majority = neighbor_majority(grid, coord, terrain.default_ore);
    if majority.is_some_and(|m| candidates.iter().any(|&(ore, _)| ore == m)) {
        candidates.retain(|(ore, _)| Some(*ore) == majority);
    }

    let weights: SmallVec<[f32; 4]> = candidates.iter().map(|&(_, w)| w).collect();
    match rng.weighted_index(&weights) {
        Some(i) => candidates[i].0,
        None => terrain.default_ore,
    }
}

/// Ore-table rows valid at `depth_ratio`, with noise-modulated weights.
fn candidates(depth_ratio: f32, ore_noise: f32, terrain: &TerrainConfig) -> Candidates {
    let threshold = terrain.ore_noise_threshold;
    terrain
        .ore_table
        .iter()
        .filter(|entry| depth_ratio >= entry.min_depth && depth_ratio <= entry.max_depth)
        .map(|entry| {
            let weight = if entry.ore == terrain.default_ore {
                entry.weight
            } else if ore_noise > threshold {
                entry.weight * (ore_noise - threshold) / (1.0 - threshold)
            } else {
                0.0
            };
            (entry.ore, weight)
        })
        .collect()
}

/// Most common non-default ore among the occupied 8-neighbors of `coord`.
/// Ties go to the category seen first in `NEIGHBOR_OFFSETS_8` order.
fn neighbor_majority(grid: &BlockGrid, coord: GridCoord, default_ore: OreKind) -> Option<OreKind> {
    let mut counts: SmallVec<[(OreKind, u8); 4]> = SmallVec::new();
    for (dx, dy) in NEIGHBOR_OFFSETS_8 {
        let Some(block) = grid.get(coord.offset(dx, dy)) else {
            continue;
        };
        let BlockKind::Terrain(ore) = block.kind else {
            continue;
        };
        if ore == default_ore {
            continue;
        }
        match counts.iter_mut().find(|(k, _)| *k == ore) {
            Some((_, n)) => *n += 1,
            None => counts.push((ore, 1)),
        }
    }

    let mut best: Option<(OreKind, u8)> = None;
    for &(ore, n) in &counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((ore, n));
        }
    }
    best.map(|(ore, _)| ore)
}
