// Data-driven game configuration.
//
// All tunable simulation parameters live here in `GameConfig`, loaded from
// JSON at startup. The sim never uses magic numbers; it reads from the
// config. This enables balance iteration without recompilation.
//
// Parameters are grouped by the subsystem that reads them:
// - `GridConfig`: grid dimensions and the world-to-cell mapping (`grid.rs`).
// - `TerrainConfig`: noise scales, ground-height shaping, and the weighted
//   ore table (`terrain_gen.rs`).
// - `StabilityConfig`: support constants and the propagation radius
//   (`stability.rs`, `collapse.rs`).
// - `materials` / `support_beam`: per-category `MaterialProperties` copied
//   into each `Block` at creation (`block.rs`).
// - `ScoringConfig`: end-of-game score weights (`scoring.rs`).
//
// See also: `sim.rs` which owns the `GameConfig` as part of `SimState`.
//
// **Critical constraint: determinism.** Config values feed directly into
// generation and collapse logic. Identical configs and seeds must produce
// identical grids and identical cascades.

use crate::error::ConfigError;
use crate::types::OreKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Physical properties of one block material.
///
/// Only `weight`, `support_strength`, and `torque_factor` enter the tension
/// formula. The connection strengths, stress capacity, brittleness, and
/// damping are carried on every block for material variety but have no
/// structural effect yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Weight of the block itself; vertical load is `weight * (1 + above)`.
    pub weight: f32,
    /// Maximum tolerable tension before the block fails.
    pub support_strength: f32,
    /// Scales the horizontal distance to the nearest directly-supported
    /// block into a torque term.
    pub torque_factor: f32,
    /// Connection strength to same-row neighbors.
    pub lateral_connection_strength: f32,
    /// Connection strength to diagonal neighbors.
    pub diagonal_connection_strength: f32,
    /// Reference scale for the cosmetic stress display.
    pub max_stress_capacity: f32,
    pub brittle: bool,
    pub damping_factor: f32,
    /// Whether the player's drill can remove this block.
    pub mineable: bool,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            weight: 1.0,
            support_strength: 5.0,
            torque_factor: 0.3,
            lateral_connection_strength: 0.7,
            diagonal_connection_strength: 0.3,
            max_stress_capacity: 10.0,
            brittle: false,
            damping_factor: 0.0,
            mineable: true,
        }
    }
}

impl MaterialProperties {
    /// Material for player-placed supports: same block, much stronger.
    pub fn support_beam() -> Self {
        Self {
            support_strength: 20.0,
            max_stress_capacity: 40.0,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Grid dimensions and world-space placement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// Columns.
    pub width: u32,
    /// Rows. Row 0 is the bottom of the world.
    pub height: u32,
    /// World units per cell edge.
    pub cell_size: f32,
    /// World position of the bottom-left corner of cell (0, 0).
    pub origin: [f32; 2],
}

// ---------------------------------------------------------------------------
// Terrain generation
// ---------------------------------------------------------------------------

/// One row of the weighted ore table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OreProbability {
    pub ore: OreKind,
    /// Base selection weight before ore-noise modulation.
    pub weight: f32,
    /// Valid depth ratio range, inclusive (0 = surface, 1 = deepest).
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Ground shaping and ore placement parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Column-noise frequency for ground height (roughness).
    pub ground_noise_scale: f32,
    /// Ground height baseline, as a fraction of grid height.
    pub ground_base_fraction: f32,
    /// Ground height swing from noise, as a fraction of grid height.
    pub ground_amplitude_fraction: f32,
    /// 2D noise frequency for ore placement.
    pub ore_noise_scale: f32,
    /// Ore noise below this zeroes every non-default weight; above it,
    /// weights scale by `(noise - threshold) / (1 - threshold)`.
    pub ore_noise_threshold: f32,
    /// Per-run noise offsets are drawn uniformly from `[0, range)`.
    pub noise_offset_range: f32,
    /// The plain, non-ore category. Also the fallback for every
    /// generation edge case.
    pub default_ore: OreKind,
    pub ore_table: Vec<OreProbability>,
}

// ---------------------------------------------------------------------------
// Stability
// ---------------------------------------------------------------------------

/// Constants of the support evaluator and collapse propagator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Support contributed by each downward-connected left/right neighbor.
    pub direct_support_value: f32,
    /// Diagonal support contribution. Carried but not applied by the tension
    /// formula; see DESIGN.md.
    pub diagonal_support_value: f32,
    /// Amplifies lateral support's load-bearing effect.
    pub support_multiplier: f32,
    /// Half-width of the square neighborhood reevaluated after a removal.
    pub propagation_radius: u32,
    /// Opt-in: treat row-0 blocks as resting on the world floor (always
    /// directly supported). Off by default, so a row-0 block has no direct
    /// support and goes through the full tension check like any other.
    #[serde(default)]
    pub ground_row_rests_on_floor: bool,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// End-of-game score weights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points per collected block of each ore category.
    pub ore_values: BTreeMap<OreKind, u32>,
    /// Points per generated ore block not collected by the player.
    pub uncollected_ore_points: i64,
    /// Points per default-category block still standing.
    pub kept_dirt_points: i64,
}

// ---------------------------------------------------------------------------
// Top-level game config
// ---------------------------------------------------------------------------

/// Top-level game configuration. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub terrain: TerrainConfig,
    pub stability: StabilityConfig,
    /// Material per ore category. Must cover every `OreKind`.
    pub materials: BTreeMap<OreKind, MaterialProperties>,
    /// Material of player-placed supports.
    pub support_beam: MaterialProperties,
    pub scoring: ScoringConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let materials = OreKind::ALL
            .iter()
            .map(|&ore| (ore, MaterialProperties::default()))
            .collect();

        let mut ore_values = BTreeMap::new();
        ore_values.insert(OreKind::Iron, 5);
        ore_values.insert(OreKind::Gold, 10);
        ore_values.insert(OreKind::Diamond, 20);

        Self {
            grid: GridConfig {
                width: 21,
                height: 120,
                cell_size: 1.0,
                origin: [0.0, 0.0],
            },
            terrain: TerrainConfig {
                ground_noise_scale: 0.1,
                ground_base_fraction: 0.6,
                ground_amplitude_fraction: 0.5,
                ore_noise_scale: 0.2,
                ore_noise_threshold: 0.65,
                noise_offset_range: 1000.0,
                default_ore: OreKind::Dirt,
                ore_table: vec![
                    OreProbability {
                        ore: OreKind::Dirt,
                        weight: 10.0,
                        min_depth: 0.0,
                        max_depth: 1.0,
                    },
                    OreProbability {
                        ore: OreKind::Iron,
                        weight: 30.0,
                        min_depth: 0.05,
                        max_depth: 1.0,
                    },
                    OreProbability {
                        ore: OreKind::Gold,
                        weight: 15.0,
                        min_depth: 0.3,
                        max_depth: 1.0,
                    },
                    OreProbability {
                        ore: OreKind::Diamond,
                        weight: 8.0,
                        min_depth: 0.6,
                        max_depth: 1.0,
                    },
                ],
            },
            stability: StabilityConfig {
                direct_support_value: 1.0,
                diagonal_support_value: 0.7,
                support_multiplier: 3.0,
                propagation_radius: 3,
                ground_row_rests_on_floor: false,
            },
            materials,
            support_beam: MaterialProperties::support_beam(),
            scoring: ScoringConfig {
                ore_values,
                uncollected_ore_points: 10,
                kept_dirt_points: 2,
            },
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the sim cannot run with. Checked once at load time so
    /// the generation and collapse paths never need to.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.grid.cell_size.is_nan() || self.grid.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.grid.cell_size
            )));
        }
        let threshold = self.terrain.ore_noise_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "ore_noise_threshold must be in [0, 1), got {threshold}"
            )));
        }
        for entry in &self.terrain.ore_table {
            if entry.min_depth > entry.max_depth {
                return Err(ConfigError::Invalid(format!(
                    "ore table entry {:?} has min_depth {} above max_depth {}",
                    entry.ore, entry.min_depth, entry.max_depth
                )));
            }
            if entry.weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "ore table entry {:?} has negative weight",
                    entry.ore
                )));
            }
        }
        let longest_side = self.grid.width.max(self.grid.height);
        if self.stability.propagation_radius > longest_side {
            return Err(ConfigError::Invalid(format!(
                "propagation_radius {} exceeds the longest grid side {longest_side}",
                self.stability.propagation_radius
            )));
        }
        for ore in OreKind::ALL {
            if !self.materials.contains_key(&ore) {
                return Err(ConfigError::Invalid(format!("no material for {ore:?}")));
            }
        }
        Ok(())
    }

    /// Material for a terrain block of the given ore category.
    pub fn material(&self, ore: OreKind) -> MaterialProperties {
        self.materials.get(&ore).cloned().unwrap_or_default()
    }
}
