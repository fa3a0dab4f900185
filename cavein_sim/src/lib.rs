// cavein_sim: headless destructible-terrain simulation library.
//
// This crate contains all simulation logic for Cave-In: the block grid,
// procedural terrain and ore generation, per-block structural stability,
// cascading collapse after removals, scoring, and the action/event interface
// the presentation layer talks to. It has no engine or rendering dependency
// and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:         SimState, the session facade (mine, place support, query, score).
// - `grid.rs`:        Dense 2D block grid (the world's spatial truth) + world/cell frame.
// - `block.rs`:       Block records and the read-only BlockSnapshot.
// - `stability.rs`:   Per-block support evaluator (direct support, downward BFS, tension).
// - `collapse.rs`:    Work-queue collapse propagation over a clipped neighborhood.
// - `terrain_gen.rs`: Perlin ground heights, noise-gated weighted ore choice, vein clustering.
// - `scoring.rs`:     Ore tally, game-over check, final score.
// - `command.rs`:     SimAction, the player mutations.
// - `event.rs`:       SimEvent, what mutations report back.
// - `config.rs`:      GameConfig, every tunable parameter, loaded from JSON.
// - `error.rs`:       PlaceError / MineError / ConfigError.
// - `prng`:           Re-exported from `cavein_prng`, xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:       GridCoord, step tables, OreKind, BlockKind.
//
// **Critical constraint: determinism.** Terrain is a pure function of
// `(seed, config)`, and the grid after a sequence of actions is a pure
// function of the starting grid and those actions. All randomness comes from
// the seeded PRNG. No `HashMap`, no system time, no OS entropy. Use
// `BTreeMap`/`BTreeSet` for ordered collections.

pub mod block;
pub mod collapse;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub use cavein_prng as prng;
pub mod scoring;
pub mod sim;
pub mod stability;
pub mod terrain_gen;
pub mod types;
