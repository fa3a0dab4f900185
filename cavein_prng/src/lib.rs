// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Terrain generation draws every random decision from one `GameRng`: the
// per-run noise offsets, the Perlin permutation seed, and each weighted ore
// pick. A world seed therefore reproduces the same grid on every platform.
//
// The generator core is integer-only. Float helpers (`next_f32`,
// `range_f32`, `weighted_index`) are derived from the integer stream with
// exact mantissa fills, so they are deterministic as well.
//
// **Critical constraint: determinism.** Every method on `GameRng` must produce
// identical output given the same prior state, regardless of platform, compiler
// version, or optimization level. Never mix in OS entropy or the stdlib hasher.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the terrain generator's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Upper 32 bits of the next `u64`. Used to seed noise permutation tables.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform `f32` in [0, 1), filled from the upper 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform `f32` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        assert!(low < high, "range_f32: low must be less than high");
        low + self.next_f32() * (high - low)
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Non-positive weights never win. Returns `None` when no weight is
    /// positive, leaving the fallback choice to the caller. Always consumes
    /// exactly one draw when it returns `Some`, so streams stay aligned.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.next_f32() * total;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if roll < w {
                return Some(i);
            }
            roll -= w;
            last_positive = Some(i);
        }
        // Float rounding can leave `roll` a hair above the final bucket.
        last_positive
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = GameRng::new(57);
        let mut b = GameRng::new(57);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GameRng::new(57);
        let mut b = GameRng::new(58);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f32_in_unit_range() {
        let mut rng = GameRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "f32 out of range: {v}");
        }
    }

    #[test]
    fn range_f32_within_bounds() {
        let mut rng = GameRng::new(777);
        for _ in 0..10_000 {
            let v = rng.range_f32(0.0, 1000.0);
            assert!((0.0..1000.0).contains(&v), "range_f32 out of range: {v}");
        }
    }

    #[test]
    fn weighted_index_none_when_all_zero() {
        let mut rng = GameRng::new(1);
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
        assert_eq!(rng.weighted_index(&[-1.0, 0.0]), None);
    }

    #[test]
    fn weighted_index_never_picks_zero_weight() {
        let mut rng = GameRng::new(9);
        for _ in 0..5_000 {
            let i = rng.weighted_index(&[0.0, 2.0, 0.0, 1.0]).unwrap();
            assert!(i == 1 || i == 3, "picked zero-weight index {i}");
        }
    }

    #[test]
    fn weighted_index_follows_weights() {
        let mut rng = GameRng::new(42);
        let mut hits = [0u32; 2];
        let n = 20_000;
        for _ in 0..n {
            hits[rng.weighted_index(&[3.0, 1.0]).unwrap()] += 1;
        }
        let share = hits[0] as f64 / n as f64;
        assert!(
            (0.70..0.80).contains(&share),
            "expected ~75% for weight 3 of 4, got {:.1}%",
            share * 100.0
        );
    }

    #[test]
    fn serialized_state_continues_stream() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
