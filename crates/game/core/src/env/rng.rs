//! RNG oracle for deterministic random number generation.
//!
//! Every random decision in a battle (starting gauges, damage variance,
//! critical rolls, AI choices and target picks) goes through [`RngOracle`].
//! Callers derive a fresh seed per roll with [`compute_seed`], so a battle
//! started with the same seed and fed the same inputs replays identically.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn roll_unit(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
    }

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    fn pick_index(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: the seed carries all entropy, which keeps the engine free of
/// interior mutability and lets rolls be recomputed from the battle nonce.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Distinguishes independent rolls drawn for the same unit and nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RollPurpose {
    InitialGauge = 0,
    DamageVariance = 1,
    Critical = 2,
    AiTarget = 3,
    AiUltimate = 4,
    AiJutsu = 5,
    AiGuard = 6,
}

impl RollPurpose {
    pub const fn context(self) -> u32 {
        self as u32
    }
}

/// Compute deterministic seed from battle state components.
///
/// # Arguments
///
/// * `battle_seed` - Base seed set when the session is built
/// * `nonce` - Roll sequence number (increments for every roll)
/// * `unit_id` - Unit the roll is drawn for
/// * `context` - Separates multiple rolls sharing a nonce, see [`RollPurpose`]
pub fn compute_seed(battle_seed: u64, nonce: u64, unit_id: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style combiners
    let mut hash = battle_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(unit_id).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_value() {
        let rng = PcgRng;
        let seed = compute_seed(42, 3, 7, RollPurpose::Critical.context());
        assert_eq!(rng.next_u32(seed), rng.next_u32(seed));
    }

    #[test]
    fn contexts_produce_distinct_seeds() {
        let a = compute_seed(42, 3, 7, RollPurpose::DamageVariance.context());
        let b = compute_seed(42, 3, 7, RollPurpose::Critical.context());
        assert_ne!(a, b);
    }

    #[test]
    fn unit_roll_stays_in_half_open_interval() {
        let rng = PcgRng;
        for nonce in 0..500 {
            let value = rng.roll_unit(compute_seed(1, nonce, 1, 0));
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn pick_index_is_bounded() {
        let rng = PcgRng;
        for nonce in 0..100 {
            assert!(rng.pick_index(compute_seed(9, nonce, 2, 3), 4) < 4);
        }
        assert_eq!(rng.pick_index(5, 0), 0);
    }
}
