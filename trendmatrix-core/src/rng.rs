//! Deterministic RNG hierarchy for the synthetic sub-daily jitter.
//!
//! A master seed generates deterministic sub-seeds for each
//! `(symbol, timeframe)` pair. Sub-seeds are derived via BLAKE3 hashing,
//! independently of thread scheduling order, so the matrix is identical
//! whether timeframes run sequentially or in parallel.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a specific (symbol, timeframe).
    ///
    /// Field lengths are hashed ahead of the bytes so that ("AB", "C") and
    /// ("A", "BC") never collide.
    pub fn sub_seed(&self, symbol: &str, timeframe: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        for field in [symbol, timeframe] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng for a (symbol, timeframe).
    pub fn rng_for(&self, symbol: &str, timeframe: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, timeframe))
    }
}

/// Where the resampler's random perturbation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitterSource {
    /// Reproducible: every (symbol, timeframe) gets its own derived stream.
    Seeded(RngHierarchy),
    /// Fresh OS-seeded generator per timeframe.
    #[default]
    Entropy,
}

impl JitterSource {
    pub fn seeded(master_seed: u64) -> Self {
        JitterSource::Seeded(RngHierarchy::new(master_seed))
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(JitterSource::Entropy, JitterSource::seeded)
    }

    pub fn rng_for(&self, symbol: &str, timeframe: &str) -> StdRng {
        match self {
            JitterSource::Seeded(hierarchy) => hierarchy.rng_for(symbol, timeframe),
            JitterSource::Entropy => StdRng::from_entropy(),
        }
    }
}
