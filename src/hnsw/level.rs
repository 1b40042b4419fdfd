//! Random level assignment for new nodes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples a non-negative integer layer for each new node from a
/// geometric-like distribution controlled by a level multiplier.
#[derive(Debug)]
pub struct LevelSampler {
    rng: StdRng,
    ml: f64,
    max_layers: usize,
}

impl LevelSampler {
    /// `seed = None` draws from OS entropy (non-deterministic); `Some(seed)`
    /// gives a reproducible sequence.
    pub fn new(ml: f64, max_layers: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            ml,
            max_layers,
        }
    }

    /// Draw `r` from `(0, 1]` and return `floor(-ln(r) * ml)`, capped at
    /// `max_layers - 1`. `r = 0` is resampled to avoid `-ln(0) = inf`.
    pub fn sample(&mut self) -> usize {
        let mut r: f64 = self.rng.gen();
        while r == 0.0 {
            r = self.rng.gen();
        }
        let level = (-r.ln() * self.ml).floor() as usize;
        level.min(self.max_layers - 1)
    }
}
