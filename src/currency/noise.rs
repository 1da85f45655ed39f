use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the small jitter added to match scores before they become confidences
pub trait NoiseSource {
    /// Next non-negative jitter value
    fn jitter(&mut self) -> f64;
}

/// Constant jitter; keeps classification fully reproducible
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedJitter(pub f64);

impl NoiseSource for FixedJitter {
    fn jitter(&mut self) -> f64 {
        self.0.max(0.0)
    }
}

/// Uniform jitter in `0..=max` from a caller-seeded generator
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
    max: f64,
}

impl SeededJitter {
    pub fn new(seed: u64, max: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max: max.max(0.0),
        }
    }
}

impl NoiseSource for SeededJitter {
    fn jitter(&mut self) -> f64 {
        if self.max == 0.0 {
            return 0.0;
        }
        self.rng.random_range(0.0..=self.max)
    }
}
