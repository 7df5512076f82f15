use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform(0, 1) source shared by every simulator.
///
/// Each run owns its source, so concurrent runs never share generator state.
pub trait RandomSource {
    fn uniform01(&mut self) -> f64;
}

pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn uniform01(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Exponential draw by inversion: `-ln(U) / rate`.
pub fn exponential(rng: &mut dyn RandomSource, rate: f64) -> f64 {
    let mut u = rng.uniform01();
    if u <= f64::MIN_POSITIVE {
        u = f64::MIN_POSITIVE;
    }
    -u.ln() / rate
}
