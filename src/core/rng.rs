// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// Deterministic uniform(0,1) stream feeding the Monte-Carlo estimators.
///
/// One sampler is threaded through a whole run; the same seed reproduces the
/// same transport estimate.
pub struct Sampler {
    state: u64,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Sampler {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_float(&mut self) -> Float {
        (self.next_u32() as Float) / (u32::MAX as Float + 1.0)
    }

    pub fn next_2d(&mut self) -> Vector2f {
        let u = self.next_float();
        let v = self.next_float();
        Vector2f::new(u, v)
    }
}
