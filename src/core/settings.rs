// Copyright @yucwang 2026

use crate::core::bsp::BspPolicy;
use crate::math::constants::Float;
use crate::solvers::{IterationControl, SolverKind, DEFAULT_MAX_ITER};

/// Knobs of one radiosity run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Seed of the sampler shared by every Monte-Carlo estimate of the run.
    pub seed: u64,
    /// Rays cast from each face when estimating transport.
    pub samples_per_face: usize,
    /// Shadow rays per diffuser when computing first-order flux.
    pub direct_samples: usize,
    pub bsp: BspPolicy,
    pub solver: SolverKind,
    pub tolerance: Float,
    pub max_iterations: usize,
    pub show_progress: bool,
    /// Stop after first-order flux: no transport, no linear solve.
    pub direct_only: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            samples_per_face: 256,
            direct_samples: 16,
            bsp: BspPolicy::default(),
            solver: SolverKind::Cgs,
            tolerance: 1e-8,
            max_iterations: DEFAULT_MAX_ITER,
            show_progress: false,
            direct_only: false,
        }
    }
}

impl SimulationSettings {
    pub fn iteration_control(&self) -> IterationControl {
        IterationControl::new(self.max_iterations)
    }
}
