// Copyright @yucwang 2026

//! Iterative solvers working on operators instead of stored matrices.

pub mod cgs;
pub mod lsqr;
pub mod operator;
pub mod pccg;

use crate::core::error::RadiosityError;
use crate::math::constants::{Float, VectorXf, MACHINE_EPSILON};
use std::fmt;
use std::str::FromStr;

pub use self::cgs::cgs;
pub use self::lsqr::lsqr;
pub use self::operator::{AdjointOperator, FnOperator, JacobiPreconditioner, LinearOperator};
pub use self::pccg::pccg;

pub const DEFAULT_MAX_ITER: usize = 10000;

/// Iteration cap shared by the solvers of one run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IterationControl {
    max_iter: usize,
}

impl Default for IterationControl {
    fn default() -> Self {
        Self { max_iter: DEFAULT_MAX_ITER }
    }
}

impl IterationControl {
    pub fn new(max_iter: usize) -> Self {
        let mut control = Self::default();
        control.set_max_iter(max_iter);
        control
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Installs `max_iter` and returns the previous cap. Caps below 2 are
    /// refused; the current cap is then returned and kept.
    pub fn set_max_iter(&mut self, max_iter: usize) -> usize {
        if max_iter < 2 {
            return self.max_iter;
        }
        std::mem::replace(&mut self.max_iter, max_iter)
    }
}

/// Result of a solve together with the iterations it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub x: VectorXf,
    pub iterations: usize,
    pub converged: bool,
}

/// Non-positive tolerances fall back to machine precision.
pub(crate) fn effective_tolerance(tol: Float) -> Float {
    if tol <= 0.0 { MACHINE_EPSILON } else { tol }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolverKind {
    Pccg,
    Cgs,
    Lsqr,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverKind::Pccg => "pccg",
            SolverKind::Cgs => "cgs",
            SolverKind::Lsqr => "lsqr",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SolverKind {
    type Err = RadiosityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pccg" | "cg" => Ok(SolverKind::Pccg),
            "cgs" => Ok(SolverKind::Cgs),
            "lsqr" => Ok(SolverKind::Lsqr),
            other => Err(RadiosityError::invalid_argument("SolverKind", format!("unknown solver '{}'", other))),
        }
    }
}
