// Copyright @yucwang 2026

use super::operator::AdjointOperator;
use super::{effective_tolerance, IterationControl, Solution};
use crate::core::error::{RadiosityError, RadiosityResult};
use crate::math::constants::{Float, VectorXf};

/// LSQR (Paige & Saunders): minimises `|A x - b|` for any `m x n` operator.
///
/// Golub-Kahan bidiagonalization with Givens rotations, started from
/// `x = 0` so the minimum-norm least-squares solution comes back. The
/// stopping test is scaled by the largest diagonal seen so far. A zero `b`
/// or a degenerate first step returns zero; a zero diagonal is an error, as
/// is running past the iteration cap.
pub fn lsqr<A>(control: &IterationControl,
               a: &A,
               b: &VectorXf,
               tol: Float) -> RadiosityResult<Solution>
where
    A: AdjointOperator + ?Sized,
{
    let m = b.len();
    let n = a.ncols();
    if a.nrows() != m {
        return Err(RadiosityError::invalid_argument(
            "lsqr", format!("operator has {} rows but b has {} entries", a.nrows(), m)));
    }
    let tol = effective_tolerance(tol);

    let mut x = VectorXf::zeros(n);
    let norm_b = b.norm();
    let mut beta = norm_b;
    if beta == 0.0 {
        return Ok(Solution { x, iterations: 0, converged: true });
    }

    let mut u = b / beta;
    let mut v = a.apply_transpose(&u);
    let mut alpha = v.norm();
    if alpha == 0.0 {
        return Ok(Solution { x, iterations: 0, converged: true });
    }
    v /= alpha;
    let mut w = v.clone();
    let mut phi_bar = beta;
    let mut rho_bar = alpha;

    let mut rho_max: Float = 1.0;
    let mut iter = 0usize;
    loop {
        iter += 1;
        if iter > control.max_iter() {
            return Err(RadiosityError::NotConverged { context: "lsqr", iterations: iter - 1 });
        }

        // Continue the bidiagonalization.
        u = a.apply(&v) - u * alpha;
        beta = u.norm();
        if beta > 0.0 {
            u /= beta;
        }

        v = a.apply_transpose(&u) - v * beta;
        alpha = v.norm();
        if alpha > 0.0 {
            v /= alpha;
        }

        // Rotate the new row away.
        let rho = rho_bar.hypot(beta);
        if rho == 0.0 {
            return Err(RadiosityError::singular("lsqr", iter - 1, "zero diagonal in bidiagonalization"));
        }
        if rho > rho_max {
            rho_max = rho;
        }
        let c = rho_bar / rho;
        let s = beta / rho;
        let theta = s * alpha;
        rho_bar = -c * alpha;
        let phi = c * phi_bar;
        phi_bar *= s;

        x.axpy(phi / rho, &w, 1.0);
        w = &v - w * (theta / rho);

        if (phi_bar * alpha * c).abs() <= tol * norm_b / rho_max {
            break;
        }
    }

    log::debug!("lsqr converged in {} iterations.", iter);
    Ok(Solution { x, iterations: iter, converged: true })
}
