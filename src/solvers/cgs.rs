// Copyright @yucwang 2026

use super::operator::LinearOperator;
use super::{effective_tolerance, IterationControl, Solution};
use crate::core::error::{RadiosityError, RadiosityResult};
use crate::math::constants::{Float, VectorXf};

/// Conjugate gradient squared for general square `A`, starting from `x`.
///
/// `r0` is the shadow residual used for bi-orthogonalization, usually the
/// initial residual `b - A x`. A vanishing bi-orthogonalization scalar is an
/// error. Reaching the iteration cap is not: the current iterate comes back
/// with `converged == false`.
pub fn cgs<A>(control: &IterationControl,
              a: &A,
              b: &VectorXf,
              r0: &VectorXf,
              tol: Float,
              x: VectorXf) -> RadiosityResult<Solution>
where
    A: LinearOperator + ?Sized,
{
    let n = x.len();
    if b.len() != n || r0.len() != n || a.nrows() != n || a.ncols() != n {
        return Err(RadiosityError::invalid_argument(
            "cgs", format!("sizes differ: A {}x{}, b {}, r0 {}, x {}",
                           a.nrows(), a.ncols(), b.len(), r0.len(), n)));
    }
    let tol = effective_tolerance(tol);

    let mut x = x;
    let norm_b = b.norm();
    let mut r = b - a.apply(&x);
    let mut p = VectorXf::zeros(n);
    let mut q = VectorXf::zeros(n);
    let mut old_rho: Float = 1.0;

    let mut iter = 0usize;
    let mut converged = true;
    while r.norm() > tol * norm_b {
        iter += 1;
        if iter > control.max_iter() {
            log::warn!("cgs stopped at the iteration cap ({}), residual {:e}.",
                       control.max_iter(), r.norm());
            iter -= 1;
            converged = false;
            break;
        }

        let rho = r0.dot(&r);
        if old_rho == 0.0 {
            return Err(RadiosityError::singular("cgs", iter - 1, "zero bi-orthogonalization scalar"));
        }
        let beta = rho / old_rho;

        let u = &r + &q * beta;
        let tmp = &q + &p * beta;
        p = &u + tmp * beta;

        let v = a.apply(&p);
        let sigma = r0.dot(&v);
        if sigma == 0.0 {
            return Err(RadiosityError::singular("cgs", iter - 1, "zero step denominator"));
        }
        let alpha = rho / sigma;

        q = &u - v * alpha;
        let u_plus_q = &u + &q;
        let w = a.apply(&u_plus_q);

        r.axpy(-alpha, &w, 1.0);
        x.axpy(alpha, &u_plus_q, 1.0);

        old_rho = rho;
    }

    log::debug!("cgs finished after {} iterations, residual {:e}.", iter, r.norm());
    Ok(Solution { x, iterations: iter, converged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::MatrixXf;

    #[test]
    fn test_cgs_matches_direct_solve() {
        let a = MatrixXf::from_row_slice(3, 3, &[4.0, 1.0, 0.0,
                                                 2.0, 3.0, 1.0,
                                                 0.0, -1.0, 5.0]);
        let b = VectorXf::from_vec(vec![1.0, 2.0, 3.0]);
        let direct = a.clone().lu().solve(&b).unwrap();

        let x0 = VectorXf::zeros(3);
        let r0 = &b - &a * &x0;
        let solution = cgs(&IterationControl::default(), &a, &b, &r0, 1e-12, x0).unwrap();
        assert!(solution.converged);
        assert!((solution.x - direct).norm() < 1e-9);
    }

    #[test]
    fn test_cgs_two_by_two() {
        let a = MatrixXf::from_row_slice(2, 2, &[4.0, 1.0,
                                                 2.0, 3.0]);
        let b = VectorXf::from_vec(vec![1.0, 2.0]);
        let solution = cgs(&IterationControl::default(), &a, &b, &b, 1e-12, VectorXf::zeros(2)).unwrap();
        assert!((solution.x[0] - 0.1).abs() < 1e-9);
        assert!((solution.x[1] - 0.6).abs() < 1e-9);
        assert!(solution.iterations <= 4);
    }

    #[test]
    fn test_cgs_already_solved_returns_immediately() {
        let a = MatrixXf::identity(2, 2);
        let b = VectorXf::from_vec(vec![1.0, -1.0]);
        let solution = cgs(&IterationControl::default(), &a, &b, &b, 1e-10, b.clone()).unwrap();
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.x, b);
    }

    #[test]
    fn test_cgs_iteration_cap_degrades_gracefully() {
        let n = 6;
        let mut a = MatrixXf::zeros(n, n);
        for i in 0..n {
            a[(i, i)] = (i + 1) as Float;
            if i + 1 < n {
                a[(i, i + 1)] = 0.5;
            }
        }
        let b = VectorXf::from_element(n, 1.0);
        let solution = cgs(&IterationControl::new(2), &a, &b, &b, 1e-14, VectorXf::zeros(n)).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 2);
        assert!(solution.x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_cgs_breakdown_is_singular() {
        let a = MatrixXf::from_row_slice(2, 2, &[0.0, 1.0,
                                                 -1.0, 0.0]);
        let b = VectorXf::from_vec(vec![1.0, 0.0]);
        let err = cgs(&IterationControl::default(), &a, &b, &b, 1e-10, VectorXf::zeros(2)).unwrap_err();
        assert!(matches!(err, RadiosityError::Singular { context: "cgs", iterations: 0, .. }));
    }

    #[test]
    fn test_cgs_rejects_mismatched_sizes() {
        let a = MatrixXf::identity(2, 2);
        let b = VectorXf::from_vec(vec![1.0, 2.0]);
        let r0 = VectorXf::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(cgs(&IterationControl::default(), &a, &b, &r0, 1e-10, VectorXf::zeros(2)),
                         Err(RadiosityError::InvalidArgument { .. })));
    }
}
