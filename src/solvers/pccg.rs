// Copyright @yucwang 2026

use super::operator::LinearOperator;
use super::{effective_tolerance, IterationControl, Solution};
use crate::core::error::{RadiosityError, RadiosityResult};
use crate::math::constants::{Float, VectorXf};

/// Preconditioned conjugate gradient for symmetric positive definite `A`.
///
/// `m_inv` applies the inverse of the preconditioner (identity when absent).
/// `x` is an optional buffer for the result; it is zeroed before use, the
/// iteration always starts from the origin. Stops once
/// `|r| < tol * |b|`; running past the iteration cap is an error.
pub fn pccg<A>(control: &IterationControl,
               a: &A,
               m_inv: Option<&dyn LinearOperator>,
               b: &VectorXf,
               tol: Float,
               x: Option<VectorXf>) -> RadiosityResult<Solution>
where
    A: LinearOperator + ?Sized,
{
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(RadiosityError::invalid_argument(
            "pccg", format!("operator is {}x{} but b has {} entries", a.nrows(), a.ncols(), n)));
    }
    if let Some(m) = m_inv {
        if m.nrows() != n || m.ncols() != n {
            return Err(RadiosityError::invalid_argument(
                "pccg", format!("preconditioner is {}x{} but b has {} entries", m.nrows(), m.ncols(), n)));
        }
    }
    let eps = effective_tolerance(tol);

    let mut x = match x {
        Some(mut buffer) if buffer.len() == n => {
            buffer.fill(0.0);
            buffer
        }
        _ => VectorXf::zeros(n),
    };

    let norm_b = b.norm();
    if norm_b == 0.0 {
        return Ok(Solution { x, iterations: 0, converged: true });
    }

    let mut r = b.clone();
    let mut p = VectorXf::zeros(n);
    let mut old_ip: Float = 0.0;

    let mut k = 0usize;
    loop {
        if r.norm() < eps * norm_b {
            break;
        }
        if k > control.max_iter() {
            return Err(RadiosityError::NotConverged { context: "pccg", iterations: k });
        }

        let z = match m_inv {
            Some(m) => m.apply(&r),
            None => r.clone(),
        };
        let ip = z.dot(&r);

        if k > 0 {
            if old_ip == 0.0 {
                return Err(RadiosityError::singular("pccg", k, "vanishing preconditioned residual"));
            }
            let beta = ip / old_ip;
            p = z + p * beta;
        } else {
            p = z;
        }

        let q = a.apply(&p);
        let pq = p.dot(&q);
        if pq == 0.0 {
            return Err(RadiosityError::singular("pccg", k, "zero curvature along search direction"));
        }
        let alpha = ip / pq;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &q, 1.0);
        old_ip = ip;
        k += 1;
    }

    log::debug!("pccg converged in {} iterations, residual {:e}.", k, r.norm());
    Ok(Solution { x, iterations: k, converged: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::MatrixXf;
    use crate::solvers::operator::JacobiPreconditioner;

    fn diag(values: &[Float]) -> MatrixXf {
        MatrixXf::from_diagonal(&VectorXf::from_row_slice(values))
    }

    #[test]
    fn test_pccg_diagonal_system() {
        let a = diag(&[4.0, 9.0]);
        let b = VectorXf::from_vec(vec![8.0, 18.0]);
        let solution = pccg(&IterationControl::default(), &a, None, &b, 1e-8, None).unwrap();
        assert!((solution.x[0] - 2.0).abs() < 1e-8);
        assert!((solution.x[1] - 2.0).abs() < 1e-8);
        assert!(solution.iterations <= 3);
        assert!(solution.converged);
    }

    #[test]
    fn test_pccg_with_jacobi_converges_in_one_step() {
        let a = diag(&[4.0, 9.0]);
        let b = VectorXf::from_vec(vec![8.0, 18.0]);
        let m = JacobiPreconditioner::new(&a.diagonal());
        let solution = pccg(&IterationControl::default(), &a, Some(&m), &b, 1e-8, None).unwrap();
        assert_eq!(solution.iterations, 1);
        assert!((solution.x - VectorXf::from_vec(vec![2.0, 2.0])).norm() < 1e-12);
    }

    #[test]
    fn test_pccg_dense_spd_system() {
        let a = MatrixXf::from_row_slice(3, 3, &[4.0, 1.0, 0.0,
                                                 1.0, 3.0, 1.0,
                                                 0.0, 1.0, 2.0]);
        let expected = VectorXf::from_vec(vec![1.0, -2.0, 3.0]);
        let b = &a * &expected;
        let buffer = VectorXf::from_vec(vec![5.0, 5.0, 5.0]);
        let solution = pccg(&IterationControl::default(), &a, None, &b, 1e-12, Some(buffer)).unwrap();
        assert!((solution.x - expected).norm() < 1e-9);
    }

    #[test]
    fn test_pccg_zero_rhs() {
        let a = diag(&[1.0, 2.0]);
        let solution = pccg(&IterationControl::default(), &a, None, &VectorXf::zeros(2), 1e-8, None).unwrap();
        assert_eq!(solution.x, VectorXf::zeros(2));
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn test_pccg_iteration_cap_is_fatal() {
        let a = diag(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = VectorXf::from_element(5, 1.0);
        let err = pccg(&IterationControl::new(2), &a, None, &b, 1e-14, None).unwrap_err();
        assert_eq!(err, RadiosityError::NotConverged { context: "pccg", iterations: 3 });
    }

    #[test]
    fn test_pccg_rejects_bad_input() {
        let a = diag(&[1.0, 2.0]);
        let b = VectorXf::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(pccg(&IterationControl::default(), &a, None, &b, 1e-8, None),
                         Err(RadiosityError::InvalidArgument { .. })));

        let zero = MatrixXf::zeros(2, 2);
        let b = VectorXf::from_vec(vec![1.0, 0.0]);
        assert!(matches!(pccg(&IterationControl::default(), &zero, None, &b, 1e-8, None),
                         Err(RadiosityError::Singular { iterations: 0, .. })));
    }

    #[test]
    fn test_pccg_breakdown_reports_completed_iterations() {
        // Semi-definite: the second search direction lies in the null space.
        let a = diag(&[1.0, 0.0]);
        let b = VectorXf::from_vec(vec![1.0, 1.0]);
        let err = pccg(&IterationControl::default(), &a, None, &b, 1e-10, None).unwrap_err();
        assert!(matches!(err, RadiosityError::Singular { context: "pccg", iterations: 1, .. }));
    }
}
