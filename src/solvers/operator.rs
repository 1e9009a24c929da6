// Copyright @yucwang 2026

use crate::math::constants::{MatrixXf, VectorXf};

/// A linear map known only through its action on vectors.
pub trait LinearOperator {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    /// Returns `A * x`.
    fn apply(&self, x: &VectorXf) -> VectorXf;
}

/// Operators that can also apply their transpose, as LSQR requires.
pub trait AdjointOperator: LinearOperator {
    /// Returns `A^T * x`.
    fn apply_transpose(&self, x: &VectorXf) -> VectorXf;
}

impl LinearOperator for MatrixXf {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn apply(&self, x: &VectorXf) -> VectorXf {
        self * x
    }
}

impl AdjointOperator for MatrixXf {
    fn apply_transpose(&self, x: &VectorXf) -> VectorXf {
        self.tr_mul(x)
    }
}

/// Operator defined by a closure; whatever the closure captures plays the
/// role of the operator's parameters.
pub struct FnOperator<F> {
    rows: usize,
    cols: usize,
    f: F,
}

impl<F> FnOperator<F>
where
    F: Fn(&VectorXf) -> VectorXf,
{
    pub fn new(rows: usize, cols: usize, f: F) -> Self {
        Self { rows, cols, f }
    }
}

impl<F> LinearOperator for FnOperator<F>
where
    F: Fn(&VectorXf) -> VectorXf,
{
    fn nrows(&self) -> usize {
        self.rows
    }

    fn ncols(&self) -> usize {
        self.cols
    }

    fn apply(&self, x: &VectorXf) -> VectorXf {
        (self.f)(x)
    }
}

/// Diagonal (Jacobi) preconditioner: applies `diag(d)^-1`.
pub struct JacobiPreconditioner {
    inv_diagonal: VectorXf,
}

impl JacobiPreconditioner {
    /// Zero diagonal entries are left unscaled.
    pub fn new(diagonal: &VectorXf) -> Self {
        let inv_diagonal = diagonal.map(|d| if d != 0.0 { 1.0 / d } else { 1.0 });
        Self { inv_diagonal }
    }
}

impl LinearOperator for JacobiPreconditioner {
    fn nrows(&self) -> usize {
        self.inv_diagonal.len()
    }

    fn ncols(&self) -> usize {
        self.inv_diagonal.len()
    }

    fn apply(&self, x: &VectorXf) -> VectorXf {
        x.component_mul(&self.inv_diagonal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_operator_and_adjoint() {
        let a = MatrixXf::from_row_slice(2, 3, &[1.0, 2.0, 3.0,
                                                 4.0, 5.0, 6.0]);
        let y = LinearOperator::apply(&a, &VectorXf::from_vec(vec![1.0, 0.0, -1.0]));
        assert_eq!(y, VectorXf::from_vec(vec![-2.0, -2.0]));
        let z = a.apply_transpose(&VectorXf::from_vec(vec![1.0, 1.0]));
        assert_eq!(z, VectorXf::from_vec(vec![5.0, 7.0, 9.0]));
        assert_eq!(LinearOperator::nrows(&a), 2);
        assert_eq!(LinearOperator::ncols(&a), 3);
    }

    #[test]
    fn test_closure_operator() {
        let scale = 3.0;
        let op = FnOperator::new(2, 2, |x: &VectorXf| x * scale);
        assert_eq!(op.apply(&VectorXf::from_vec(vec![1.0, 2.0])), VectorXf::from_vec(vec![3.0, 6.0]));
    }

    #[test]
    fn test_jacobi_preconditioner() {
        let m = JacobiPreconditioner::new(&VectorXf::from_vec(vec![4.0, 0.0, 0.5]));
        let y = m.apply(&VectorXf::from_vec(vec![8.0, 3.0, 1.0]));
        assert_eq!(y, VectorXf::from_vec(vec![2.0, 3.0, 2.0]));
    }
}
