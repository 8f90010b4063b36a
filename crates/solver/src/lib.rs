//! This library implements solvers for covariance matrices built from
//! [celerite](https://celerite.readthedocs.io) kernels, that is kernels written as
//! a mixture of real and complex exponentials evaluated on one-dimensional sorted coordinates.
//!
//! Such matrices are semiseparable which allows factorization, solve, determinant and
//! matrix-vector products in O(N.J^2) operations, where N is the number of coordinates and
//! J the number of exponential terms, instead of O(N^3) for a dense Cholesky decomposition.
//!
//! Solvers implement the [Solver] trait:
//! * [CholeskySolver]: the scalable semiseparable LDL^T factorization,
//! * [DenseSolver]: a dense Cholesky reference implementation, only suitable for small N.
//!
//! # Reference:
//!
//! Foreman-Mackey, D., Agol, E., Ambikasaran, S., & Angus, R.
//! [Fast and scalable Gaussian process modeling with applications to astronomical time series](https://arxiv.org/abs/1703.09710),
//! The Astronomical Journal, 154(6), 220, 2017.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod cholesky;
mod coefficients;
mod dense;
mod errors;

pub use cholesky::*;
pub use coefficients::*;
pub use dense::*;
pub use errors::*;

use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2};

/// A trait for covariance matrix solvers.
///
/// The covariance matrix is `K = kernel(t, t) + diag`, where the kernel is given by its
/// [KernelCoefficients]. A solver is stateful: [Solver::compute] factorizes `K` and
/// the other queries are answered against the last successful factorization.
pub trait Solver<F: Float>: Default + Clone {
    /// Factorize the covariance matrix of the kernel described by `coeffs`
    /// at the (sorted) coordinates `t` with `diag` added on its diagonal.
    fn compute(
        &mut self,
        coeffs: &KernelCoefficients<F>,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        diag: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()>;

    /// Compute `K^-1.y` for a (n, nrhs) right-hand side `y`
    fn solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>>;

    /// Compute `y^t.K^-1.y`
    fn dot_solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F>;

    /// Logarithm of the determinant of the factorized matrix
    fn log_determinant(&self) -> Result<F>;

    /// Compute `kernel(t, t).y` for a (n, nrhs) `y`, the diagonal term is not included.
    ///
    /// This product does not depend on the current factorization.
    fn dot(
        &self,
        coeffs: &KernelCoefficients<F>,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Array2<F>>;

    /// Whether a factorization is available
    fn computed(&self) -> bool;

    /// Size of the factorized matrix (0 when not computed)
    fn size(&self) -> usize;
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        Err(SolverError::DimensionMismatch { expected, actual })
    } else {
        Ok(())
    }
}
