use thiserror::Error;

/// A result type for covariance solvers
pub type Result<T> = std::result::Result<T, SolverError>;

/// An error when factorizing or using a covariance matrix with a [`Solver`](crate::Solver)
#[derive(Error, Debug)]
pub enum SolverError {
    /// When a query is made before any successful factorization
    #[error("the solver must be computed first")]
    NotComputed,
    /// When array lengths are not consistent
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
    /// When kernel coefficient arrays do not describe a valid kernel
    #[error("Invalid coefficients: {0}")]
    InvalidCoefficients(String),
    /// When a pivot of the factorization is not strictly positive
    #[error("matrix is not positive definite (pivot {index})")]
    NotPositiveDefinite {
        /// Row index of the failing pivot
        index: usize,
    },
    #[error(transparent)]
    /// When dense linear algebra computation fails
    LinalgError(#[from] linfa_linalg::LinalgError),
}
