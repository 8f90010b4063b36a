use thiserror::Error;

/// A result type for celerite GP computations
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when using a [`GaussianProcess`](crate::GaussianProcess) or one of its models
#[derive(Error, Debug)]
pub enum GpError {
    /// When an operation needs a factorization but coordinates were never bound
    #[error("you must call 'compute' first")]
    NotComputed,
    /// When coordinates are not sorted in ascending order
    #[error("the input coordinates must be sorted")]
    UnsortedInput,
    /// When array lengths are not consistent
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
    /// When a parameter name does not resolve to a known parameter
    #[error("unrecognized parameter '{0}'")]
    UnknownParameter(String),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
    /// When the covariance solver fails
    #[error(transparent)]
    SolverError(#[from] celerite_solver::SolverError),
    #[error(transparent)]
    /// When dense linear algebra computation fails
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
