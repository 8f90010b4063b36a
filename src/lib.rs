//! This library implements scalable [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! regression on one-dimensional coordinates (typically time series) using
//! [celerite](https://celerite.readthedocs.io) kernels.
//!
//! A celerite kernel is a mixture of real and complex exponentials which makes the GP
//! covariance matrix semiseparable: its factorization, determinant and solves cost
//! O(N.J^2) operations instead of O(N^3) where N is the number of points and J the
//! number of exponential terms.
//!
//! The GP is implemented by [GaussianProcess], parameterized by [GpParams], and composed of:
//! * a mean model (see [mean_models]),
//! * a log white noise model (see [mean_models]),
//! * a covariance kernel (see [terms]).
//!
//! All of them expose their parameters through the [Parameterized] trait: parameters are
//! named, can be frozen or thawed, bounded and set from a flat vector, which is used to fit
//! them by maximizing the likelihood (see [GaussianProcess::optimize]).
//!
//! The covariance matrix factorization is delegated to a [Solver] of the `celerite-solver` crate.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod errors;
pub mod mean_models;
pub mod modeling;
pub mod terms;

mod parameters;

mod optimization;

pub use algorithm::*;
pub use errors::*;
pub use mean_models::{ConstantModel, LinearModel, Model};
pub use modeling::{ParameterSet, Parameterized};
pub use parameters::*;
pub use terms::{ComplexTerm, RealTerm, SHOTerm, Term, TermSum};

pub use celerite_solver::{CholeskySolver, DenseSolver, KernelCoefficients, Solver, SolverError};
