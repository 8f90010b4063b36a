//! A module for celerite kernel terms used as covariance of the GP.
//!
//! A term describes a stationary kernel as a mixture of exponentials through its
//! [KernelCoefficients]. Parameters are given as logarithms so that they remain positive.
//! The following terms are implemented:
//! * real: `a exp(-c tau)`,
//! * complex: `exp(-c tau) (a cos(d tau) + b sin(d tau))`,
//! * simple harmonic oscillator (SHO),
//!
//! and terms can be added together with `+`.

use crate::modeling::{impl_parameterized, ParameterSet, Parameterized};
use crate::{GpError, Result};
use celerite_solver::{kernel_matrix, KernelCoefficients};
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A trait for celerite kernel terms
pub trait Term<F: Float>: Parameterized<F> + Clone + fmt::Display + Send + Sync {
    /// Coefficients of the exponential mixture for current parameters
    fn coefficients(&self) -> KernelCoefficients<F>;

    /// Kernel value at lag `tau`
    fn value(&self, tau: F) -> F {
        self.coefficients().value(tau)
    }

    /// Dense kernel matrix between `x1` and `x2` coordinates
    fn matrix(
        &self,
        x1: &ArrayBase<impl Data<Elem = F>, Ix1>,
        x2: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        kernel_matrix(&self.coefficients(), x1, x2)
    }
}

macro_rules! declare_term {
    ($(#[$doc:meta])* $term:ident, [$($param:ident),+]) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(
            feature = "serializable",
            derive(Serialize, Deserialize),
            serde(bound(deserialize = "F: Deserialize<'de>"))
        )]
        pub struct $term<F: Float> {
            params: ParameterSet<F>,
        }

        impl<F: Float> $term<F> {
            /// Constructor given log parameters, all unbounded
            #[allow(non_snake_case)]
            pub fn new($($param: F),+) -> Self {
                $term {
                    params: ParameterSet::new(&[$((stringify!($param), $param)),+]),
                }
            }

            /// Set bounds of the named parameter
            pub fn with_bounds(mut self, name: &str, bounds: (F, F)) -> Result<Self> {
                self.params.set_bounds(name, bounds)?;
                Ok(self)
            }
        }

        impl<F: Float> fmt::Display for $term<F> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                let names = [$(stringify!($param)),+];
                let values = names
                    .iter()
                    .zip(self.params.values())
                    .map(|(n, v)| format!("{}={}", n, v))
                    .collect::<Vec<_>>();
                write!(f, "{}({})", stringify!($term), values.join(", "))
            }
        }

        impl<F: Float, R: Term<F>> Add<R> for $term<F> {
            type Output = TermSum<$term<F>, R>;

            fn add(self, rhs: R) -> Self::Output {
                TermSum::new(self, rhs)
            }
        }

        impl_parameterized!($term);
    };
}

declare_term!(
    /// A real exponential term `a exp(-c tau)`
    RealTerm,
    [log_a, log_c]
);

impl<F: Float> Term<F> for RealTerm<F> {
    fn coefficients(&self) -> KernelCoefficients<F> {
        let p = self.params.values();
        KernelCoefficients::real(p[0].exp(), p[1].exp())
    }
}

declare_term!(
    /// A complex exponential term `exp(-c tau) (a cos(d tau) + b sin(d tau))`
    ComplexTerm,
    [log_a, log_b, log_c, log_d]
);

impl<F: Float> Term<F> for ComplexTerm<F> {
    fn coefficients(&self) -> KernelCoefficients<F> {
        let p = self.params.values();
        KernelCoefficients::complex(p[0].exp(), p[1].exp(), p[2].exp(), p[3].exp())
    }
}

declare_term!(
    /// A stochastically driven, damped simple harmonic oscillator with power spectral density
    ///
    /// `S(w) = sqrt(2/pi) S0 w0^4 / ((w^2 - w0^2)^2 + w0^2 w^2 / Q^2)`
    ///
    /// The kernel is a complex term when the quality factor `Q >= 1/2`,
    /// a pair of real terms otherwise.
    SHOTerm,
    [log_S0, log_Q, log_omega0]
);

impl<F: Float> Term<F> for SHOTerm<F> {
    fn coefficients(&self) -> KernelCoefficients<F> {
        let p = self.params.values();
        let (s0, q, w0) = (p[0].exp(), p[1].exp(), p[2].exp());
        let half = F::cast(0.5);
        let four = F::cast(4.);
        if q >= half {
            let f = (four * q * q - F::one()).sqrt();
            KernelCoefficients {
                alpha_complex_real: Array1::from_elem(1, s0 * w0 * q),
                alpha_complex_imag: Array1::from_elem(1, s0 * w0 * q / f),
                beta_complex_real: Array1::from_elem(1, half * w0 / q),
                beta_complex_imag: Array1::from_elem(1, half * w0 / q * f),
                ..Default::default()
            }
        } else {
            let f = (F::one() - four * q * q).sqrt();
            let a = half * s0 * w0 * q;
            let c = half * w0 / q;
            KernelCoefficients {
                alpha_real: Array1::from(vec![
                    a * (F::one() + F::one() / f),
                    a * (F::one() - F::one() / f),
                ]),
                beta_real: Array1::from(vec![c * (F::one() - f), c * (F::one() + f)]),
                ..Default::default()
            }
        }
    }
}

const LEFT_PREFIX: &str = "terms[0]:";
const RIGHT_PREFIX: &str = "terms[1]:";

/// Sum of two kernel terms, built with `left + right`.
///
/// Parameter names are prefixed with `terms[0]:` for the left operand
/// and `terms[1]:` for the right one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct TermSum<A, B> {
    left: A,
    right: B,
}

impl<A, B> TermSum<A, B> {
    /// Constructor
    pub fn new(left: A, right: B) -> Self {
        TermSum { left, right }
    }

    /// Left operand
    pub fn left(&self) -> &A {
        &self.left
    }

    /// Right operand
    pub fn right(&self) -> &B {
        &self.right
    }
}

enum Operand<'a> {
    Left(&'a str),
    Right(&'a str),
}

fn split_operand(name: &str) -> Result<Operand<'_>> {
    if let Some(sub) = name.strip_prefix(LEFT_PREFIX) {
        Ok(Operand::Left(sub))
    } else if let Some(sub) = name.strip_prefix(RIGHT_PREFIX) {
        Ok(Operand::Right(sub))
    } else {
        Err(GpError::UnknownParameter(name.to_string()))
    }
}

impl<F: Float, A: Term<F>, B: Term<F>> Parameterized<F> for TermSum<A, B> {
    fn parameter_names(&self) -> Vec<String> {
        let left = self
            .left
            .parameter_names()
            .into_iter()
            .map(|n| format!("{LEFT_PREFIX}{n}"));
        let right = self
            .right
            .parameter_names()
            .into_iter()
            .map(|n| format!("{RIGHT_PREFIX}{n}"));
        left.chain(right).collect()
    }

    fn unfrozen_mask(&self) -> Vec<bool> {
        let mut mask = self.left.unfrozen_mask();
        mask.extend(self.right.unfrozen_mask());
        mask
    }

    fn parameter_vector(&self) -> Array1<F> {
        self.left
            .parameter_vector()
            .into_iter()
            .chain(self.right.parameter_vector())
            .collect()
    }

    fn set_parameter_vector(&mut self, v: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        let expected = self.vector_size();
        if v.len() != expected {
            return Err(GpError::DimensionMismatch {
                expected,
                actual: v.len(),
            });
        }
        let n = self.left.vector_size();
        self.left.set_parameter_vector(&v.slice(s![..n]))?;
        self.right.set_parameter_vector(&v.slice(s![n..]))
    }

    fn parameter_bounds(&self) -> Vec<(F, F)> {
        let mut bounds = self.left.parameter_bounds();
        bounds.extend(self.right.parameter_bounds());
        bounds
    }

    fn get_parameter(&self, name: &str) -> Result<F> {
        match split_operand(name)? {
            Operand::Left(sub) => self.left.get_parameter(sub),
            Operand::Right(sub) => self.right.get_parameter(sub),
        }
    }

    fn set_parameter(&mut self, name: &str, value: F) -> Result<()> {
        match split_operand(name)? {
            Operand::Left(sub) => self.left.set_parameter(sub, value),
            Operand::Right(sub) => self.right.set_parameter(sub, value),
        }
    }

    fn freeze_parameter(&mut self, name: &str) -> Result<()> {
        match split_operand(name)? {
            Operand::Left(sub) => self.left.freeze_parameter(sub),
            Operand::Right(sub) => self.right.freeze_parameter(sub),
        }
    }

    fn thaw_parameter(&mut self, name: &str) -> Result<()> {
        match split_operand(name)? {
            Operand::Left(sub) => self.left.thaw_parameter(sub),
            Operand::Right(sub) => self.right.thaw_parameter(sub),
        }
    }

    fn freeze_all_parameters(&mut self) {
        self.left.freeze_all_parameters();
        self.right.freeze_all_parameters();
    }

    fn thaw_all_parameters(&mut self) {
        self.left.thaw_all_parameters();
        self.right.thaw_all_parameters();
    }

    fn is_dirty(&self) -> bool {
        self.left.is_dirty() || self.right.is_dirty()
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.left.set_dirty(dirty);
        self.right.set_dirty(dirty);
    }

    fn log_prior(&self) -> F {
        self.left.log_prior() + self.right.log_prior()
    }
}

impl<F: Float, A: Term<F>, B: Term<F>> Term<F> for TermSum<A, B> {
    fn coefficients(&self) -> KernelCoefficients<F> {
        self.left.coefficients().concatenate(&self.right.coefficients())
    }
}

impl<A: fmt::Display, B: fmt::Display> fmt::Display for TermSum<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} + {}", self.left, self.right)
    }
}

impl<A, B, R> Add<R> for TermSum<A, B> {
    type Output = TermSum<TermSum<A, B>, R>;

    fn add(self, rhs: R) -> Self::Output {
        TermSum::new(self, rhs)
    }
}
