use crate::errors::{Result, SolverError};
use linfa::Float;
use ndarray::{concatenate, Array1, Axis};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Coefficients of a celerite kernel written as a sum of real and complex exponentials:
///
/// `k(tau) = sum_j a_j exp(-c_j tau) + sum_j exp(-c_j tau) (a_j cos(d_j tau) + b_j sin(d_j tau))`
///
/// where `tau = |t_i - t_j|`. Real terms are given by (`alpha_real`, `beta_real`),
/// complex terms by (`alpha_complex_real`, `alpha_complex_imag`, `beta_complex_real`, `beta_complex_imag`)
/// standing respectively for `a`, `b`, `c` and `d`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct KernelCoefficients<F: Float> {
    /// Amplitudes of real terms
    pub alpha_real: Array1<F>,
    /// Decay rates of real terms
    pub beta_real: Array1<F>,
    /// Cosine amplitudes of complex terms
    pub alpha_complex_real: Array1<F>,
    /// Sine amplitudes of complex terms
    pub alpha_complex_imag: Array1<F>,
    /// Decay rates of complex terms
    pub beta_complex_real: Array1<F>,
    /// Oscillation rates of complex terms
    pub beta_complex_imag: Array1<F>,
}

impl<F: Float> Default for KernelCoefficients<F> {
    fn default() -> Self {
        Self {
            alpha_real: Array1::zeros(0),
            beta_real: Array1::zeros(0),
            alpha_complex_real: Array1::zeros(0),
            alpha_complex_imag: Array1::zeros(0),
            beta_complex_real: Array1::zeros(0),
            beta_complex_imag: Array1::zeros(0),
        }
    }
}

impl<F: Float> KernelCoefficients<F> {
    /// Constructor checking that real and complex coefficient arrays are consistent
    pub fn new(
        alpha_real: Array1<F>,
        beta_real: Array1<F>,
        alpha_complex_real: Array1<F>,
        alpha_complex_imag: Array1<F>,
        beta_complex_real: Array1<F>,
        beta_complex_imag: Array1<F>,
    ) -> Result<Self> {
        if alpha_real.len() != beta_real.len() {
            return Err(SolverError::InvalidCoefficients(format!(
                "real coefficients lengths differ ({} != {})",
                alpha_real.len(),
                beta_real.len()
            )));
        }
        let nc = alpha_complex_real.len();
        if alpha_complex_imag.len() != nc
            || beta_complex_real.len() != nc
            || beta_complex_imag.len() != nc
        {
            return Err(SolverError::InvalidCoefficients(format!(
                "complex coefficients lengths differ ({}, {}, {}, {})",
                nc,
                alpha_complex_imag.len(),
                beta_complex_real.len(),
                beta_complex_imag.len()
            )));
        }
        Ok(Self {
            alpha_real,
            beta_real,
            alpha_complex_real,
            alpha_complex_imag,
            beta_complex_real,
            beta_complex_imag,
        })
    }

    /// Coefficients of a single real term `a exp(-c tau)`
    pub fn real(a: F, c: F) -> Self {
        Self {
            alpha_real: Array1::from_elem(1, a),
            beta_real: Array1::from_elem(1, c),
            ..Default::default()
        }
    }

    /// Coefficients of a single complex term `exp(-c tau) (a cos(d tau) + b sin(d tau))`
    pub fn complex(a: F, b: F, c: F, d: F) -> Self {
        Self {
            alpha_complex_real: Array1::from_elem(1, a),
            alpha_complex_imag: Array1::from_elem(1, b),
            beta_complex_real: Array1::from_elem(1, c),
            beta_complex_imag: Array1::from_elem(1, d),
            ..Default::default()
        }
    }

    /// Number of real terms
    pub fn n_real(&self) -> usize {
        self.alpha_real.len()
    }

    /// Number of complex terms
    pub fn n_complex(&self) -> usize {
        self.alpha_complex_real.len()
    }

    /// Width of the semiseparable representation: one column per real term, two per complex term
    pub fn width(&self) -> usize {
        self.n_real() + 2 * self.n_complex()
    }

    /// Coefficients of the sum of two kernels
    pub fn concatenate(&self, other: &Self) -> Self {
        let cat = |a: &Array1<F>, b: &Array1<F>| concatenate![Axis(0), a.view(), b.view()];
        Self {
            alpha_real: cat(&self.alpha_real, &other.alpha_real),
            beta_real: cat(&self.beta_real, &other.beta_real),
            alpha_complex_real: cat(&self.alpha_complex_real, &other.alpha_complex_real),
            alpha_complex_imag: cat(&self.alpha_complex_imag, &other.alpha_complex_imag),
            beta_complex_real: cat(&self.beta_complex_real, &other.beta_complex_real),
            beta_complex_imag: cat(&self.beta_complex_imag, &other.beta_complex_imag),
        }
    }

    /// Kernel value at zero lag, i.e. the sum of the cosine amplitudes
    pub fn value_at_zero(&self) -> F {
        self.alpha_real.sum() + self.alpha_complex_real.sum()
    }

    /// Kernel value at lag `tau`
    pub fn value(&self, tau: F) -> F {
        let tau = tau.abs();
        let mut k = F::zero();
        for (a, c) in self.alpha_real.iter().zip(self.beta_real.iter()) {
            k += *a * (-*c * tau).exp();
        }
        for j in 0..self.n_complex() {
            let (sin, cos) = (self.beta_complex_imag[j] * tau).sin_cos();
            k += (-self.beta_complex_real[j] * tau).exp()
                * (self.alpha_complex_real[j] * cos + self.alpha_complex_imag[j] * sin);
        }
        k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_new_checks_lengths() {
        let res = KernelCoefficients::new(
            array![1.0, 2.0],
            array![1.0],
            array![],
            array![],
            array![],
            array![],
        );
        assert!(matches!(res, Err(SolverError::InvalidCoefficients(_))));
    }

    #[test]
    fn test_value() {
        let coeffs = KernelCoefficients::real(2.0, 0.5).concatenate(&KernelCoefficients::complex(
            1.0, 0.3, 0.2, 1.5,
        ));
        assert_eq!(coeffs.width(), 3);
        assert_abs_diff_eq!(coeffs.value_at_zero(), 3.0);
        assert_abs_diff_eq!(coeffs.value(0.0), 3.0);
        let tau: f64 = 1.2;
        let expected = 2.0 * (-0.5 * tau).exp()
            + (-0.2 * tau).exp() * ((1.5 * tau).cos() + 0.3 * (1.5 * tau).sin());
        assert_abs_diff_eq!(coeffs.value(tau), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(coeffs.value(-tau), expected, epsilon = 1e-12);
    }
}
