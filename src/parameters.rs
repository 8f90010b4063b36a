use crate::errors::{GpError, Result};
use crate::mean_models::{ConstantModel, Model};
use crate::terms::Term;
use crate::{GP_COBYLA_MAX_EVAL, GP_COBYLA_MIN_EVAL, GP_DEFAULT_YERR, GP_OPTIM_N_START};
use linfa::{Float, ParamGuard};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, K: Serialize, Mean: Serialize, Noise: Serialize",
        deserialize = "F: Deserialize<'de>, K: Deserialize<'de>, Mean: Deserialize<'de>, Noise: Deserialize<'de>"
    ))
)]
pub struct GpValidParams<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>> {
    /// Covariance kernel k(t, t')
    pub(crate) kernel: K,
    /// Model of the mean m(t)
    pub(crate) mean: Mean,
    /// Whether mean parameters are fitted or frozen
    pub(crate) fit_mean: bool,
    /// Model of the log variance of the white noise added to the diagonal
    pub(crate) log_white_noise: Noise,
    /// Whether white noise parameters are fitted or frozen
    pub(crate) fit_white_noise: bool,
    /// Observation uncertainty used when fitting a dataset
    pub(crate) yerr: F,
    /// Whether coordinates are checked to be sorted when computing
    pub(crate) check_sorted: bool,
    /// Number of internal likelihood optimization restart
    pub(crate) n_start: usize,
    /// Max number of internal likelihood evaluation during optimization
    pub(crate) max_eval: usize,
}

impl<F: Float, K: Term<F>> GpValidParams<F, K, ConstantModel<F>, ConstantModel<F>> {
    /// Default mean value
    pub const DEFAULT_MEAN: f64 = 0.;
    /// Default log white noise value, that is no white noise
    pub const DEFAULT_LOG_WHITE_NOISE: f64 = f64::NEG_INFINITY;

    pub(crate) fn new(kernel: K) -> Self {
        GpValidParams {
            kernel,
            mean: ConstantModel::new(F::cast(Self::DEFAULT_MEAN)),
            fit_mean: false,
            log_white_noise: ConstantModel::new(F::cast(Self::DEFAULT_LOG_WHITE_NOISE)),
            fit_white_noise: false,
            yerr: F::cast(GP_DEFAULT_YERR),
            check_sorted: true,
            n_start: GP_OPTIM_N_START,
            max_eval: GP_COBYLA_MAX_EVAL,
        }
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>> GpValidParams<F, K, Mean, Noise> {
    /// Get covariance kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Get mean model
    pub fn mean(&self) -> &Mean {
        &self.mean
    }

    /// Whether mean parameters are fitted
    pub fn fit_mean(&self) -> bool {
        self.fit_mean
    }

    /// Get log white noise model
    pub fn log_white_noise(&self) -> &Noise {
        &self.log_white_noise
    }

    /// Whether white noise parameters are fitted
    pub fn fit_white_noise(&self) -> bool {
        self.fit_white_noise
    }

    /// Get observation uncertainty used when fitting a dataset
    pub fn yerr(&self) -> F {
        self.yerr
    }

    /// Whether coordinates sortedness is checked
    pub fn check_sorted(&self) -> bool {
        self.check_sorted
    }

    /// Get the number of internal optimization restart
    pub fn n_start(&self) -> usize {
        self.n_start
    }

    /// Get the max number of internal likelihood evaluations during one optimization
    pub fn max_eval(&self) -> usize {
        self.max_eval
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](struct.GaussianProcess.html).
pub struct GpParams<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>>(
    GpValidParams<F, K, Mean, Noise>,
);

impl<F: Float, K: Term<F>> GpParams<F, K, ConstantModel<F>, ConstantModel<F>> {
    /// A constructor for GP parameters given the covariance kernel.
    ///
    /// The mean is constant equal to 0 and there is no white noise,
    /// both are frozen.
    pub fn new(kernel: K) -> Self {
        Self(GpValidParams::new(kernel))
    }
}

impl<F: Float, K: Term<F>, Noise: Model<F>> GpParams<F, K, ConstantModel<F>, Noise> {
    /// Set a constant mean value
    pub fn mean_value(mut self, value: F) -> Self {
        self.0.mean = ConstantModel::new(value);
        self
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>> GpParams<F, K, Mean, ConstantModel<F>> {
    /// Set a constant log white noise variance
    pub fn log_white_noise_value(mut self, value: F) -> Self {
        self.0.log_white_noise = ConstantModel::new(value);
        self
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>> GpParams<F, K, Mean, Noise> {
    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F, K, Mean, Noise>) -> Self {
        Self(params.clone())
    }

    /// Set covariance kernel.
    pub fn kernel<K2: Term<F>>(self, kernel: K2) -> GpParams<F, K2, Mean, Noise> {
        let p = self.0;
        GpParams(GpValidParams {
            kernel,
            mean: p.mean,
            fit_mean: p.fit_mean,
            log_white_noise: p.log_white_noise,
            fit_white_noise: p.fit_white_noise,
            yerr: p.yerr,
            check_sorted: p.check_sorted,
            n_start: p.n_start,
            max_eval: p.max_eval,
        })
    }

    /// Set mean model.
    pub fn mean<M2: Model<F>>(self, mean: M2) -> GpParams<F, K, M2, Noise> {
        let p = self.0;
        GpParams(GpValidParams {
            kernel: p.kernel,
            mean,
            fit_mean: p.fit_mean,
            log_white_noise: p.log_white_noise,
            fit_white_noise: p.fit_white_noise,
            yerr: p.yerr,
            check_sorted: p.check_sorted,
            n_start: p.n_start,
            max_eval: p.max_eval,
        })
    }

    /// Set log white noise model.
    pub fn log_white_noise<N2: Model<F>>(self, log_white_noise: N2) -> GpParams<F, K, Mean, N2> {
        let p = self.0;
        GpParams(GpValidParams {
            kernel: p.kernel,
            mean: p.mean,
            fit_mean: p.fit_mean,
            log_white_noise,
            fit_white_noise: p.fit_white_noise,
            yerr: p.yerr,
            check_sorted: p.check_sorted,
            n_start: p.n_start,
            max_eval: p.max_eval,
        })
    }

    /// Whether mean parameters are fitted, otherwise they are frozen
    pub fn fit_mean(mut self, fit_mean: bool) -> Self {
        self.0.fit_mean = fit_mean;
        self
    }

    /// Whether white noise parameters are fitted, otherwise they are frozen
    pub fn fit_white_noise(mut self, fit_white_noise: bool) -> Self {
        self.0.fit_white_noise = fit_white_noise;
        self
    }

    /// Set observation uncertainty used when fitting a dataset
    pub fn yerr(mut self, yerr: F) -> Self {
        self.0.yerr = yerr;
        self
    }

    /// Whether coordinates are checked to be sorted when fitting a dataset
    pub fn check_sorted(mut self, check_sorted: bool) -> Self {
        self.0.check_sorted = check_sorted;
        self
    }

    /// Set the number of internal likelihood optimization restarts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }

    /// Set the max number of internal likelihood evaluations during one optimization
    /// Given max_eval has to be greater than [crate::GP_COBYLA_MIN_EVAL] otherwise
    /// max_eval is set to [crate::GP_COBYLA_MIN_EVAL].
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.0.max_eval = GP_COBYLA_MIN_EVAL.max(max_eval);
        self
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>>
    From<GpValidParams<F, K, Mean, Noise>> for GpParams<F, K, Mean, Noise>
{
    fn from(valid: GpValidParams<F, K, Mean, Noise>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>> ParamGuard
    for GpParams<F, K, Mean, Noise>
{
    type Checked = GpValidParams<F, K, Mean, Noise>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !self.0.yerr.is_finite() || self.0.yerr < F::zero() {
            return Err(GpError::InvalidValueError(format!(
                "`yerr` should be a finite positive value, got {}",
                self.0.yerr
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
