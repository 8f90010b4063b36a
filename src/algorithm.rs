use crate::errors::{GpError, Result};
use crate::mean_models::{ConstantModel, Model};
use crate::modeling::Parameterized;
use crate::optimization::{into_f64, optimize_params, prepare_multistart, CobylaParams};
use crate::parameters::{GpParams, GpValidParams};
use crate::terms::Term;
use celerite_solver::{CholeskySolver, Solver};

use linfa::prelude::{DatasetBase, Fit, Float};
use linfa_linalg::cholesky::*;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;

/// Default number of multistart for parameters optimization
pub const GP_OPTIM_N_START: usize = 10;
/// Minimum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MIN_EVAL: usize = 25;
/// Maximum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MAX_EVAL: usize = 1000;
/// Default observation uncertainty
pub const GP_DEFAULT_YERR: f64 = 1.123e-12;

/// Sub-models composing a [GaussianProcess]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    /// Mean model
    Mean,
    /// Log white noise model
    Noise,
    /// Covariance kernel
    Kernel,
}

impl Component {
    /// All components in parameter vector order
    pub const ALL: [Component; 3] = [Component::Mean, Component::Noise, Component::Kernel];

    /// Prefix of the component parameter names
    pub fn prefix(&self) -> &'static str {
        match self {
            Component::Mean => "mean",
            Component::Noise => "log_white_noise",
            Component::Kernel => "kernel",
        }
    }
}

/// A parsed `<component>:<name>` parameter name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterPath<'a> {
    /// Sub-model owning the parameter
    pub component: Component,
    /// Parameter name within the sub-model
    pub name: &'a str,
}

impl<'a> ParameterPath<'a> {
    /// Parse a composite parameter name
    pub fn parse(name: &'a str) -> Result<Self> {
        name.split_once(':')
            .and_then(|(prefix, sub)| {
                Component::ALL
                    .into_iter()
                    .find(|c| c.prefix() == prefix)
                    .map(|component| ParameterPath {
                        component,
                        name: sub,
                    })
            })
            .ok_or_else(|| GpError::UnknownParameter(name.to_string()))
    }
}

/// Report lookup failures of a sub-model with the full composite name
fn with_full_name<T>(res: Result<T>, name: &str) -> Result<T> {
    res.map_err(|err| match err {
        GpError::UnknownParameter(_) => GpError::UnknownParameter(name.to_string()),
        err => err,
    })
}

/// Observation uncertainty given to [GaussianProcess::compute]
#[derive(Clone, Debug, PartialEq)]
pub enum Yerr<F: Float> {
    /// Same uncertainty for every point
    Scalar(F),
    /// One uncertainty per point
    PerPoint(Array1<F>),
}

impl<F: Float> From<F> for Yerr<F> {
    fn from(yerr: F) -> Self {
        Yerr::Scalar(yerr)
    }
}

impl<F: Float> From<Array1<F>> for Yerr<F> {
    fn from(yerr: Array1<F>) -> Self {
        Yerr::PerPoint(yerr)
    }
}

/// Gaussian Process over one-dimensional coordinates with a celerite kernel
///
/// The GP is made of three sub-models:
/// * a mean model `m(t)`,
/// * a model of the log variance of an additional white noise `log_white_noise(t)`,
/// * a covariance kernel `k(tau)` expressed as a mixture of exponentials (see [Term]).
///
/// Given coordinates `t` and observation uncertainties `yerr`, the covariance matrix is
///
/// `K = k(t, t) + diag(yerr^2 + exp(log_white_noise(t)))`
///
/// and is factorized by a [Solver] in O(N.J^2) operations where J is the number of
/// exponential terms of the kernel.
///
/// The GP keeps track of its state: any change of a sub-model parameter makes it dirty
/// and the factorization is lazily recomputed with the last coordinates given
/// to [GaussianProcess::compute] before being used.
///
/// # Example
///
/// ```
/// use celerite::{GaussianProcess, RealTerm};
/// use ndarray::Array;
///
/// let t = Array::linspace(0., 10., 50);
/// let y = t.mapv(|v: f64| v.sin());
///
/// let mut gp = GaussianProcess::new(RealTerm::new(0., 0.));
/// gp.compute(&t, 0.1).expect("GP computed");
/// let loglike = gp.log_likelihood(&y).expect("log likelihood");
/// let mu = gp.predict(&y, Some(Array::linspace(0., 10., 200).view())).expect("prediction");
/// ```
///
/// # Reference
///
/// Foreman-Mackey, D., Agol, E., Ambikasaran, S., & Angus, R.
/// [Fast and scalable Gaussian process modeling with applications to astronomical time series](https://arxiv.org/abs/1703.09710),
/// The Astronomical Journal, 154(6), 220, 2017.
#[derive(Clone, Debug)]
pub struct GaussianProcess<
    F: Float,
    K: Term<F>,
    Mean: Model<F> = ConstantModel<F>,
    Noise: Model<F> = ConstantModel<F>,
    S: Solver<F> = CholeskySolver<F>,
> {
    kernel: K,
    mean: Mean,
    log_white_noise: Noise,
    /// Created on first compute then reused
    solver: Option<S>,
    computed: bool,
    /// Coordinates given at last compute
    t: Option<Array1<F>>,
    /// Observation uncertainties given at last compute
    yerr: Option<Array1<F>>,
}

impl<F: Float, K: Term<F>> GaussianProcess<F, K> {
    /// Gp parameters constructor given the covariance kernel
    pub fn params(kernel: K) -> GpParams<F, K, ConstantModel<F>, ConstantModel<F>> {
        GpParams::new(kernel)
    }

    /// Constructor with default (frozen) mean equal to 0 and no white noise
    pub fn new(kernel: K) -> Self {
        GpValidParams::new(kernel).build()
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>> GpValidParams<F, K, Mean, Noise> {
    /// Build the GP with the default [CholeskySolver]
    pub fn build(&self) -> GaussianProcess<F, K, Mean, Noise> {
        self.build_with_solver()
    }

    /// Build the GP with the given solver type.
    ///
    /// Sub-models which are not fitted get all their parameters frozen.
    pub fn build_with_solver<S: Solver<F>>(&self) -> GaussianProcess<F, K, Mean, Noise, S> {
        let mut mean = self.mean().clone();
        if !self.fit_mean() {
            mean.freeze_all_parameters();
        }
        let mut log_white_noise = self.log_white_noise().clone();
        if !self.fit_white_noise() {
            log_white_noise.freeze_all_parameters();
        }
        GaussianProcess {
            kernel: self.kernel().clone(),
            mean,
            log_white_noise,
            solver: None,
            computed: false,
            t: None,
            yerr: None,
        }
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>, S: Solver<F>> fmt::Display
    for GaussianProcess<F, K, Mean, Noise, S>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(mean={}, log_white_noise={}, kernel={})",
            self.mean, self.log_white_noise, self.kernel
        )
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>, S: Solver<F>>
    GaussianProcess<F, K, Mean, Noise, S>
{
    /// Covariance kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Mutable covariance kernel, parameter changes make the GP dirty
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    /// Mean model
    pub fn mean(&self) -> &Mean {
        &self.mean
    }

    /// Mutable mean model, parameter changes make the GP dirty
    pub fn mean_mut(&mut self) -> &mut Mean {
        &mut self.mean
    }

    /// Log white noise model
    pub fn log_white_noise(&self) -> &Noise {
        &self.log_white_noise
    }

    /// Mutable log white noise model, parameter changes make the GP dirty
    pub fn log_white_noise_mut(&mut self) -> &mut Noise {
        &mut self.log_white_noise
    }

    /// Coordinates given at last compute
    pub fn t(&self) -> Option<&Array1<F>> {
        self.t.as_ref()
    }

    /// Whether the factorization is up to date
    pub fn computed(&self) -> bool {
        !self.is_dirty()
    }

    /// Force the factorization to be recomputed at next use
    pub fn mark_dirty(&mut self) {
        self.set_dirty(true);
    }

    /// Factorize the covariance matrix at sorted coordinates `t`.
    ///
    /// `yerr` is either a scalar or an array of `t` length
    pub fn compute(
        &mut self,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        yerr: impl Into<Yerr<F>>,
    ) -> Result<()> {
        self.compute_with(t, yerr, true)
    }

    /// Factorize the covariance matrix at coordinates `t`,
    /// their sortedness is only checked when `check_sorted` is true.
    pub fn compute_with(
        &mut self,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        yerr: impl Into<Yerr<F>>,
        check_sorted: bool,
    ) -> Result<()> {
        if check_sorted && t.windows(2).into_iter().any(|w| w[1] < w[0]) {
            return Err(GpError::UnsortedInput);
        }
        let yerr = match yerr.into() {
            Yerr::Scalar(v) => Array1::from_elem(t.len(), v),
            Yerr::PerPoint(e) if e.len() == 1 => Array1::from_elem(t.len(), e[0]),
            Yerr::PerPoint(e) => {
                if e.len() != t.len() {
                    return Err(GpError::DimensionMismatch {
                        expected: t.len(),
                        actual: e.len(),
                    });
                }
                e
            }
        };
        self.t = Some(t.to_owned());
        self.yerr = Some(yerr);
        self.recompute()
    }

    fn recompute(&mut self) -> Result<()> {
        self.computed = false;
        let (t, yerr) = match (&self.t, &self.yerr) {
            (Some(t), Some(yerr)) => (t, yerr),
            _ => return Err(GpError::NotComputed),
        };
        let diag = self.diag(t, yerr);
        let coeffs = self.kernel.coefficients();
        debug!(
            "Factorize covariance of size {} with {} real and {} complex terms",
            t.len(),
            coeffs.n_real(),
            coeffs.n_complex()
        );
        self.solver
            .get_or_insert_with(S::default)
            .compute(&coeffs, t, &diag)?;
        self.set_dirty(false);
        Ok(())
    }

    /// Recompute the factorization if any parameter changed since last compute
    fn try_ensure_clean(&mut self) -> Result<()> {
        if self.is_dirty() {
            if self.t.is_none() {
                return Err(GpError::NotComputed);
            }
            debug!("GP is dirty, recompute factorization");
            self.recompute()?;
        }
        Ok(())
    }

    fn coordinates(&self) -> Result<(&Array1<F>, &Array1<F>)> {
        match (&self.t, &self.yerr) {
            (Some(t), Some(yerr)) => Ok((t, yerr)),
            _ => Err(GpError::NotComputed),
        }
    }

    fn solver(&self) -> Result<&S> {
        self.solver.as_ref().ok_or(GpError::NotComputed)
    }

    /// Check `y` against bound coordinates and return residuals `y - m(t)`
    fn process_input(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        let (t, _) = self.coordinates()?;
        if t.len() != y.len() {
            return Err(GpError::DimensionMismatch {
                expected: t.len(),
                actual: y.len(),
            });
        }
        Ok(y - &self.mean.value(t))
    }

    fn diag(&self, t: &Array1<F>, yerr: &Array1<F>) -> Array1<F> {
        yerr.mapv(|e| e * e) + self.log_white_noise.value(t).mapv(|v| v.exp())
    }

    /// Log likelihood of observations `y` at coordinates given at last compute
    pub fn log_likelihood(&mut self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        let resid = self.process_input(y)?;
        self.try_ensure_clean()?;
        let solver = self.solver()?;
        let n = F::cast(resid.len());
        let log_2pi = F::cast(2. * std::f64::consts::PI).ln();
        Ok(F::cast(-0.5) * (solver.dot_solve(&resid)? + solver.log_determinant()? + n * log_2pi))
    }

    /// Compute `K^-1.y` for a (n, nrhs) `y`
    pub fn apply_inverse(&mut self, y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let (t, _) = self.coordinates()?;
        if t.len() != y.nrows() {
            return Err(GpError::DimensionMismatch {
                expected: t.len(),
                actual: y.nrows(),
            });
        }
        self.try_ensure_clean()?;
        Ok(self.solver()?.solve(y)?)
    }

    /// Compute `k(t, t).y` for a (n, nrhs) `y`, the diagonal is not included
    pub fn dot(&self, y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let (t, _) = self.coordinates()?;
        let coeffs = self.kernel.coefficients();
        let res = match &self.solver {
            Some(solver) => solver.dot(&coeffs, t, y)?,
            None => S::default().dot(&coeffs, t, y)?,
        };
        Ok(res)
    }

    /// Predict the conditional mean at `t` coordinates given observations `y`.
    ///
    /// At training coordinates (`t` is None) the mean is `m(t) + y - diag * K^-1.(y - m(t))`
    /// where `diag` holds `yerr^2 + exp(log_white_noise(t))`.
    pub fn predict(
        &mut self,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        t: Option<ArrayView1<F>>,
    ) -> Result<Array1<F>> {
        let resid = self.process_input(y)?;
        self.try_ensure_clean()?;
        let alpha = self
            .solver()?
            .solve(&resid.view().insert_axis(Axis(1)))?
            .remove_axis(Axis(1));
        let (t_train, yerr) = self.coordinates()?;
        match t {
            None => {
                let mut mu = self.mean.value(t_train) + y;
                Zip::from(&mut mu)
                    .and(&self.diag(t_train, yerr))
                    .and(&alpha)
                    .for_each(|m, &d, &a| *m -= d * a);
                Ok(mu)
            }
            Some(xs) => {
                let kxs = self.kernel.matrix(&xs, t_train);
                Ok(self.mean.value(&xs) + kxs.dot(&alpha))
            }
        }
    }

    /// Returns `(xs, Kxs^T, K^-1.Kxs^T)` for predictive variance and covariance
    fn predictive_terms(&self, t: Option<ArrayView1<F>>) -> Result<(Array1<F>, Array2<F>, Array2<F>)> {
        let (t_train, _) = self.coordinates()?;
        let xs = t.map_or_else(|| t_train.to_owned(), |t| t.to_owned());
        let kxs_t = self.kernel.matrix(t_train, &xs);
        let inv = self.solver()?.solve(&kxs_t)?;
        Ok((xs, kxs_t, inv))
    }

    /// Predict the conditional mean and variance at `t` coordinates given observations `y`,
    /// at training coordinates when `t` is None
    pub fn predict_var(
        &mut self,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        t: Option<ArrayView1<F>>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let mu = self.predict(y, t)?;
        let (_, kxs_t, inv) = self.predictive_terms(t)?;
        let k0 = self.kernel.value(F::zero());
        let var = (&kxs_t * &inv).sum_axis(Axis(0)).mapv(|v| k0 - v);
        Ok((mu, var))
    }

    /// Predict the conditional mean and covariance at `t` coordinates given observations `y`,
    /// at training coordinates when `t` is None
    pub fn predict_cov(
        &mut self,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        t: Option<ArrayView1<F>>,
    ) -> Result<(Array1<F>, Array2<F>)> {
        let mu = self.predict(y, t)?;
        let (xs, kxs_t, inv) = self.predictive_terms(t)?;
        let cov = self.kernel.matrix(&xs, &xs) - kxs_t.t().dot(&inv);
        Ok((mu, cov))
    }

    /// Covariance matrix
    ///
    /// * `x1` and `x2` None: covariance at training coordinates, the diagonal
    ///   `yerr^2 + exp(log_white_noise(t))` is added unless `include_diagonal` is `Some(false)`,
    /// * `x1` only: kernel matrix at `x1`, `exp(log_white_noise(x1))` is added on the diagonal
    ///   only when `include_diagonal` is `Some(true)`,
    /// * `x1` and `x2`: cross kernel matrix.
    pub fn get_matrix(
        &mut self,
        x1: Option<ArrayView1<F>>,
        x2: Option<ArrayView1<F>>,
        include_diagonal: Option<bool>,
    ) -> Result<Array2<F>> {
        match (x1, x2) {
            (None, None) => {
                self.try_ensure_clean()?;
                let (t, yerr) = self.coordinates()?;
                let mut k = self.kernel.matrix(t, t);
                if include_diagonal.unwrap_or(true) {
                    Zip::from(k.diag_mut())
                        .and(&self.diag(t, yerr))
                        .for_each(|k, &d| *k += d);
                }
                Ok(k)
            }
            (Some(x1), None) => Ok(self.prior_matrix(&x1, include_diagonal == Some(true))),
            (Some(x1), Some(x2)) => Ok(self.kernel.matrix(&x1, &x2)),
            (None, Some(_)) => Err(GpError::InvalidValueError(
                "`x1` has to be given along with `x2`".to_string(),
            )),
        }
    }

    fn prior_matrix(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, with_noise: bool) -> Array2<F> {
        let mut k = self.kernel.matrix(x, x);
        if with_noise {
            Zip::from(k.diag_mut())
                .and(&self.log_white_noise.value(x))
                .for_each(|k, &n| *k += n.exp());
        }
        k
    }

    /// Sample `size` trajectories of the GP prior at `x` coordinates
    ///
    /// Returns a (x.len(), size) matrix, one trajectory per column.
    /// `tiny` is added to the diagonal for numerical stability.
    pub fn sample(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        tiny: F,
        size: usize,
    ) -> Result<Array2<F>> {
        self.sample_with_rng(x, tiny, size, &mut Xoshiro256Plus::from_entropy())
    }

    /// Sample `size` trajectories of the GP prior at `x` coordinates using the given random generator
    pub fn sample_with_rng<R: Rng>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        tiny: F,
        size: usize,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        let mut k = self.prior_matrix(x, true);
        k.diag_mut().mapv_inplace(|v| v + tiny);
        let c = k.cholesky()?;
        let z = Array2::<f64>::random_using((x.len(), size), StandardNormal, rng).mapv(F::cast);
        Ok(self.mean.value(x).insert_axis(Axis(1)) + c.dot(&z))
    }

    /// Names of thawed parameters, in parameter vector order
    fn unfrozen_names(&self) -> Vec<String> {
        self.parameter_names()
            .into_iter()
            .zip(self.unfrozen_mask())
            .filter(|(_, thawed)| *thawed)
            .map(|(name, _)| name)
            .collect()
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>, S: Solver<F> + Send + Sync>
    GaussianProcess<F, K, Mean, Noise, S>
{
    /// Maximize `log_likelihood(y) + log_prior()` with respect to thawed parameters
    /// using default optimizer settings, see [GaussianProcess::optimize_with]
    pub fn optimize(&mut self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        self.optimize_with(y, GP_OPTIM_N_START, GP_COBYLA_MAX_EVAL)
    }

    /// Maximize `log_likelihood(y) + log_prior()` with respect to thawed parameters.
    ///
    /// The optimization is run with COBYLA from the current parameters and from `n_start`
    /// random starting points within parameter bounds. The GP is left computed with the
    /// best parameters found whose log likelihood is returned.
    pub fn optimize_with(
        &mut self,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_start: usize,
        max_eval: usize,
    ) -> Result<F> {
        let names = self.unfrozen_names();
        if names.is_empty() {
            return self.log_likelihood(y);
        }
        let n = self.process_input(y)?.len();
        debug!("Optimize {} parameters on {} points", names.len(), n);
        let y = y.to_owned();

        let objfn = |x: &[f64], gp: &mut Self| -> f64 {
            // optimizer may return nan values
            if x.iter().any(|v| v.is_nan()) {
                return f64::INFINITY;
            }
            for (name, v) in names.iter().zip(x) {
                if gp.set_parameter(name, F::cast(*v)).is_err() {
                    return f64::INFINITY;
                }
            }
            let lp = gp.log_prior();
            if !lp.is_finite() {
                return f64::INFINITY;
            }
            match gp.log_likelihood(&y) {
                Ok(ll) if ll.is_finite() => -into_f64(ll + lp),
                _ => f64::INFINITY,
            }
        };

        let x0 = self.parameter_vector();
        let f0 = objfn(&x0.mapv(into_f64).to_vec(), &mut self.clone());
        let (starts, bounds) = prepare_multistart(n_start, &x0, &self.parameter_bounds());
        debug!("Optimize with multistart x0 = {starts:?} and bounds = {bounds:?}");
        let now = Instant::now();
        let gp: &Self = self;
        let best = (0..starts.nrows())
            .into_par_iter()
            .map(|i| {
                optimize_params(
                    objfn,
                    &starts.row(i).to_owned(),
                    &bounds,
                    gp.clone(),
                    CobylaParams {
                        maxeval: (10 * starts.ncols()).clamp(GP_COBYLA_MIN_EVAL, max_eval),
                        ..CobylaParams::default()
                    },
                )
            })
            .reduce(
                || (f0, x0.mapv(into_f64)),
                |a, b| if b.0 < a.0 { b } else { a },
            );
        debug!("elapsed optim = {:?}", now.elapsed().as_millis());
        if !best.0.is_finite() {
            warn!("Optimization failed to find finite log likelihood, parameters are left unchanged");
        }

        for (name, v) in names.iter().zip(best.1.iter()) {
            self.set_parameter(name, F::cast(*v))?;
        }
        let loglike = self.log_likelihood(&y)?;
        info!("Optimized log likelihood = {loglike} with {self}");
        Ok(loglike)
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>, S: Solver<F>> Parameterized<F>
    for GaussianProcess<F, K, Mean, Noise, S>
{
    fn parameter_names(&self) -> Vec<String> {
        let prefixed = |c: Component, names: Vec<String>| {
            names
                .into_iter()
                .map(move |n| format!("{}:{}", c.prefix(), n))
        };
        prefixed(Component::Mean, self.mean.parameter_names())
            .chain(prefixed(
                Component::Noise,
                self.log_white_noise.parameter_names(),
            ))
            .chain(prefixed(Component::Kernel, self.kernel.parameter_names()))
            .collect()
    }

    fn unfrozen_mask(&self) -> Vec<bool> {
        let mut mask = self.mean.unfrozen_mask();
        mask.extend(self.log_white_noise.unfrozen_mask());
        mask.extend(self.kernel.unfrozen_mask());
        mask
    }

    fn parameter_vector(&self) -> Array1<F> {
        self.mean
            .parameter_vector()
            .into_iter()
            .chain(self.log_white_noise.parameter_vector())
            .chain(self.kernel.parameter_vector())
            .collect()
    }

    /// Set thawed parameter values.
    ///
    /// The input is split with respect to sub-models full sizes (frozen parameters included),
    /// hence it fails as soon as a mean or noise parameter is frozen.
    /// Use [Parameterized::set_parameter] in that case.
    fn set_parameter_vector(&mut self, v: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        let expected = self.vector_size();
        if v.len() != expected {
            return Err(GpError::DimensionMismatch {
                expected,
                actual: v.len(),
            });
        }
        let n = v.len();
        let i1 = self.mean.full_size().min(n);
        let i2 = (i1 + self.log_white_noise.full_size()).min(n);
        let sizes = [
            (self.mean.vector_size(), i1),
            (self.log_white_noise.vector_size(), i2 - i1),
            (self.kernel.vector_size(), n - i2),
        ];
        for (expected, actual) in sizes {
            if expected != actual {
                return Err(GpError::DimensionMismatch { expected, actual });
            }
        }
        self.mean.set_parameter_vector(&v.slice(s![..i1]))?;
        self.log_white_noise
            .set_parameter_vector(&v.slice(s![i1..i2]))?;
        self.kernel.set_parameter_vector(&v.slice(s![i2..]))?;
        self.mark_dirty();
        Ok(())
    }

    fn parameter_bounds(&self) -> Vec<(F, F)> {
        let mut bounds = self.mean.parameter_bounds();
        bounds.extend(self.log_white_noise.parameter_bounds());
        bounds.extend(self.kernel.parameter_bounds());
        bounds
    }

    fn get_parameter(&self, name: &str) -> Result<F> {
        let path = ParameterPath::parse(name)?;
        let res = match path.component {
            Component::Mean => self.mean.get_parameter(path.name),
            Component::Noise => self.log_white_noise.get_parameter(path.name),
            Component::Kernel => self.kernel.get_parameter(path.name),
        };
        with_full_name(res, name)
    }

    fn set_parameter(&mut self, name: &str, value: F) -> Result<()> {
        let path = ParameterPath::parse(name)?;
        self.mark_dirty();
        let res = match path.component {
            Component::Mean => self.mean.set_parameter(path.name, value),
            Component::Noise => self.log_white_noise.set_parameter(path.name, value),
            Component::Kernel => self.kernel.set_parameter(path.name, value),
        };
        with_full_name(res, name)
    }

    fn freeze_parameter(&mut self, name: &str) -> Result<()> {
        let path = ParameterPath::parse(name)?;
        let res = match path.component {
            Component::Mean => self.mean.freeze_parameter(path.name),
            Component::Noise => self.log_white_noise.freeze_parameter(path.name),
            Component::Kernel => self.kernel.freeze_parameter(path.name),
        };
        with_full_name(res, name)
    }

    fn thaw_parameter(&mut self, name: &str) -> Result<()> {
        let path = ParameterPath::parse(name)?;
        let res = match path.component {
            Component::Mean => self.mean.thaw_parameter(path.name),
            Component::Noise => self.log_white_noise.thaw_parameter(path.name),
            Component::Kernel => self.kernel.thaw_parameter(path.name),
        };
        with_full_name(res, name)
    }

    fn freeze_all_parameters(&mut self) {
        self.mean.freeze_all_parameters();
        self.log_white_noise.freeze_all_parameters();
        self.kernel.freeze_all_parameters();
    }

    fn thaw_all_parameters(&mut self) {
        self.mean.thaw_all_parameters();
        self.log_white_noise.thaw_all_parameters();
        self.kernel.thaw_all_parameters();
    }

    fn is_dirty(&self) -> bool {
        self.mean.is_dirty()
            || self.log_white_noise.is_dirty()
            || self.kernel.is_dirty()
            || !self.computed
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.computed = !dirty;
        self.mean.set_dirty(dirty);
        self.log_white_noise.set_dirty(dirty);
        self.kernel.set_dirty(dirty);
    }

    fn log_prior(&self) -> F {
        let lp =
            self.mean.log_prior() + self.log_white_noise.log_prior() + self.kernel.log_prior();
        if lp.is_finite() {
            lp
        } else {
            F::neg_infinity()
        }
    }
}

impl<F: Float, K: Term<F>, Mean: Model<F>, Noise: Model<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, K, Mean, Noise>
{
    type Object = GaussianProcess<F, K, Mean, Noise>;

    /// Fit GP parameters using maximum likelihood.
    ///
    /// Records are expected to be a (n, 1) matrix of coordinates.
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        if x.ncols() != 1 {
            return Err(GpError::DimensionMismatch {
                expected: 1,
                actual: x.ncols(),
            });
        }
        let mut gp = self.build();
        gp.compute_with(&x.column(0), self.yerr(), self.check_sorted())?;
        if gp.vector_size() > 0 {
            gp.optimize_with(dataset.targets(), self.n_start(), self.max_eval())?;
        }
        Ok(gp)
    }
}
