use linfa::Float;
use ndarray::{s, Array1, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Half width of the search interval used for multistart around the initial value
/// of a parameter without finite bound.
pub(crate) const UNBOUNDED_SPAN: f64 = 5.;

pub(crate) struct CobylaParams {
    pub rhobeg: f64,
    pub ftol_rel: f64,
    pub maxeval: usize,
}

impl Default for CobylaParams {
    fn default() -> Self {
        CobylaParams {
            rhobeg: 0.5,
            ftol_rel: 1e-4,
            maxeval: 200,
        }
    }
}

/// Returns multistart initial points, the first one being `x0`, and finite bounds
/// for the optimizer
pub(crate) fn prepare_multistart<F: Float>(
    n_start: usize,
    x0: &Array1<F>,
    bounds: &[(F, F)],
) -> (Array2<f64>, Vec<(f64, f64)>) {
    let x0 = x0.mapv(into_f64);
    let bounds: Vec<(f64, f64)> = bounds
        .iter()
        .zip(x0.iter())
        .map(|((lo, up), x)| {
            let center = if x.is_finite() { *x } else { 0. };
            let lo = into_f64(*lo);
            let up = into_f64(*up);
            (
                if lo.is_finite() { lo } else { center - UNBOUNDED_SPAN },
                if up.is_finite() { up } else { center + UNBOUNDED_SPAN },
            )
        })
        .collect();

    let mut x0s = Array2::zeros((n_start + 1, x0.len()));
    x0s.row_mut(0).assign(&x0);
    // Use a seed for reproducibility, random values are only used
    // to spread starting points within bounds
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    for mut row in x0s.slice_mut(s![1.., ..]).rows_mut() {
        for (v, (lo, up)) in row.iter_mut().zip(bounds.iter()) {
            *v = if lo < up { rng.gen_range(*lo..*up) } else { *lo };
        }
    }
    (x0s, bounds)
}

/// Optimize parameters given an initial guess and bounds with cobyla,
/// `args` is given to each objective function evaluation.
pub(crate) fn optimize_params<ObjF, U>(
    objfn: ObjF,
    param0: &Array1<f64>,
    bounds: &[(f64, f64)],
    args: U,
    cobyla: CobylaParams,
) -> (f64, Array1<f64>)
where
    ObjF: Fn(&[f64], &mut U) -> f64,
    U: Clone,
{
    use cobyla::{minimize, Func, StopTols};

    let cons: Vec<&dyn Func<U>> = vec![];
    let param0 = param0.to_vec();

    match minimize(
        |x, u| objfn(x, u),
        &param0,
        bounds,
        &cons,
        args,
        cobyla.maxeval,
        cobyla::RhoBeg::All(cobyla.rhobeg),
        Some(StopTols {
            ftol_rel: cobyla.ftol_rel,
            ..StopTols::default()
        }),
    ) {
        Ok((_, x_opt, fval)) => {
            let fval = if f64::is_nan(fval) {
                f64::INFINITY
            } else {
                fval
            };
            (fval, Array1::from(x_opt))
        }
        Err((status, x_opt, _)) => {
            log::warn!("ERROR Cobyla optimizer in GP status={status:?}");
            (f64::INFINITY, Array1::from(x_opt))
        }
    }
}

#[inline(always)]
pub(crate) fn into_f64<F: Float>(v: F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_prepare_multistart() {
        let x0 = array![0.5, 1.];
        let (x0s, bounds) =
            prepare_multistart(4, &x0, &[(0., 1.), (f64::NEG_INFINITY, f64::INFINITY)]);
        assert_eq!((5, 2), x0s.dim());
        assert_abs_diff_eq!(x0, x0s.row(0));
        assert_eq!(vec![(0., 1.), (1. - UNBOUNDED_SPAN, 1. + UNBOUNDED_SPAN)], bounds);
        for row in x0s.rows() {
            for (v, (lo, up)) in row.iter().zip(bounds.iter()) {
                assert!(lo <= v && v <= up);
            }
        }
    }

    #[test]
    fn test_optimize_params() {
        let objfn = |x: &[f64], _: &mut ()| (x[0] - 1.).powi(2) + (x[1] + 0.5).powi(2);
        let (fmin, xmin) = optimize_params(
            objfn,
            &array![0., 0.],
            &[(-2., 2.), (-2., 2.)],
            (),
            CobylaParams::default(),
        );
        assert_abs_diff_eq!(0., fmin, epsilon = 1e-3);
        assert_abs_diff_eq!(array![1., -0.5], xmin, epsilon = 5e-2);
    }
}
