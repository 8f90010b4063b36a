use approx::assert_abs_diff_eq;
use celerite::{
    ComplexTerm, DenseSolver, GaussianProcess, GpError, LinearModel, Parameterized, RealTerm,
    SHOTerm, Term,
};
use linfa::ParamGuard;
use ndarray::{array, Array, Array1, Axis};

fn observations() -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    let t = Array::linspace(0., 20., 60).mapv(|v: f64| v + 0.05 * (7. * v).cos());
    let yerr = t.mapv(|v| 0.1 + 0.02 * v.sin().abs());
    let y = t.mapv(|v| 0.05 * v + (1.3 * v).sin());
    (t, yerr, y)
}

#[test]
fn test_white_noise_only_likelihood() {
    // zero amplitude kernel, unit uncertainties and no white noise: K = I
    let mut gp = GaussianProcess::new(RealTerm::new(f64::NEG_INFINITY, 0.));
    gp.compute(&array![0., 1., 2.], 1.).unwrap();
    assert_abs_diff_eq!(
        -1.5 * (2. * std::f64::consts::PI).ln(),
        gp.log_likelihood(&array![0., 0., 0.]).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_pipeline_against_dense() {
    let (t, yerr, y) = observations();
    let kernel = RealTerm::new(-1., -1.) + SHOTerm::new(-1., 1., 0.3);
    let params = GaussianProcess::params(kernel)
        .mean(LinearModel::new(0.1, 0.02))
        .fit_mean(true)
        .log_white_noise_value(-6.)
        .fit_white_noise(true)
        .check()
        .unwrap();

    let mut gp = params.build();
    let mut gp_dense = params.build_with_solver::<DenseSolver<f64>>();
    gp.compute(&t, yerr.clone()).unwrap();
    gp_dense.compute(&t, yerr.clone()).unwrap();

    assert_abs_diff_eq!(
        gp_dense.log_likelihood(&y).unwrap(),
        gp.log_likelihood(&y).unwrap(),
        epsilon = 1e-8
    );

    let xs = Array::linspace(-2., 22., 31);
    let (mu, cov) = gp.predict_cov(&y, Some(xs.view())).unwrap();
    let (mu_dense, cov_dense) = gp_dense.predict_cov(&y, Some(xs.view())).unwrap();
    assert_abs_diff_eq!(mu_dense, mu, epsilon = 1e-8);
    assert_abs_diff_eq!(cov_dense, cov, epsilon = 1e-8);

    // update parameters through the flat vector then check both stay consistent
    let mut v = gp.parameter_vector();
    assert_eq!(gp.vector_size(), v.len());
    v.mapv_inplace(|p| p + 0.1);
    gp.set_parameter_vector(&v).unwrap();
    gp_dense.set_parameter_vector(&v).unwrap();
    assert!(gp.is_dirty() && gp_dense.is_dirty());
    assert_abs_diff_eq!(v, gp.parameter_vector());
    assert_abs_diff_eq!(
        gp_dense.log_likelihood(&y).unwrap(),
        gp.log_likelihood(&y).unwrap(),
        epsilon = 1e-8
    );
    assert!(!gp.is_dirty());
}

#[test]
fn test_training_prediction_from_observations() {
    let (t, yerr, y) = observations();
    let mut gp = GaussianProcess::params(ComplexTerm::new(0., -2., -1., 0.))
        .mean_value(0.3)
        .check()
        .unwrap()
        .build();
    gp.compute(&t, yerr.clone()).unwrap();

    let resid = &y - 0.3;
    let mut k = gp.kernel().matrix(&t, &t);
    k.diag_mut()
        .iter_mut()
        .zip(yerr.iter())
        .for_each(|(k, e)| *k += e * e);
    let alpha = gp
        .apply_inverse(&resid.clone().insert_axis(Axis(1)))
        .unwrap();
    // K.alpha = resid
    assert_abs_diff_eq!(
        resid.clone(),
        k.dot(&alpha).remove_axis(Axis(1)),
        epsilon = 1e-8
    );

    let alpha = alpha.remove_axis(Axis(1));
    // observations, not residuals, are corrected at training points
    let expected = &y + 0.3 - &(yerr.mapv(|e| e * e) * &alpha);
    assert_abs_diff_eq!(expected, gp.predict(&y, None).unwrap(), epsilon = 1e-10);
}

#[test]
fn test_state_machine() {
    let (t, yerr, y) = observations();
    let mut gp = GaussianProcess::new(RealTerm::new(0., 0.));
    assert!(matches!(gp.log_likelihood(&y), Err(GpError::NotComputed)));

    let unsorted = array![2., 1., 3.];
    assert!(matches!(
        gp.compute(&unsorted, 1.),
        Err(GpError::UnsortedInput)
    ));
    gp.compute(&t, yerr).unwrap();
    assert!(gp.computed());

    let ll = gp.log_likelihood(&y).unwrap();
    gp.set_parameter("kernel:log_c", -1.).unwrap();
    assert!(!gp.computed());
    let ll2 = gp.log_likelihood(&y).unwrap();
    assert!(gp.computed());
    assert!((ll - ll2).abs() > 1e-8);
}

#[test]
fn test_parameter_bus() {
    let kernel = RealTerm::new(0., 0.) + ComplexTerm::new(0., 0., 0., 0.);
    let mut gp = GaussianProcess::params(kernel)
        .fit_mean(true)
        .check()
        .unwrap()
        .build();
    assert_eq!(8, gp.full_size());
    assert_eq!(7, gp.vector_size());
    assert_eq!(gp.full_size(), gp.parameter_names().len());
    assert_eq!(gp.full_size(), gp.unfrozen_mask().len());
    assert_eq!(gp.vector_size(), gp.parameter_bounds().len());

    gp.freeze_parameter("kernel:terms[1]:log_d").unwrap();
    assert_eq!(8, gp.full_size());
    assert_eq!(6, gp.vector_size());
    assert_eq!(
        gp.unfrozen_mask().iter().filter(|&&b| b).count(),
        gp.parameter_vector().len()
    );
    gp.thaw_parameter("kernel:terms[1]:log_d").unwrap();
    assert_eq!(7, gp.vector_size());

    // frozen white noise breaks full size slicing of the parameter vector
    let v = gp.parameter_vector();
    assert!(matches!(
        gp.set_parameter_vector(&v),
        Err(GpError::DimensionMismatch { .. })
    ));
    gp.thaw_parameter("log_white_noise:value").unwrap();
    let v = Array1::linspace(-1., 1., gp.vector_size());
    gp.set_parameter_vector(&v).unwrap();
    assert_abs_diff_eq!(v, gp.parameter_vector());

    assert!(matches!(
        gp.thaw_parameter("kernel:terms[2]:log_a"),
        Err(GpError::UnknownParameter(_))
    ));
}
