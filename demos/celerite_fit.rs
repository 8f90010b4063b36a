use celerite::{GaussianProcess, LinearModel, Parameterized, RealTerm, SHOTerm};
use linfa::prelude::*;
use ndarray::{Array, Array1, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn main() {
    env_logger::init();

    // Noisy quasi periodic signal with a linear trend at random times
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let mut t = Array1::random_using(100, Uniform::new(0., 10.), &mut rng).to_vec();
    t.sort_by(|a: &f64, b| a.total_cmp(b));
    let t = Array::from(t);
    let yerr = 0.1;
    let noise = Array1::random_using(t.len(), Normal::new(0., yerr).unwrap(), &mut rng);
    let y = t.mapv(|v| 0.2 * v + (2. * v).sin() + 0.5 * (0.5 * v).cos()) + noise;

    let kernel = SHOTerm::new(0., 2f64.ln(), 2f64.ln())
        .with_bounds("log_S0", (-10., 5.))
        .and_then(|k| k.with_bounds("log_Q", (-5., 5.)))
        .and_then(|k| k.with_bounds("log_omega0", (-5., 5.)))
        .expect("valid bounds")
        + RealTerm::new(0., -1.)
            .with_bounds("log_a", (-10., 5.))
            .and_then(|k| k.with_bounds("log_c", (-5., 5.)))
            .expect("valid bounds");

    println!("Fit GP on {} points", t.len());
    let mut gp = GaussianProcess::params(kernel)
        .mean(LinearModel::new(0., 0.))
        .fit_mean(true)
        .yerr(yerr)
        .n_start(5)
        .fit(&Dataset::new(t.clone().insert_axis(Axis(1)), y.clone()))
        .expect("GP fitting");

    println!("{gp}");
    for name in gp.parameter_names() {
        let value = gp.get_parameter(&name).expect("known parameter");
        println!("  {name} = {value}");
    }
    println!("log likelihood = {}", gp.log_likelihood(&y).expect("log likelihood"));

    let xtest = Array::linspace(0., 12., 13);
    let (mu, var) = gp
        .predict_var(&y, Some(xtest.view()))
        .expect("GP prediction");
    for ((x, m), v) in xtest.iter().zip(mu.iter()).zip(var.iter()) {
        println!("  y({x:5.2}) = {m:7.4} +/- {:.4}", v.sqrt());
    }

    let samples = gp.sample(&xtest, 1e-12, 3).expect("GP sampling");
    println!("Prior samples (one per column):\n{samples:.3}");
}
