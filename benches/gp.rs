use celerite::{ComplexTerm, GaussianProcess, Parameterized, RealTerm};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array, Array1};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let nts = [1000, 10000, 100000];

    let mut group = c.benchmark_group("gp");
    group.sample_size(20);
    for nt in nts {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let mut t = Array1::random_using(nt, Uniform::new(0., 1000.), &mut rng).to_vec();
        t.sort_by(|a: &f64, b| a.total_cmp(b));
        let t = Array::from(t);
        let y = t.mapv(|v| (0.1 * v).sin());

        let kernel = RealTerm::new(0., -1.) + ComplexTerm::new(0., -2., -1., 0.5);
        let mut gp = GaussianProcess::new(kernel);
        gp.compute(&t, 0.1).expect("GP compute");

        group.bench_function(format!("gp log likelihood {nt}"), |b| {
            b.iter(|| {
                // force factorization
                gp.set_parameter("kernel:terms[0]:log_a", 0.)
                    .expect("parameter set");
                std::hint::black_box(gp.log_likelihood(&y).expect("log likelihood"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
