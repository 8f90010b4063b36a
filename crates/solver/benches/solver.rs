use celerite_solver::{CholeskySolver, DenseSolver, KernelCoefficients, Solver};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array, Array1};

fn criterion_solver(c: &mut Criterion) {
    let coeffs = KernelCoefficients::real(1.0, 0.5)
        .concatenate(&KernelCoefficients::complex(0.8, 0.05, 0.3, 2.0));

    let mut group = c.benchmark_group("solver");
    group.sample_size(20);
    for n in [100, 500, 2000] {
        let t = Array::linspace(0., 100., n);
        let diag = Array1::from_elem(n, 0.1);
        let y = t.mapv(|v: f64| v.sin()).insert_axis(ndarray::Axis(1));

        group.bench_function(format!("cholesky {n}"), |b| {
            b.iter(|| {
                let mut solver = CholeskySolver::new();
                solver.compute(&coeffs, &t, &diag).expect("compute");
                std::hint::black_box(solver.solve(&y).expect("solve"))
            })
        });
        if n <= 500 {
            group.bench_function(format!("dense {n}"), |b| {
                b.iter(|| {
                    let mut solver = DenseSolver::default();
                    solver.compute(&coeffs, &t, &diag).expect("compute");
                    std::hint::black_box(solver.solve(&y).expect("solve"))
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_solver);
criterion_main!(benches);
