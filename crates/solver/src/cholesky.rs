use crate::{check_len, KernelCoefficients, Result, Solver, SolverError};
use linfa::Float;
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix1, Ix2, Zip};

/// Semiseparable representation of a celerite kernel matrix at coordinates `t`:
///
/// `kernel(t, t) = a0.I + tril(U.V^t) + triu(V.U^t)`
///
/// where the exponential decay between consecutive coordinates is kept apart in `phi`
/// to avoid overflow of the generators `U` and `V`.
struct Factors<F: Float> {
    /// kernel value at zero lag
    a0: F,
    /// (n, J) generator
    u: Array2<F>,
    /// (n, J) generator
    v: Array2<F>,
    /// (n, J) decay factors exp(-c_j (t_n - t_n-1)), first row is unused
    phi: Array2<F>,
}

fn factors<F: Float>(
    coeffs: &KernelCoefficients<F>,
    t: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Factors<F> {
    let n = t.len();
    let nr = coeffs.n_real();
    let width = coeffs.width();
    let mut u = Array2::zeros((n, width));
    let mut v = Array2::zeros((n, width));
    let mut phi = Array2::zeros((n, width));

    for i in 0..n {
        let ti = t[i];
        let dt = if i > 0 { ti - t[i - 1] } else { F::zero() };
        for p in 0..nr {
            u[[i, p]] = coeffs.alpha_real[p];
            v[[i, p]] = F::one();
            phi[[i, p]] = (-coeffs.beta_real[p] * dt).exp();
        }
        for p in 0..coeffs.n_complex() {
            let a = coeffs.alpha_complex_real[p];
            let b = coeffs.alpha_complex_imag[p];
            let decay = (-coeffs.beta_complex_real[p] * dt).exp();
            let (sin, cos) = (coeffs.beta_complex_imag[p] * ti).sin_cos();
            let k = nr + 2 * p;
            u[[i, k]] = a * cos + b * sin;
            u[[i, k + 1]] = a * sin - b * cos;
            v[[i, k]] = cos;
            v[[i, k + 1]] = sin;
            phi[[i, k]] = decay;
            phi[[i, k + 1]] = decay;
        }
    }

    Factors {
        a0: coeffs.value_at_zero(),
        u,
        v,
        phi,
    }
}

/// Scalable solver for celerite covariance matrices.
///
/// The matrix `K = kernel(t, t) + diag` is factorized as `K = L.D.L^t` with
/// `L = I + tril(U.W^t)` in O(N.J^2) operations, see [crate] reference.
/// Coordinates are expected to be sorted in ascending order, this is not checked.
#[derive(Clone, Debug, Default)]
pub struct CholeskySolver<F: Float> {
    computed: bool,
    n: usize,
    u: Array2<F>,
    phi: Array2<F>,
    w: Array2<F>,
    d: Array1<F>,
    log_det: F,
}

impl<F: Float> CholeskySolver<F> {
    /// Solver constructor, nothing is factorized yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward substitution `L^-1.y`
    fn forward(&self, y: ArrayView1<F>) -> Array1<F> {
        let mut z = y.to_owned();
        let mut f = Array1::<F>::zeros(self.w.ncols());
        for i in 1..self.n {
            let zp = z[i - 1];
            Zip::from(&mut f)
                .and(self.phi.row(i))
                .and(self.w.row(i - 1))
                .for_each(|f, &phi, &w| *f = phi * (*f + w * zp));
            z[i] -= self.u.row(i).dot(&f);
        }
        z
    }

    /// Backward substitution `L^-t.z` done in place
    fn backward(&self, z: &mut Array1<F>) {
        let mut g = Array1::<F>::zeros(self.u.ncols());
        for i in (0..self.n.saturating_sub(1)).rev() {
            let zn = z[i + 1];
            Zip::from(&mut g)
                .and(self.phi.row(i + 1))
                .and(self.u.row(i + 1))
                .for_each(|g, &phi, &u| *g = phi * (*g + u * zn));
            z[i] -= self.w.row(i).dot(&g);
        }
    }

    fn check_computed(&self) -> Result<()> {
        if self.computed {
            Ok(())
        } else {
            Err(SolverError::NotComputed)
        }
    }
}

impl<F: Float> Solver<F> for CholeskySolver<F> {
    fn compute(
        &mut self,
        coeffs: &KernelCoefficients<F>,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        diag: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        self.computed = false;
        let n = t.len();
        check_len(n, diag.len())?;

        let Factors { a0, u, v, phi } = factors(coeffs, t);
        let width = coeffs.width();
        let mut s = Array2::<F>::zeros((width, width));
        let mut w = Array2::<F>::zeros((n, width));
        let mut d = Array1::<F>::zeros(n);

        for i in 0..n {
            if i > 0 {
                let dp = d[i - 1];
                let wp = w.row(i - 1);
                for p in 0..width {
                    for q in 0..width {
                        s[[p, q]] =
                            phi[[i, p]] * phi[[i, q]] * (s[[p, q]] + dp * wp[p] * wp[q]);
                    }
                }
            }
            let su = s.dot(&u.row(i));
            let di = a0 + diag[i] - u.row(i).dot(&su);
            if di.is_nan() || di <= F::zero() {
                return Err(SolverError::NotPositiveDefinite { index: i });
            }
            d[i] = di;
            let wi = (&v.row(i) - &su) / di;
            w.row_mut(i).assign(&wi);
        }

        self.log_det = d.mapv(|v| v.ln()).sum();
        debug!(
            "Semiseparable factorization: n={}, J={}, log_det={}",
            n, width, self.log_det
        );
        self.n = n;
        self.u = u;
        self.phi = phi;
        self.w = w;
        self.d = d;
        self.computed = true;
        Ok(())
    }

    fn solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        self.check_computed()?;
        check_len(self.n, y.nrows())?;
        let mut x = Array2::zeros(y.raw_dim());
        for (mut xk, yk) in x.columns_mut().into_iter().zip(y.columns()) {
            let mut z = self.forward(yk);
            z /= &self.d;
            self.backward(&mut z);
            xk.assign(&z);
        }
        Ok(x)
    }

    fn dot_solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        self.check_computed()?;
        check_len(self.n, y.len())?;
        let z = self.forward(y.view());
        Ok(Zip::from(&z)
            .and(&self.d)
            .fold(F::zero(), |acc, &z, &d| acc + z * z / d))
    }

    fn log_determinant(&self) -> Result<F> {
        self.check_computed()?;
        Ok(self.log_det)
    }

    fn dot(
        &self,
        coeffs: &KernelCoefficients<F>,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Array2<F>> {
        let n = t.len();
        check_len(n, y.nrows())?;
        let Factors { a0, u, v, phi } = factors(coeffs, t);
        let width = coeffs.width();

        let mut z = y.mapv(|yi| a0 * yi);
        for (mut zk, yk) in z.columns_mut().into_iter().zip(y.columns()) {
            let mut f = Array1::<F>::zeros(width);
            for i in 1..n {
                let yp = yk[i - 1];
                Zip::from(&mut f)
                    .and(phi.row(i))
                    .and(v.row(i - 1))
                    .for_each(|f, &phi, &vp| *f = phi * (*f + vp * yp));
                zk[i] += u.row(i).dot(&f);
            }
            let mut g = Array1::<F>::zeros(width);
            for i in (0..n.saturating_sub(1)).rev() {
                let yn = yk[i + 1];
                Zip::from(&mut g)
                    .and(phi.row(i + 1))
                    .and(u.row(i + 1))
                    .for_each(|g, &phi, &un| *g = phi * (*g + un * yn));
                zk[i] += v.row(i).dot(&g);
            }
        }
        Ok(z)
    }

    fn computed(&self) -> bool {
        self.computed
    }

    fn size(&self) -> usize {
        if self.computed {
            self.n
        } else {
            0
        }
    }
}
