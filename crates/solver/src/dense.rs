use crate::{check_len, KernelCoefficients, Result, Solver, SolverError};
use linfa::Float;
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};

/// Dense kernel matrix `kernel(x1_i - x2_j)` between two coordinate sets
pub fn kernel_matrix<F: Float>(
    coeffs: &KernelCoefficients<F>,
    x1: &ArrayBase<impl Data<Elem = F>, Ix1>,
    x2: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Array2<F> {
    Array2::from_shape_fn((x1.len(), x2.len()), |(i, j)| coeffs.value(x1[i] - x2[j]))
}

/// Dense Cholesky solver, O(N^3) in time and O(N^2) in memory.
///
/// Mainly used as a reference for [CholeskySolver](crate::CholeskySolver),
/// it does not require coordinates to be sorted.
#[derive(Clone, Debug, Default)]
pub struct DenseSolver<F: Float> {
    computed: bool,
    /// Lower cholesky factor of K
    chol: Array2<F>,
    log_det: F,
}

impl<F: Float> DenseSolver<F> {
    fn check_computed(&self) -> Result<()> {
        if self.computed {
            Ok(())
        } else {
            Err(SolverError::NotComputed)
        }
    }
}

impl<F: Float> Solver<F> for DenseSolver<F> {
    fn compute(
        &mut self,
        coeffs: &KernelCoefficients<F>,
        t: &ArrayBase<impl Data<Elem = F>, Ix1>,
        diag: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        self.computed = false;
        check_len(t.len(), diag.len())?;
        let mut k = kernel_matrix(coeffs, t, t);
        Zip::from(k.diag_mut()).and(diag).for_each(|k, &d| *k += d);
        let chol = k.cholesky()?;
        // The determinant of K is equal to the squared product of
        // the diagonal elements of its Cholesky decomposition
        self.log_det = chol.diag().mapv(|v| v.ln()).sum() * F::cast(2.);
        self.chol = chol;
        self.computed = true;
        Ok(())
    }

    fn solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        self.check_computed()?;
        check_len(self.chol.nrows(), y.nrows())?;
        let z = self.chol.solve_triangular(y, UPLO::Lower)?;
        Ok(self.chol.t().solve_triangular(&z, UPLO::Upper)?)
    }

    fn dot_solve(&self, y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        self.check_computed()?;
        check_len(self.chol.nrows(), y.len())?;
        let z = self
            .chol
            .solve_triangular(&y.view().insert_axis(Axis(1)), UPLO::Lower)?;
        Ok(z.mapv(|v| v * v).sum())
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
        check_len(t.len(), y.nrows())?;
        Ok(kernel_matrix(coeffs, t, t).dot(y))
    }

    fn computed(&self) -> bool {
        self.computed
    }

    fn size(&self) -> usize {
        if self.computed {
            self.chol.nrows()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_kernel_matrix() {
        let coeffs = KernelCoefficients::real(2., 1.);
        let x = array![0., 1.];
        let expected = array![[2., 2. * (-1f64).exp()], [2. * (-1f64).exp(), 2.]];
        assert_abs_diff_eq!(expected, kernel_matrix(&coeffs, &x, &x), epsilon = 1e-12);
    }

    #[test]
    fn test_dense_unsorted() {
        let coeffs = KernelCoefficients::real(1., 0.5);
        let mut solver = DenseSolver::default();
        solver
            .compute(&coeffs, &array![2., 1., 3.], &array![0.1, 0.1, 0.1])
            .expect("unsorted coordinates are fine for dense solver");
        let x = solver.solve(&array![[1.], [1.], [1.]]).unwrap();
        let kx = solver.dot(&coeffs, &array![2., 1., 3.], &x).unwrap() + &x * 0.1;
        assert_abs_diff_eq!(kx, array![[1.], [1.], [1.]], epsilon = 1e-10);
    }
}
