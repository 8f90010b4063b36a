//! Parameter management shared by mean, white noise and kernel models.
//!
//! Every model exposes its parameters through the [Parameterized] trait: a list of
//! named scalar parameters which can be frozen (kept constant) or thawed, the flat vector
//! of thawed values used by optimizers, their bounds and a dirty flag telling whether
//! quantities derived from the parameters have to be recomputed.
//!
//! Leaf models store their parameters in a [ParameterSet].
use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A trait for models exposing named, freezable and bounded parameters
pub trait Parameterized<F: Float> {
    /// Names of all parameters (frozen or not) in declaration order
    fn parameter_names(&self) -> Vec<String>;

    /// Flags telling for each parameter (declaration order) whether it is thawed
    fn unfrozen_mask(&self) -> Vec<bool>;

    /// Total number of parameters, frozen ones included
    fn full_size(&self) -> usize {
        self.unfrozen_mask().len()
    }

    /// Number of thawed parameters
    fn vector_size(&self) -> usize {
        self.unfrozen_mask().iter().filter(|&&thawed| thawed).count()
    }

    /// Values of thawed parameters in declaration order
    fn parameter_vector(&self) -> Array1<F>;

    /// Set values of thawed parameters, `v` length has to be equal to [Parameterized::vector_size]
    fn set_parameter_vector(&mut self, v: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()>;

    /// Bounds (lower, upper) of thawed parameters
    fn parameter_bounds(&self) -> Vec<(F, F)>;

    /// Get a parameter value by name
    fn get_parameter(&self, name: &str) -> Result<F>;

    /// Set a parameter value by name
    fn set_parameter(&mut self, name: &str, value: F) -> Result<()>;

    /// Freeze a parameter by name
    fn freeze_parameter(&mut self, name: &str) -> Result<()>;

    /// Thaw a parameter by name
    fn thaw_parameter(&mut self, name: &str) -> Result<()>;

    /// Freeze all parameters
    fn freeze_all_parameters(&mut self);

    /// Thaw all parameters
    fn thaw_all_parameters(&mut self);

    /// Whether quantities derived from parameters are stale
    fn is_dirty(&self) -> bool;

    /// Set the dirty flag
    fn set_dirty(&mut self, dirty: bool);

    /// Log prior of the current parameters
    fn log_prior(&self) -> F;
}

/// Storage of named scalar parameters with their bounds and frozen states.
///
/// The log prior is uniform within bounds: 0 when all thawed parameters lie
/// within their bounds, -inf otherwise.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct ParameterSet<F: Float> {
    names: Vec<String>,
    values: Array1<F>,
    bounds: Vec<(F, F)>,
    unfrozen: Vec<bool>,
    dirty: bool,
}

impl<F: Float> ParameterSet<F> {
    /// Constructor from (name, value) pairs, all parameters are thawed and unbounded
    pub fn new(params: &[(&str, F)]) -> Self {
        let n = params.len();
        ParameterSet {
            names: params.iter().map(|(name, _)| name.to_string()).collect(),
            values: params.iter().map(|(_, v)| *v).collect(),
            bounds: vec![(F::neg_infinity(), F::infinity()); n],
            unfrozen: vec![true; n],
            dirty: true,
        }
    }

    /// All parameter values, frozen ones included
    pub fn values(&self) -> &Array1<F> {
        &self.values
    }

    /// Set bounds of the named parameter
    pub fn set_bounds(&mut self, name: &str, bounds: (F, F)) -> Result<()> {
        if bounds.0 > bounds.1 {
            return Err(GpError::InvalidValueError(format!(
                "lower bound greater than upper bound for parameter '{name}'"
            )));
        }
        let i = self.index(name)?;
        self.bounds[i] = bounds;
        Ok(())
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| GpError::UnknownParameter(name.to_string()))
    }
}

impl<F: Float> Parameterized<F> for ParameterSet<F> {
    fn parameter_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn unfrozen_mask(&self) -> Vec<bool> {
        self.unfrozen.clone()
    }

    fn parameter_vector(&self) -> Array1<F> {
        self.values
            .iter()
            .zip(&self.unfrozen)
            .filter(|(_, &thawed)| thawed)
            .map(|(v, _)| *v)
            .collect()
    }

    fn set_parameter_vector(&mut self, v: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        let expected = self.vector_size();
        if v.len() != expected {
            return Err(GpError::DimensionMismatch {
                expected,
                actual: v.len(),
            });
        }
        let thawed = self
            .values
            .iter_mut()
            .zip(&self.unfrozen)
            .filter(|(_, &thawed)| thawed);
        for ((value, _), new) in thawed.zip(v.iter()) {
            *value = *new;
        }
        self.dirty = true;
        Ok(())
    }

    fn parameter_bounds(&self) -> Vec<(F, F)> {
        self.bounds
            .iter()
            .zip(&self.unfrozen)
            .filter(|(_, &thawed)| thawed)
            .map(|(b, _)| *b)
            .collect()
    }

    fn get_parameter(&self, name: &str) -> Result<F> {
        Ok(self.values[self.index(name)?])
    }

    fn set_parameter(&mut self, name: &str, value: F) -> Result<()> {
        let i = self.index(name)?;
        self.values[i] = value;
        self.dirty = true;
        Ok(())
    }

    fn freeze_parameter(&mut self, name: &str) -> Result<()> {
        let i = self.index(name)?;
        self.unfrozen[i] = false;
        Ok(())
    }

    fn thaw_parameter(&mut self, name: &str) -> Result<()> {
        let i = self.index(name)?;
        self.unfrozen[i] = true;
        Ok(())
    }

    fn freeze_all_parameters(&mut self) {
        self.unfrozen.iter_mut().for_each(|thawed| *thawed = false);
    }

    fn thaw_all_parameters(&mut self) {
        self.unfrozen.iter_mut().for_each(|thawed| *thawed = true);
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    fn log_prior(&self) -> F {
        let outside = self
            .parameter_vector()
            .iter()
            .zip(self.parameter_bounds())
            .any(|(v, (lo, up))| *v < lo || *v > up);
        if outside {
            F::neg_infinity()
        } else {
            F::zero()
        }
    }
}

/// Implement [Parameterized] for a model storing its parameters in a `params: ParameterSet` field
macro_rules! impl_parameterized {
    ($model:ident) => {
        impl<F: Float> $crate::modeling::Parameterized<F> for $model<F> {
            fn parameter_names(&self) -> Vec<String> {
                self.params.parameter_names()
            }
            fn unfrozen_mask(&self) -> Vec<bool> {
                self.params.unfrozen_mask()
            }
            fn parameter_vector(&self) -> ndarray::Array1<F> {
                self.params.parameter_vector()
            }
            fn set_parameter_vector(
                &mut self,
                v: &ndarray::ArrayBase<impl ndarray::Data<Elem = F>, ndarray::Ix1>,
            ) -> $crate::Result<()> {
                self.params.set_parameter_vector(v)
            }
            fn parameter_bounds(&self) -> Vec<(F, F)> {
                self.params.parameter_bounds()
            }
            fn get_parameter(&self, name: &str) -> $crate::Result<F> {
                self.params.get_parameter(name)
            }
            fn set_parameter(&mut self, name: &str, value: F) -> $crate::Result<()> {
                self.params.set_parameter(name, value)
            }
            fn freeze_parameter(&mut self, name: &str) -> $crate::Result<()> {
                self.params.freeze_parameter(name)
            }
            fn thaw_parameter(&mut self, name: &str) -> $crate::Result<()> {
                self.params.thaw_parameter(name)
            }
            fn freeze_all_parameters(&mut self) {
                self.params.freeze_all_parameters()
            }
            fn thaw_all_parameters(&mut self) {
                self.params.thaw_all_parameters()
            }
            fn is_dirty(&self) -> bool {
                self.params.is_dirty()
            }
            fn set_dirty(&mut self, dirty: bool) {
                self.params.set_dirty(dirty)
            }
            fn log_prior(&self) -> F {
                self.params.log_prior()
            }
        }
    };
}
pub(crate) use impl_parameterized;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn params() -> ParameterSet<f64> {
        ParameterSet::new(&[("a", 1.), ("b", 2.), ("c", 3.)])
    }

    #[test]
    fn test_freeze_thaw() {
        let mut p = params();
        assert_eq!(3, p.full_size());
        assert_eq!(3, p.vector_size());

        p.freeze_parameter("b").unwrap();
        assert_eq!(3, p.full_size());
        assert_eq!(2, p.vector_size());
        assert_eq!(vec![true, false, true], p.unfrozen_mask());
        assert_abs_diff_eq!(array![1., 3.], p.parameter_vector());

        p.thaw_parameter("b").unwrap();
        assert_eq!(3, p.vector_size());
        assert_abs_diff_eq!(array![1., 2., 3.], p.parameter_vector());
    }

    #[test]
    fn test_set_parameter_vector_skips_frozen() {
        let mut p = params();
        p.freeze_parameter("a").unwrap();
        p.set_dirty(false);
        p.set_parameter_vector(&array![20., 30.]).unwrap();
        assert!(p.is_dirty());
        assert_abs_diff_eq!(array![1., 20., 30.], *p.values());

        let res = p.set_parameter_vector(&array![1., 2., 3.]);
        assert!(matches!(
            res,
            Err(GpError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_get_set_parameter() {
        let mut p = params();
        p.set_dirty(false);
        p.freeze_all_parameters();
        assert_eq!(0, p.vector_size());
        p.set_parameter("c", 5.).unwrap();
        assert!(p.is_dirty());
        assert_abs_diff_eq!(5., p.get_parameter("c").unwrap());
        assert!(matches!(
            p.get_parameter("d"),
            Err(GpError::UnknownParameter(name)) if name == "d"
        ));
    }

    #[test]
    fn test_bounds_and_log_prior() {
        let mut p = params();
        p.set_bounds("b", (0., 1.)).unwrap();
        assert_eq!(p.log_prior(), f64::NEG_INFINITY);
        p.set_parameter("b", 0.5).unwrap();
        assert_eq!(p.log_prior(), 0.);
        p.freeze_parameter("b").unwrap();
        assert_eq!(
            vec![(f64::NEG_INFINITY, f64::INFINITY); 2],
            p.parameter_bounds()
        );
        assert!(p.set_bounds("a", (1., 0.)).is_err());
    }
}
