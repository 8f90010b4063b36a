//! A module for models of the GP mean and of the logarithm of the white noise variance.
//!
//! Both are one-dimensional functions of the coordinates `t` with named parameters.
//! The following models are implemented:
//! * constant,
//! * linear

use crate::modeling::{impl_parameterized, ParameterSet, Parameterized};
use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trait for parameterized functions of the coordinates, used as mean or
/// log white noise models of the GP
pub trait Model<F: Float>: Parameterized<F> + Clone + fmt::Display + Send + Sync {
    /// Compute model values at the given `t` coordinates
    fn value(&self, t: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F>;
}

/// A constant function `value`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct ConstantModel<F: Float> {
    params: ParameterSet<F>,
}

impl<F: Float> ConstantModel<F> {
    /// Constructor given the constant value
    pub fn new(value: F) -> Self {
        ConstantModel {
            params: ParameterSet::new(&[("value", value)]),
        }
    }

    /// Current constant value
    pub fn constant(&self) -> F {
        self.params.values()[0]
    }

    /// Set bounds of the named parameter
    pub fn with_bounds(mut self, name: &str, bounds: (F, F)) -> crate::Result<Self> {
        self.params.set_bounds(name, bounds)?;
        Ok(self)
    }
}

impl<F: Float> Default for ConstantModel<F> {
    fn default() -> Self {
        Self::new(F::zero())
    }
}

impl<F: Float> From<F> for ConstantModel<F> {
    fn from(value: F) -> Self {
        Self::new(value)
    }
}

impl<F: Float> Model<F> for ConstantModel<F> {
    fn value(&self, t: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        Array1::from_elem(t.len(), self.constant())
    }
}

impl<F: Float> fmt::Display for ConstantModel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConstantModel(value={})", self.constant())
    }
}

impl_parameterized!(ConstantModel);

/// An affine function `intercept + slope * t`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct LinearModel<F: Float> {
    params: ParameterSet<F>,
}

impl<F: Float> LinearModel<F> {
    /// Constructor given intercept and slope
    pub fn new(intercept: F, slope: F) -> Self {
        LinearModel {
            params: ParameterSet::new(&[("intercept", intercept), ("slope", slope)]),
        }
    }

    /// Set bounds of the named parameter
    pub fn with_bounds(mut self, name: &str, bounds: (F, F)) -> crate::Result<Self> {
        self.params.set_bounds(name, bounds)?;
        Ok(self)
    }
}

impl<F: Float> Model<F> for LinearModel<F> {
    fn value(&self, t: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let (intercept, slope) = (self.params.values()[0], self.params.values()[1]);
        t.mapv(|v| intercept + slope * v)
    }
}

impl<F: Float> fmt::Display for LinearModel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LinearModel(intercept={}, slope={})",
            self.params.values()[0],
            self.params.values()[1]
        )
    }
}

impl_parameterized!(LinearModel);
