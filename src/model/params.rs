//! Mutable parameter views handed to an external optimizer.

use crate::geom::CornerSet;

use super::error::ModelError;
use super::loss::SurfaceLoss;

/// Named, flat, mutable view of one parameter group.
#[derive(Debug)]
pub struct ParamTensor<'a> {
    pub name: String,
    pub values: &'a mut [f64],
}

impl<'a> ParamTensor<'a> {
    pub fn new(name: impl Into<String>, values: &'a mut [f64]) -> Self {
        Self { name: name.into(), values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub trait Parameterized {
    fn parameters_mut(&mut self) -> Vec<ParamTensor<'_>>;

    fn parameter_count(&mut self) -> usize {
        self.parameters_mut().iter().map(ParamTensor::len).sum()
    }
}

/// Update rule applied after a forward step. Gradients are the optimizer's business.
pub trait Optimizer {
    fn step(&mut self, loss: &SurfaceLoss, params: Vec<ParamTensor<'_>>) -> Result<(), ModelError>;
}

impl Parameterized for CornerSet {
    fn parameters_mut(&mut self) -> Vec<ParamTensor<'_>> {
        let (positions, features) = self.split_mut();
        let mut params = vec![ParamTensor::new("corners.positions", positions.as_flattened_mut())];
        if let Some(features) = features {
            params.push(ParamTensor::new("corners.features", features.as_mut_slice()));
        }
        params
    }
}
