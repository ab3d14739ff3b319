//! Encoding models that predict surface points from lerped corner data.

mod activation;
mod catalog;
mod error;
mod layer;
mod layout;
mod loss;
mod mlp;
mod params;
mod step;

pub use activation::{Activation, ScalarId};
pub use catalog::ModelKind;
pub use error::ModelError;
pub use layer::Linear;
pub use layout::{InputBlock, InputLayout, InputSource};
pub use loss::{LossWeights, NormalTerm, SurfaceLoss, surface_loss};
pub use mlp::{EncodedMlp, ModelConfig, NamedScalar};
pub use params::{Optimizer, ParamTensor, Parameterized};
pub use step::{StepOutput, TargetSurface, forward_step};

use crate::geom::Rows;

/// Per-sample inputs handed to a [`SurfaceModel`].
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub points: &'a [[f64; 3]],
    pub features: &'a Rows,
    pub uv: Option<&'a Rows>,
}

impl<'a> ModelInput<'a> {
    pub fn new(
        points: &'a [[f64; 3]],
        features: &'a Rows,
        uv: Option<&'a Rows>,
    ) -> Result<Self, ModelError> {
        if features.len() != points.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} feature rows for {} points",
                features.len(),
                points.len()
            )));
        }
        if let Some(uv) = uv {
            if uv.len() != points.len() || uv.dim() != 2 {
                return Err(ModelError::InvalidShape(format!(
                    "uv must be {}x2, got {}x{}",
                    points.len(),
                    uv.len(),
                    uv.dim()
                )));
            }
        }
        Ok(Self { points, features, uv })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A model mapping sample inputs to predicted surface points.
pub trait SurfaceModel {
    fn name(&self) -> &str;

    /// Width of one network input row.
    fn input_dim(&self) -> usize;

    /// One predicted point per input row.
    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<[f64; 3]>, ModelError>;
}
