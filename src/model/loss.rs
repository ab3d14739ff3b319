use serde::{Deserialize, Serialize};

use crate::geom::mean_distance;

use super::error::ModelError;

pub const DEFAULT_NORMAL_WEIGHT: f64 = 0.1;
pub const FACE_NORMAL_WEIGHT: f64 = 10_000.0;

/// Which normals the normal term compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalTerm {
    /// Summed vertex normals.
    #[default]
    Vertex,
    /// Raw per-triangle normals.
    Face,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossWeights {
    pub normal_weight: f64,
    pub normal_term: NormalTerm,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self { normal_weight: DEFAULT_NORMAL_WEIGHT, normal_term: NormalTerm::Vertex }
    }
}

impl LossWeights {
    /// Face-normal term with its customary heavy weight.
    #[must_use]
    pub const fn face() -> Self {
        Self { normal_weight: FACE_NORMAL_WEIGHT, normal_term: NormalTerm::Face }
    }

    #[must_use]
    pub const fn normal_weight(mut self, weight: f64) -> Self {
        self.normal_weight = weight;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceLoss {
    /// `mean |V - T|`
    pub vertex: f64,
    /// Weighted `mean |N_true - N_pred|`.
    pub normal: f64,
    pub total: f64,
}

/// Vertex term plus weighted normal term. The normals are compared unnormalized.
pub fn surface_loss(
    predicted: &[[f64; 3]],
    target: &[[f64; 3]],
    predicted_normals: &[[f64; 3]],
    target_normals: &[[f64; 3]],
    weights: &LossWeights,
) -> Result<SurfaceLoss, ModelError> {
    let vertex = mean_distance(predicted, target)?;
    let normal = weights.normal_weight * mean_distance(target_normals, predicted_normals)?;
    Ok(SurfaceLoss { vertex, normal, total: vertex + normal })
}
