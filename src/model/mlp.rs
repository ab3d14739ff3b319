use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geom::POINT_ENCODING_SIZE;

use super::activation::Activation;
use super::error::ModelError;
use super::layer::Linear;
use super::layout::InputLayout;
use super::params::{ParamTensor, Parameterized};
use super::{ModelInput, SurfaceModel};

/// Construction options shared by every catalogue model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Width of the corner features the model reads.
    pub feature_dim: usize,
    /// Seed of the weight initializer.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { feature_dim: POINT_ENCODING_SIZE, seed: 0 }
    }
}

impl ModelConfig {
    #[must_use]
    pub const fn feature_dim(mut self, feature_dim: usize) -> Self {
        self.feature_dim = feature_dim;
        self
    }

    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Learned scalar read by parametric activations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedScalar {
    pub name: String,
    pub value: f64,
}

/// Residual MLP over an encoded input layout: `points + net(x)`.
#[derive(Debug, Clone)]
pub struct EncodedMlp {
    name: String,
    layout: InputLayout,
    feature_dim: usize,
    layers: Vec<Linear>,
    /// One per hidden layer; the output layer is linear.
    activations: Vec<Activation>,
    scalars: Vec<NamedScalar>,
}

impl EncodedMlp {
    /// Builds `input -> hidden[0] -> ... -> 3` with `activations[i]` after hidden layer `i`.
    ///
    /// Scalars listed in `scalar_names` start at 1.0.
    pub fn new(
        name: impl Into<String>,
        layout: InputLayout,
        hidden: &[usize],
        activations: Vec<Activation>,
        scalar_names: &[&str],
        config: &ModelConfig,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if hidden.is_empty() || hidden.contains(&0) {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: hidden widths must be non-empty and positive, got {hidden:?}"
            )));
        }
        if activations.len() != hidden.len() {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: {} activations for {} hidden layers",
                activations.len(),
                hidden.len()
            )));
        }
        for act in &activations {
            act.validate(scalar_names.len())?;
        }

        let input_dim = layout.input_dim(config.feature_dim);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_dim;
        for &width in hidden.iter().chain(std::iter::once(&3)) {
            layers.push(Linear::uniform(fan_in, width, &mut rng));
            fan_in = width;
        }

        let scalars = scalar_names
            .iter()
            .map(|n| NamedScalar { name: (*n).to_owned(), value: 1.0 })
            .collect();

        log::debug!("built model {name}: input {input_dim}, hidden {hidden:?}");

        Ok(Self { name, layout, feature_dim: config.feature_dim, layers, activations, scalars })
    }

    #[must_use]
    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    #[must_use]
    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Linear] {
        &mut self.layers
    }

    #[must_use]
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    #[must_use]
    pub fn scalars(&self) -> &[NamedScalar] {
        &self.scalars
    }

    pub fn scalar_mut(&mut self, name: &str) -> Option<&mut f64> {
        self.scalars.iter_mut().find(|s| s.name == name).map(|s| &mut s.value)
    }

    fn scalar_values(&self) -> Vec<f64> {
        self.scalars.iter().map(|s| s.value).collect()
    }

    fn max_width(&self) -> usize {
        self.layers
            .iter()
            .map(Linear::out_dim)
            .chain(std::iter::once(self.input_dim()))
            .max()
            .unwrap_or(0)
    }

    fn predict_row(
        &self,
        input: &ModelInput<'_>,
        idx: usize,
        scalars: &[f64],
        buf_a: &mut Vec<f64>,
        buf_b: &mut Vec<f64>,
    ) -> Result<[f64; 3], ModelError> {
        buf_a.resize(self.input_dim(), 0.0);
        self.layout.write_row(input, idx, buf_a)?;

        for (i, layer) in self.layers.iter().enumerate() {
            buf_b.resize(layer.out_dim(), 0.0);
            layer.forward(buf_a, buf_b);
            if let Some(act) = self.activations.get(i) {
                act.apply(buf_b, scalars);
            }
            std::mem::swap(buf_a, buf_b);
        }

        let p = input.points[idx];
        Ok([p[0] + buf_a[0], p[1] + buf_a[1], p[2] + buf_a[2]])
    }
}

impl SurfaceModel for EncodedMlp {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dim(&self) -> usize {
        self.layout.input_dim(self.feature_dim)
    }

    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<[f64; 3]>, ModelError> {
        if input.features.dim() != self.feature_dim {
            return Err(ModelError::InvalidShape(format!(
                "{}: expected {}-wide features, got {}",
                self.name,
                self.feature_dim,
                input.features.dim()
            )));
        }
        if self.layout.needs_uv() && input.uv.is_none() {
            return Err(ModelError::InvalidShape(format!("{} needs uv coordinates", self.name)));
        }

        let scalars = self.scalar_values();
        let width = self.max_width();

        #[cfg(feature = "parallel")]
        let out = (0..input.len())
            .into_par_iter()
            .map_init(
                || (Vec::with_capacity(width), Vec::with_capacity(width)),
                |(a, b), idx| self.predict_row(input, idx, &scalars, a, b),
            )
            .collect();

        #[cfg(not(feature = "parallel"))]
        let out = {
            let (mut a, mut b) = (Vec::with_capacity(width), Vec::with_capacity(width));
            (0..input.len())
                .map(|idx| self.predict_row(input, idx, &scalars, &mut a, &mut b))
                .collect()
        };

        out
    }
}

impl Parameterized for EncodedMlp {
    fn parameters_mut(&mut self) -> Vec<ParamTensor<'_>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2 + self.scalars.len());
        for (i, layer) in self.layers.iter_mut().enumerate() {
            let (weights, biases) = layer.split_mut();
            params.push(ParamTensor::new(format!("layers.{i}.weight"), weights));
            params.push(ParamTensor::new(format!("layers.{i}.bias"), biases));
        }
        for scalar in &mut self.scalars {
            params.push(ParamTensor::new(scalar.name.clone(), std::slice::from_mut(&mut scalar.value)));
        }
        params
    }
}
