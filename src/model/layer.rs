use rand::Rng;
use rand::rngs::StdRng;

/// Fully connected layer, forward only.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Linear {
    #[must_use]
    pub fn zeros(in_dim: usize, out_dim: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            weights: vec![0.0; in_dim * out_dim],
            biases: vec![0.0; out_dim],
        }
    }

    /// Weights and biases uniform in `±1/sqrt(in_dim)`.
    pub fn uniform(in_dim: usize, out_dim: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_dim.max(1) as f64).sqrt();
        let mut layer = Self::zeros(in_dim, out_dim);
        for w in layer.weights.iter_mut().chain(layer.biases.iter_mut()) {
            *w = rng.random_range(-bound..bound);
        }
        layer
    }

    #[inline]
    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    pub fn split_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.weights, &mut self.biases)
    }

    /// `outputs = W * inputs + b`.
    ///
    /// Shape contract: `inputs.len() == in_dim`, `outputs.len() == out_dim`.
    #[inline]
    pub fn forward(&self, inputs: &[f64], outputs: &mut [f64]) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);

        for (o, out) in outputs.iter_mut().enumerate() {
            let row = &self.weights[o * self.in_dim..(o + 1) * self.in_dim];
            *out = row
                .iter()
                .zip(inputs)
                .fold(self.biases[o], |sum, (w, x)| w.mul_add(*x, sum));
        }
    }
}
