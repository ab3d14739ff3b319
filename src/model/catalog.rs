//! Named catalogue of the encoding models.
//!
//! Hidden stacks are 64-64-64 unless noted. Input layouts, in column order (`F` features,
//! `P` points, `UV` sample coordinates, `bands(x)` the sin/cos levels without the raw term):
//!
//! | name                  | layout                               | L  |
//! |-----------------------|--------------------------------------|----|
//! | `simple`              | F, P                                 |    |
//! | `positional` & co     | F, P, bands(P)                       | 10 |
//! | `positional-wide`     | F, P, bands(P), hidden 128-128       | 8  |
//! | `morlet`              | F, P, bands(P)                       | 8  |
//! | `feature-*`           | F, bands(F), P                       | 10 |
//! | `feature-position`    | F, P, per level bands(F), bands(P)   | 16 |
//! | `uv`                  | F, UV                                |    |
//! | `uv-sinusoidal`       | F, UV, bands(UV)                     | 8  |
//! | `feature-uv`          | F, UV, per level bands(F), bands(UV) | 8  |
//! | `position-uv`         | F, P, UV, per level bands(P), bands(UV) | 8 |
//! | `uv-morlet`/`uv-onion`| F, P, UV, bands(UV)                  | 8  |

use serde::Serialize;

use super::activation::{Activation, ScalarId};
use super::error::ModelError;
use super::layout::{InputBlock, InputLayout, InputSource};
use super::mlp::{EncodedMlp, ModelConfig};

use InputSource::{Features, Points, Uv};

const HIDDEN: [usize; 3] = [64, 64, 64];
const WIDE_HIDDEN: [usize; 2] = [128, 128];
const SIREN_OMEGA: f64 = 30.0;

const MORLET_SCALARS: [&str; 4] = ["s0", "w0", "s1", "w1"];
const ONION_SCALARS: [&str; 2] = ["s0", "s1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Simple,
    Positional,
    PositionalWide,
    Relu,
    Elu,
    Siren,
    Gauss,
    Sinc,
    Morlet,
    Onion,
    FeatureSinusoidal,
    FeatureMorlet,
    FeatureOnion,
    FeaturePosition,
    Uv,
    UvSinusoidal,
    FeatureUv,
    PositionUv,
    UvMorlet,
    UvOnion,
}

impl ModelKind {
    pub const ALL: [Self; 20] = [
        Self::Simple,
        Self::Positional,
        Self::PositionalWide,
        Self::Relu,
        Self::Elu,
        Self::Siren,
        Self::Gauss,
        Self::Sinc,
        Self::Morlet,
        Self::Onion,
        Self::FeatureSinusoidal,
        Self::FeatureMorlet,
        Self::FeatureOnion,
        Self::FeaturePosition,
        Self::Uv,
        Self::UvSinusoidal,
        Self::FeatureUv,
        Self::PositionUv,
        Self::UvMorlet,
        Self::UvOnion,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Positional => "positional",
            Self::PositionalWide => "positional-wide",
            Self::Relu => "relu",
            Self::Elu => "elu",
            Self::Siren => "siren",
            Self::Gauss => "gauss",
            Self::Sinc => "sinc",
            Self::Morlet => "morlet",
            Self::Onion => "onion",
            Self::FeatureSinusoidal => "feature-sinusoidal",
            Self::FeatureMorlet => "feature-morlet",
            Self::FeatureOnion => "feature-onion",
            Self::FeaturePosition => "feature-position",
            Self::Uv => "uv",
            Self::UvSinusoidal => "uv-sinusoidal",
            Self::FeatureUv => "feature-uv",
            Self::PositionUv => "position-uv",
            Self::UvMorlet => "uv-morlet",
            Self::UvOnion => "uv-onion",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// `true` when the model reads `(u, v)` sample coordinates.
    #[must_use]
    pub const fn needs_uv(self) -> bool {
        matches!(
            self,
            Self::Uv
                | Self::UvSinusoidal
                | Self::FeatureUv
                | Self::PositionUv
                | Self::UvMorlet
                | Self::UvOnion
        )
    }

    fn blocks(self) -> Vec<InputBlock> {
        use InputBlock::Plain;
        match self {
            Self::Simple => vec![Plain(Features), Plain(Points)],
            Self::Positional
            | Self::Relu
            | Self::Elu
            | Self::Siren
            | Self::Gauss
            | Self::Sinc
            | Self::Onion => vec![Plain(Features), InputBlock::encoded(&[Points], 10)],
            Self::PositionalWide | Self::Morlet => {
                vec![Plain(Features), InputBlock::encoded(&[Points], 8)]
            }
            Self::FeatureSinusoidal | Self::FeatureMorlet | Self::FeatureOnion => {
                vec![InputBlock::encoded(&[Features], 10), Plain(Points)]
            }
            Self::FeaturePosition => vec![InputBlock::encoded(&[Features, Points], 16)],
            Self::Uv => vec![Plain(Features), Plain(Uv)],
            Self::UvSinusoidal => vec![Plain(Features), InputBlock::encoded(&[Uv], 8)],
            Self::FeatureUv => vec![InputBlock::encoded(&[Features, Uv], 8)],
            Self::PositionUv => vec![Plain(Features), InputBlock::encoded(&[Points, Uv], 8)],
            Self::UvMorlet | Self::UvOnion => {
                vec![Plain(Features), Plain(Points), InputBlock::encoded(&[Uv], 8)]
            }
        }
    }

    fn hidden(self) -> &'static [usize] {
        match self {
            Self::PositionalWide => &WIDE_HIDDEN,
            _ => &HIDDEN,
        }
    }

    /// Activations per hidden layer plus the learned scalars they read.
    fn activations(self) -> (Vec<Activation>, &'static [&'static str]) {
        let depth = self.hidden().len();
        let uniform = |act: Activation| -> (Vec<Activation>, &'static [&'static str]) {
            (vec![act; depth], &[])
        };
        match self {
            // Historical name: this model has always run sine activations.
            Self::Relu => uniform(Activation::SINE),
            Self::Elu => uniform(Activation::Elu { alpha: 1.0 }),
            Self::Siren => {
                let mut acts = vec![Activation::SINE; depth];
                acts[0] = Activation::Sine { omega: SIREN_OMEGA };
                (acts, &[])
            }
            Self::Gauss => (vec![Activation::Gaussian { s: ScalarId(0) }; depth], &["s0"]),
            Self::Sinc => (vec![Activation::Sinc { w: ScalarId(0) }; depth], &["w0"]),
            // Wavelets on the first two hidden layers only.
            Self::Morlet | Self::FeatureMorlet | Self::UvMorlet => (
                vec![
                    Activation::Morlet { s: ScalarId(0), w: ScalarId(1) },
                    Activation::Morlet { s: ScalarId(2), w: ScalarId(3) },
                    Activation::Identity,
                ],
                &MORLET_SCALARS,
            ),
            // `s1` is shared by every layer after the first.
            Self::Onion | Self::FeatureOnion | Self::UvOnion => {
                let mut acts = vec![Activation::Onion { s: ScalarId(1) }; depth];
                acts[0] = Activation::Onion { s: ScalarId(0) };
                (acts, &ONION_SCALARS)
            }
            _ => uniform(Activation::SINE),
        }
    }

    pub fn layout(self) -> Result<InputLayout, ModelError> {
        InputLayout::new(self.blocks())
    }

    /// Network input width for `feature_dim`-wide corner features.
    #[must_use]
    pub fn input_dim(self, feature_dim: usize) -> usize {
        self.blocks().iter().map(|b| b.dim(feature_dim)).sum()
    }

    pub fn build(self, config: &ModelConfig) -> Result<EncodedMlp, ModelError> {
        let (activations, scalars) = self.activations();
        EncodedMlp::new(self.name(), self.layout()?, self.hidden(), activations, scalars, config)
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurfaceModel;

    #[test]
    fn names_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ModelKind::from_name("rexin"), None);
    }

    #[test]
    fn every_kind_builds() {
        let config = ModelConfig::default();
        for kind in ModelKind::ALL {
            let model = kind.build(&config).unwrap();
            assert_eq!(model.input_dim(), kind.input_dim(20), "{kind}");
            assert_eq!(model.layout().needs_uv(), kind.needs_uv(), "{kind}");
        }
    }

    #[test]
    fn activation_stacks_per_kind() {
        use Activation::{Elu, Gaussian, Identity, Morlet, Onion, Sine, Sinc};
        let sine = Activation::SINE;
        let morlet = [
            Morlet { s: ScalarId(0), w: ScalarId(1) },
            Morlet { s: ScalarId(2), w: ScalarId(3) },
            Identity,
        ];
        let onion = [Onion { s: ScalarId(0) }, Onion { s: ScalarId(1) }, Onion { s: ScalarId(1) }];

        let table: [(ModelKind, Vec<Activation>, &[&str]); 20] = [
            (ModelKind::Simple, vec![sine; 3], &[]),
            (ModelKind::Positional, vec![sine; 3], &[]),
            (ModelKind::PositionalWide, vec![sine; 2], &[]),
            (ModelKind::Relu, vec![sine; 3], &[]),
            (ModelKind::Elu, vec![Elu { alpha: 1.0 }; 3], &[]),
            (ModelKind::Siren, vec![Sine { omega: 30.0 }, sine, sine], &[]),
            (ModelKind::Gauss, vec![Gaussian { s: ScalarId(0) }; 3], &["s0"]),
            (ModelKind::Sinc, vec![Sinc { w: ScalarId(0) }; 3], &["w0"]),
            (ModelKind::Morlet, morlet.to_vec(), &MORLET_SCALARS[..]),
            (ModelKind::Onion, onion.to_vec(), &ONION_SCALARS[..]),
            (ModelKind::FeatureSinusoidal, vec![sine; 3], &[]),
            (ModelKind::FeatureMorlet, morlet.to_vec(), &MORLET_SCALARS[..]),
            (ModelKind::FeatureOnion, onion.to_vec(), &ONION_SCALARS[..]),
            (ModelKind::FeaturePosition, vec![sine; 3], &[]),
            (ModelKind::Uv, vec![sine; 3], &[]),
            (ModelKind::UvSinusoidal, vec![sine; 3], &[]),
            (ModelKind::FeatureUv, vec![sine; 3], &[]),
            (ModelKind::PositionUv, vec![sine; 3], &[]),
            (ModelKind::UvMorlet, morlet.to_vec(), &MORLET_SCALARS[..]),
            (ModelKind::UvOnion, onion.to_vec(), &ONION_SCALARS[..]),
        ];

        let config = ModelConfig::default();
        for (kind, activations, scalars) in table {
            let model = kind.build(&config).unwrap();
            assert_eq!(model.activations(), activations.as_slice(), "{kind}");
            let names: Vec<&str> = model.scalars().iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, scalars, "{kind}");
        }
    }

    #[test]
    fn relu_model_runs_sine() {
        let model = ModelKind::Relu.build(&ModelConfig::default()).unwrap();
        assert!(model.activations().iter().all(|a| *a == Activation::SINE));
    }

    #[test]
    fn morlet_scalars_start_at_one() {
        let model = ModelKind::UvMorlet.build(&ModelConfig::default()).unwrap();
        let names: Vec<&str> = model.scalars().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, MORLET_SCALARS);
        assert!(model.scalars().iter().all(|s| s.value == 1.0));
        assert_eq!(model.activations()[2], Activation::Identity);
    }
}
