//! Hidden-layer activations.
//!
//! Learned scalars (the `s` and `w` of the wavelet-like activations) are not stored in the
//! activation itself: each variant names a slot in the owning model's scalar table through
//! [`ScalarId`], so several layers can share one scalar.

use serde::Serialize;

use super::error::ModelError;

/// Index into a model's named scalar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activation {
    Identity,
    /// `sin(omega * x)`
    Sine { omega: f64 },
    Relu,
    /// `x` for `x > 0`, else `alpha * (e^x - 1)`
    Elu { alpha: f64 },
    /// `exp(-s * x²)`
    Gaussian { s: ScalarId },
    /// `sin(w * x) / (w * x)`, 1 at the origin
    Sinc { w: ScalarId },
    /// `exp(-s * x²) * sin(w * x)`
    Morlet { s: ScalarId, w: ScalarId },
    /// `softplus(x) * sin(s * x) * exp(-s * x²)`
    Onion { s: ScalarId },
}

impl Activation {
    pub const SINE: Self = Self::Sine { omega: 1.0 };

    /// Checks parameters and that every scalar slot exists.
    pub fn validate(self, scalar_count: usize) -> Result<(), ModelError> {
        let check = |id: ScalarId| {
            if id.0 < scalar_count {
                Ok(())
            } else {
                Err(ModelError::InvalidConfig(format!(
                    "activation references scalar {} but the model has {scalar_count}",
                    id.0
                )))
            }
        };
        match self {
            Self::Sine { omega } if !omega.is_finite() => Err(ModelError::InvalidConfig(format!(
                "sine frequency must be finite, got {omega}"
            ))),
            Self::Elu { alpha } if !(alpha.is_finite() && alpha >= 0.0) => Err(
                ModelError::InvalidConfig(format!("ELU alpha must be finite and >= 0, got {alpha}")),
            ),
            Self::Gaussian { s } | Self::Onion { s } => check(s),
            Self::Sinc { w } => check(w),
            Self::Morlet { s, w } => check(s).and(check(w)),
            Self::Identity | Self::Relu | Self::Sine { .. } | Self::Elu { .. } => Ok(()),
        }
    }

    #[inline]
    #[must_use]
    pub fn forward(self, x: f64, scalars: &[f64]) -> f64 {
        match self {
            Self::Identity => x,
            Self::Sine { omega } => (omega * x).sin(),
            Self::Relu => x.max(0.0),
            Self::Elu { alpha } => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x.exp_m1()
                }
            }
            Self::Gaussian { s } => (-scalars[s.0] * x * x).exp(),
            Self::Sinc { w } => sinc(scalars[w.0] * x),
            Self::Morlet { s, w } => (-scalars[s.0] * x * x).exp() * (scalars[w.0] * x).sin(),
            Self::Onion { s } => {
                let s = scalars[s.0];
                softplus(x) * (s * x).sin() * (-s * x * x).exp()
            }
        }
    }

    pub fn apply(self, values: &mut [f64], scalars: &[f64]) {
        if self == Self::Identity {
            return;
        }
        for v in values {
            *v = self.forward(*v, scalars);
        }
    }
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 { 1.0 } else { x.sin() / x }
}

/// `ln(1 + e^x)` without overflow for large `x`.
#[inline]
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONES: [f64; 2] = [1.0, 1.0];

    #[test]
    fn validate_checks_scalar_slots() {
        let act = Activation::Morlet { s: ScalarId(0), w: ScalarId(3) };
        assert!(act.validate(2).is_err());
        assert!(act.validate(4).is_ok());
        assert!(Activation::Elu { alpha: -1.0 }.validate(0).is_err());
        assert!(Activation::Sine { omega: f64::NAN }.validate(0).is_err());
    }

    #[test]
    fn wavelets_vanish_at_origin() {
        let morlet = Activation::Morlet { s: ScalarId(0), w: ScalarId(1) };
        let onion = Activation::Onion { s: ScalarId(0) };
        assert_eq!(morlet.forward(0.0, &ONES), 0.0);
        assert_eq!(onion.forward(0.0, &ONES), 0.0);
        let x = 0.7_f64;
        assert!((morlet.forward(x, &ONES) - (-x * x).exp() * x.sin()).abs() < 1e-15);
    }

    #[test]
    fn onion_matches_unstable_form_for_moderate_inputs() {
        let onion = Activation::Onion { s: ScalarId(1) };
        let scalars = [0.0, 0.5];
        for &x in &[-3.0_f64, -0.2, 0.4, 2.5] {
            let expected = (1.0 + x.exp()).ln() * (0.5 * x).sin() * (-0.5 * x * x).exp();
            assert!((onion.forward(x, &scalars) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn simple_shapes() {
        assert_eq!(Activation::Relu.forward(-2.0, &[]), 0.0);
        assert_eq!(Activation::Elu { alpha: 1.0 }.forward(3.0, &[]), 3.0);
        assert!(Activation::Elu { alpha: 1.0 }.forward(-50.0, &[]) > -1.0 - 1e-12);
        assert_eq!(Activation::Sinc { w: ScalarId(0) }.forward(0.0, &ONES), 1.0);
        assert_eq!(Activation::Gaussian { s: ScalarId(0) }.forward(0.0, &ONES), 1.0);
        assert_eq!(Activation::SINE.forward(0.5, &[]), 0.5_f64.sin());
    }
}
