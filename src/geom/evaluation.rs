//! Reconstruction and normal-consistency metrics.

use serde::Serialize;

use super::core::Vec3;
use super::error::GeomError;
use super::normals::normals_to_rgb;

fn check_same_len(what: &str, a: usize, b: usize) -> Result<(), GeomError> {
    if a != b {
        return Err(GeomError::shape(format!("{what}: {a} predicted vs {b} reference entries")));
    }
    if a == 0 {
        return Err(GeomError::shape(format!("{what}: nothing to compare")));
    }
    Ok(())
}

/// Per-vertex `|pred - target|`.
pub fn vertex_errors(pred: &[[f64; 3]], target: &[[f64; 3]]) -> Result<Vec<f64>, GeomError> {
    check_same_len("vertex errors", pred.len(), target.len())?;
    Ok(pred.iter().zip(target).map(|(&p, &t)| Vec3::distance(p, t)).collect())
}

/// Mean of per-row Euclidean distances.
pub fn mean_distance(a: &[[f64; 3]], b: &[[f64; 3]]) -> Result<f64, GeomError> {
    let errors = vertex_errors(a, b)?;
    Ok(errors.iter().sum::<f64>() / errors.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorStats {
    pub mean: f64,
    /// Unbiased (n - 1) standard deviation; 0 for a single sample.
    pub std: f64,
    pub max: f64,
}

impl ErrorStats {
    pub fn from_errors(errors: &[f64]) -> Result<Self, GeomError> {
        if errors.is_empty() {
            return Err(GeomError::shape("error statistics need at least one sample"));
        }
        let n = errors.len() as f64;
        let mean = errors.iter().sum::<f64>() / n;
        let std = if errors.len() > 1 {
            let ss: f64 = errors.iter().map(|e| (e - mean) * (e - mean)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let max = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { mean, std, max })
    }

    pub fn between(pred: &[[f64; 3]], target: &[[f64; 3]]) -> Result<Self, GeomError> {
        Self::from_errors(&vertex_errors(pred, target)?)
    }
}

/// Peak signal-to-noise ratio in dB, with the peak taken as `max - min` of `target`.
///
/// Identical inputs give `+inf`.
pub fn psnr(pred: &[[f64; 3]], target: &[[f64; 3]]) -> Result<f64, GeomError> {
    check_same_len("psnr", pred.len(), target.len())?;
    let (lo, hi) = target
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let range = hi - lo;
    let count = (pred.len() * 3) as f64;
    let mse = pred
        .iter()
        .flatten()
        .zip(target.iter().flatten())
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>()
        / count;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (range * range / mse).log10())
}

/// PSNR and mean L2 between two normal fields, compared as RGB images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalComparison {
    pub psnr: f64,
    pub l2: f64,
}

/// Normalizes both fields, maps them through [`normals_to_rgb`] and compares the images.
pub fn compare_normals(
    pred: &[[f64; 3]],
    reference: &[[f64; 3]],
) -> Result<NormalComparison, GeomError> {
    check_same_len("normal comparison", pred.len(), reference.len())?;
    let pred_rgb = normals_to_rgb(pred, true);
    let ref_rgb = normals_to_rgb(reference, true);
    Ok(NormalComparison {
        psnr: psnr(&pred_rgb, &ref_rgb)?,
        l2: mean_distance(&pred_rgb, &ref_rgb)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_use_unbiased_std() {
        let stats = ErrorStats::from_errors(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.max, 4.0);
        assert_eq!(ErrorStats::from_errors(&[2.0]).unwrap().std, 0.0);
        assert!(ErrorStats::from_errors(&[]).is_err());
    }

    #[test]
    fn psnr_of_identical_images_is_infinite() {
        let img = [[0.0, 0.5, 1.0], [0.2, 0.3, 0.4]];
        assert_eq!(psnr(&img, &img).unwrap(), f64::INFINITY);
    }

    #[test]
    fn psnr_matches_closed_form() {
        let target = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let pred = [[0.1, 0.1, 0.1], [1.0, 1.0, 1.0]];
        // mse = 3 * 0.01 / 6 = 0.005, range = 1
        let expected = 10.0 * (1.0_f64 / 0.005).log10();
        assert!((psnr(&pred, &target).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn compare_normals_ignores_magnitude() {
        let a = [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let b = [[0.0, 16.0, 0.0], [0.0, 0.0, 0.5]];
        let cmp = compare_normals(&a, &b).unwrap();
        assert_eq!(cmp.psnr, f64::INFINITY);
        assert_eq!(cmp.l2, 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(vertex_errors(&[[0.0; 3]], &[]).is_err());
        assert!(psnr(&[[0.0; 3]; 2], &[[0.0; 3]; 3]).is_err());
    }
}
