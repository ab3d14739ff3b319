//! Bilinear sampling of quad complexes.
//!
//! The corner weights are crossed relative to the textbook pairing:
//!
//! ```text
//! result = C0*U*V + C1*(1-U)*V + C3*U*(1-V) + C2*(1-U)*(1-V)
//! ```
//!
//! so `(0,0)` lands on `C2`, `(1,0)` on `C3`, `(0,1)` on `C1` and `(1,1)` on `C0`. Every consumer
//! of sampled geometry (targets, predictions, stored reports) depends on this exact pairing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::{GeomError, check_sample_rate};
use super::rows::Rows;

/// Width of the learned per-corner feature vectors used by the model catalogue.
pub const POINT_ENCODING_SIZE: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Complex
// ─────────────────────────────────────────────────────────────────────────────

/// Patches sharing one corner pool. Each patch lists its corners as
/// bottom-left, bottom-right, top-right, top-left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complex {
    patches: Vec<[u32; 4]>,
}

impl Complex {
    pub fn new(patches: Vec<[u32; 4]>) -> Result<Self, GeomError> {
        if patches.is_empty() {
            return Err(GeomError::shape("complex must contain at least one patch"));
        }
        Ok(Self { patches })
    }

    /// The `[[0, 1, 2, 3]]` complex used by every generated surface.
    #[must_use]
    pub fn single_patch() -> Self {
        Self { patches: vec![[0, 1, 2, 3]] }
    }

    #[must_use]
    pub fn patches(&self) -> &[[u32; 4]] {
        &self.patches
    }

    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Checks that every patch references a corner below `corner_count`.
    pub fn validate_against(&self, corner_count: usize) -> Result<(), GeomError> {
        for (patch_index, patch) in self.patches.iter().enumerate() {
            if let Some(bad) = patch.iter().find(|&&c| c as usize >= corner_count) {
                return Err(GeomError::shape(format!(
                    "patch {patch_index} references corner {bad}, but only {corner_count} corners exist"
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Corner set
// ─────────────────────────────────────────────────────────────────────────────

/// Corner positions and optional learned corner features.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    positions: Vec<[f64; 3]>,
    features: Option<Rows>,
}

impl CornerSet {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>) -> Self {
        Self { positions, features: None }
    }

    pub fn with_features(mut self, features: Rows) -> Result<Self, GeomError> {
        if features.len() != self.positions.len() {
            return Err(GeomError::shape(format!(
                "corner features have {} rows, expected one per corner ({})",
                features.len(),
                self.positions.len()
            )));
        }
        self.features = Some(features);
        Ok(self)
    }

    /// Attaches standard-normal features of width `dim`, drawn from a seeded generator.
    pub fn with_random_features(self, dim: usize, seed: u64) -> Result<Self, GeomError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..self.positions.len() * dim)
            .map(|_| standard_normal(&mut rng))
            .collect();
        let features = Rows::from_flat(data, dim)?;
        self.with_features(features)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.positions
    }

    /// Positions and features borrowed mutably at the same time.
    pub fn split_mut(&mut self) -> (&mut [[f64; 3]], Option<&mut Rows>) {
        (&mut self.positions, self.features.as_mut())
    }

    #[must_use]
    pub fn features(&self) -> Option<&Rows> {
        self.features.as_ref()
    }

    pub fn features_mut(&mut self) -> Option<&mut Rows> {
        self.features.as_mut()
    }
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    // Box-Muller; `1 - r` keeps the logarithm finite.
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

// ─────────────────────────────────────────────────────────────────────────────
// UV grid
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpacing {
    /// `u_i = i / R`; the last sample stops short of 1.
    #[default]
    HalfOpen,
    /// `u_i = i / (R - 1)`; both 0 and 1 are sampled.
    Closed,
}

/// R×R grid of UV samples. Flat index `i * R + j` holds `(u_i, u_j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UvGrid {
    sample_rate: usize,
    spacing: GridSpacing,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl UvGrid {
    pub fn new(sample_rate: usize) -> Result<Self, GeomError> {
        Self::with_spacing(sample_rate, GridSpacing::HalfOpen)
    }

    pub fn with_spacing(sample_rate: usize, spacing: GridSpacing) -> Result<Self, GeomError> {
        check_sample_rate(sample_rate)?;
        let n = sample_rate * sample_rate;
        let mut u = Vec::with_capacity(n);
        let mut v = Vec::with_capacity(n);
        for i in 0..sample_rate {
            for j in 0..sample_rate {
                u.push(grid_coordinate(i, sample_rate, spacing));
                v.push(grid_coordinate(j, sample_rate, spacing));
            }
        }
        Ok(Self { sample_rate, spacing, u, v })
    }

    /// Grid built from arbitrary coordinates, for evaluating the interpolation at chosen points.
    ///
    /// The result has no sample rate ([`UvGrid::sample_rate`] is 0), so it only feeds
    /// [`sample`], [`sample_points`] and [`sample_complex`]. Meshing the samples with
    /// [`PatchMesh::from_sampled`](super::mesh::PatchMesh::from_sampled) or running an engine
    /// forward step on it fails with a shape error.
    pub fn from_coordinates(u: Vec<f64>, v: Vec<f64>) -> Result<Self, GeomError> {
        if u.len() != v.len() {
            return Err(GeomError::shape(format!(
                "U has {} samples but V has {}",
                u.len(),
                v.len()
            )));
        }
        Ok(Self { sample_rate: 0, spacing: GridSpacing::HalfOpen, u, v })
    }

    /// Sample rate, or 0 for grids built from raw coordinates.
    #[must_use]
    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    #[must_use]
    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.u.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    #[must_use]
    pub fn u(&self) -> &[f64] {
        &self.u
    }

    #[must_use]
    pub fn v(&self) -> &[f64] {
        &self.v
    }

    /// `[len, 2]` rows of `(u, v)`.
    #[must_use]
    pub fn to_rows(&self) -> Rows {
        let mut rows = Rows::zeros(self.len(), 2);
        for (k, (u, v)) in self.u.iter().zip(&self.v).enumerate() {
            rows.row_mut(k).copy_from_slice(&[*u, *v]);
        }
        rows
    }
}

/// 1D grid coordinate of sample `i` at `sample_rate`.
#[must_use]
pub fn grid_coordinate(i: usize, sample_rate: usize, spacing: GridSpacing) -> f64 {
    match spacing {
        GridSpacing::HalfOpen => i as f64 / sample_rate as f64,
        GridSpacing::Closed => i as f64 / (sample_rate - 1) as f64,
    }
}

/// Sampling configuration with builder-style setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub sample_rate: usize,
    pub spacing: GridSpacing,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self { sample_rate: 16, spacing: GridSpacing::HalfOpen }
    }
}

impl SamplingOptions {
    #[must_use]
    pub const fn new(sample_rate: usize) -> Self {
        Self { sample_rate, spacing: GridSpacing::HalfOpen }
    }

    #[must_use]
    pub const fn spacing(mut self, spacing: GridSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn grid(self) -> Result<UvGrid, GeomError> {
        UvGrid::with_spacing(self.sample_rate, self.spacing)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interpolation
// ─────────────────────────────────────────────────────────────────────────────

/// Interpolates four equally wide corner values at `(u, v)` into `out`.
///
/// No clamping: `u`/`v` outside `[0, 1]` extrapolate.
pub fn lerp(corners: [&[f64]; 4], u: f64, v: f64, out: &mut [f64]) {
    let w0 = u * v;
    let w1 = (1.0 - u) * v;
    let w3 = u * (1.0 - v);
    let w2 = (1.0 - u) * (1.0 - v);
    for (d, slot) in out.iter_mut().enumerate() {
        *slot = corners[0][d] * w0 + corners[1][d] * w1 + corners[3][d] * w3 + corners[2][d] * w2;
    }
}

#[must_use]
pub fn lerp_point(corners: &[[f64; 3]; 4], u: f64, v: f64) -> [f64; 3] {
    let mut out = [0.0; 3];
    lerp([&corners[0], &corners[1], &corners[2], &corners[3]], u, v, &mut out);
    out
}

/// Samples one patch: `corner_values` must hold exactly 4 rows of any width.
pub fn sample(corner_values: &Rows, grid: &UvGrid) -> Result<Rows, GeomError> {
    if corner_values.len() != 4 {
        return Err(GeomError::shape(format!(
            "a patch needs 4 corner rows, got {}",
            corner_values.len()
        )));
    }
    let corners = [
        corner_values.row(0),
        corner_values.row(1),
        corner_values.row(2),
        corner_values.row(3),
    ];
    let mut out = Rows::zeros(grid.len(), corner_values.dim());
    for k in 0..grid.len() {
        lerp(corners, grid.u[k], grid.v[k], out.row_mut(k));
    }
    Ok(out)
}

/// Point form of [`sample`].
pub fn sample_points(corners: &[[f64; 3]], grid: &UvGrid) -> Result<Vec<[f64; 3]>, GeomError> {
    let corners: &[[f64; 3]; 4] = corners.try_into().map_err(|_| {
        GeomError::shape(format!("a patch needs 4 corner points, got {}", corners.len()))
    })?;
    Ok(grid
        .u
        .iter()
        .zip(&grid.v)
        .map(|(&u, &v)| lerp_point(corners, u, v))
        .collect())
}

/// Samples of every patch of a complex, patch after patch.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledComplex {
    pub points: Vec<[f64; 3]>,
    /// Present when the corner set carries features.
    pub features: Option<Rows>,
    /// `(u, v)` of each sample, repeated for every patch.
    pub uv: Rows,
    pub sample_rate: usize,
    pub patch_count: usize,
}

impl SampledComplex {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Samples every patch of `complex` on `grid`.
///
/// The flat sample index is `patch_index * grid.len() + k`.
pub fn sample_complex(
    complex: &Complex,
    corners: &CornerSet,
    grid: &UvGrid,
) -> Result<SampledComplex, GeomError> {
    complex.validate_against(corners.len())?;

    let per_patch = grid.len();
    let total = per_patch * complex.patch_count();
    let positions = corners.positions();
    let features = corners.features();
    let feature_dim = features.map_or(0, Rows::dim);

    let mut points = Vec::with_capacity(total);
    let mut lerped_features = features.map(|_| Rows::zeros(total, feature_dim));
    let mut uv = Rows::zeros(total, 2);

    for (patch_index, patch) in complex.patches().iter().enumerate() {
        let patch_corners = patch.map(|c| positions[c as usize]);
        let offset = patch_index * per_patch;
        for k in 0..per_patch {
            let (u, v) = (grid.u[k], grid.v[k]);
            points.push(lerp_point(&patch_corners, u, v));
            uv.row_mut(offset + k).copy_from_slice(&[u, v]);
        }

        if let (Some(source), Some(target)) = (features, lerped_features.as_mut()) {
            let rows = patch.map(|c| source.row(c as usize));
            for k in 0..per_patch {
                lerp(rows, grid.u[k], grid.v[k], target.row_mut(offset + k));
            }
        }
    }

    log::debug!(
        "sampled {} patches x {} samples (feature dim {feature_dim})",
        complex.patch_count(),
        per_patch
    );

    Ok(SampledComplex {
        points,
        features: lerped_features,
        uv,
        sample_rate: grid.sample_rate(),
        patch_count: complex.patch_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_grid_never_reaches_one() {
        let grid = UvGrid::new(4).unwrap();
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.u()[15], 0.75);
        assert_eq!(grid.v()[15], 0.75);
        // Flat index i * R + j: U follows i, V follows j.
        assert_eq!((grid.u()[1], grid.v()[1]), (0.0, 0.25));
        assert_eq!((grid.u()[4], grid.v()[4]), (0.25, 0.0));
    }

    #[test]
    fn closed_grid_spans_unit_interval() {
        let grid = UvGrid::with_spacing(3, GridSpacing::Closed).unwrap();
        assert_eq!(grid.u()[8], 1.0);
        assert_eq!(grid.v()[1], 0.5);
    }

    #[test]
    fn grid_rejects_small_rates() {
        assert!(matches!(UvGrid::new(1), Err(GeomError::InvalidShape(_))));
        assert!(UvGrid::new(0).is_err());
    }

    #[test]
    fn complex_rejects_dangling_corner() {
        let complex = Complex::new(vec![[0, 1, 2, 4]]).unwrap();
        assert!(complex.validate_against(4).is_err());
        assert!(complex.validate_against(5).is_ok());
        assert!(Complex::new(Vec::new()).is_err());
    }

    #[test]
    fn random_features_are_seeded() {
        let corners = vec![[0.0; 3]; 4];
        let a = CornerSet::new(corners.clone()).with_random_features(5, 7).unwrap();
        let b = CornerSet::new(corners).with_random_features(5, 7).unwrap();
        assert_eq!(a.features(), b.features());
        let f = a.features().unwrap();
        assert_eq!((f.len(), f.dim()), (4, 5));
        assert!(f.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn feature_rows_must_match_corner_count() {
        let corners = CornerSet::new(vec![[0.0; 3]; 4]);
        assert!(corners.with_features(Rows::zeros(3, 2)).is_err());
    }
}
