use crate::geom::{
    Complex, CornerSet, GeneratedSurface, GeomMetrics, GeomTimingReport, SampledComplex,
    TimingBucket, UvGrid, face_normals, sample_complex, triangle_indices, vertex_normals,
};

use super::error::ModelError;
use super::loss::{LossWeights, NormalTerm, SurfaceLoss, surface_loss};
use super::{ModelInput, SurfaceModel};

/// Ground truth prepared once per experiment: topology and reference normals.
#[derive(Debug, Clone)]
pub struct TargetSurface {
    pub complex: Complex,
    pub points: Vec<[f64; 3]>,
    pub sample_rate: usize,
    pub triangles: Vec<[u32; 3]>,
    pub face_normals: Vec<[f64; 3]>,
    pub vertex_normals: Vec<[f64; 3]>,
}

impl TargetSurface {
    pub fn new(surface: &GeneratedSurface) -> Result<Self, ModelError> {
        Self::from_points(surface.complex.clone(), surface.points.clone(), surface.sample_rate)
    }

    pub fn from_points(
        complex: Complex,
        points: Vec<[f64; 3]>,
        sample_rate: usize,
    ) -> Result<Self, ModelError> {
        let triangles = triangle_indices(complex.patch_count(), sample_rate)?;
        let expected = complex.patch_count() * sample_rate * sample_rate;
        if points.len() != expected {
            return Err(ModelError::InvalidShape(format!(
                "{} target points, expected {expected}",
                points.len()
            )));
        }
        let faces = face_normals(&points, &triangles)?;
        let vertices = vertex_normals(&points, &triangles, &faces)?;
        Ok(Self { complex, points, sample_rate, triangles, face_normals: faces, vertex_normals: vertices })
    }
}

#[derive(Debug, Clone)]
pub struct StepOutput {
    pub sampled: SampledComplex,
    pub predicted: Vec<[f64; 3]>,
    pub face_normals: Vec<[f64; 3]>,
    pub vertex_normals: Vec<[f64; 3]>,
    pub loss: SurfaceLoss,
    pub timing: Option<GeomTimingReport>,
}

/// Samples the corner set, runs the model and scores the prediction against `target`.
///
/// Parameters are left untouched; hand them to an [`Optimizer`](super::Optimizer) afterwards.
pub fn forward_step<M: SurfaceModel + ?Sized>(
    model: &M,
    target: &TargetSurface,
    corners: &CornerSet,
    grid: &UvGrid,
    weights: &LossWeights,
) -> Result<StepOutput, ModelError> {
    if grid.sample_rate() != target.sample_rate {
        return Err(ModelError::InvalidShape(format!(
            "grid sample rate {} does not match target sample rate {}",
            grid.sample_rate(),
            target.sample_rate
        )));
    }

    let mut metrics = GeomMetrics::default();
    metrics.begin();

    let sampled =
        metrics.time(TimingBucket::Sampling, || sample_complex(&target.complex, corners, grid))?;
    let features = sampled
        .features
        .as_ref()
        .ok_or_else(|| ModelError::InvalidShape("corner set carries no features".into()))?;

    let input = ModelInput::new(&sampled.points, features, Some(&sampled.uv))?;
    let predicted = metrics.time(TimingBucket::Prediction, || model.predict(&input))?;

    let (faces, vertices) = metrics.time(TimingBucket::Normals, || {
        let faces = face_normals(&predicted, &target.triangles)?;
        let vertices = vertex_normals(&predicted, &target.triangles, &faces)?;
        Ok::<_, ModelError>((faces, vertices))
    })?;

    let loss = metrics.time(TimingBucket::Evaluation, || match weights.normal_term {
        NormalTerm::Vertex => {
            surface_loss(&predicted, &target.points, &vertices, &target.vertex_normals, weights)
        }
        NormalTerm::Face => {
            surface_loss(&predicted, &target.points, &faces, &target.face_normals, weights)
        }
    })?;

    log::debug!(
        "{}: vertex loss {:.6}, normal loss {:.6}",
        model.name(),
        loss.vertex,
        loss.normal
    );

    Ok(StepOutput {
        sampled,
        predicted,
        face_normals: faces,
        vertex_normals: vertices,
        loss,
        timing: metrics.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::flat;

    struct Echo;

    impl SurfaceModel for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn input_dim(&self) -> usize {
            0
        }

        fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<[f64; 3]>, ModelError> {
            Ok(input.points.to_vec())
        }
    }

    #[test]
    fn identity_model_scores_the_lerped_grid() {
        let surface = flat(4).unwrap();
        let target = TargetSurface::new(&surface).unwrap();
        let corners = surface.corner_set().with_random_features(3, 0).unwrap();
        let grid = UvGrid::new(4).unwrap();
        let out = forward_step(&Echo, &target, &corners, &grid, &LossWeights::default()).unwrap();
        assert_eq!(out.face_normals.len(), 18);
        assert_eq!(out.predicted, out.sampled.points);
        assert!(out.loss.vertex > 0.0);

        // Scoring against the lerped grid itself is exact.
        let exact =
            TargetSurface::from_points(target.complex.clone(), out.sampled.points.clone(), 4).unwrap();
        let out = forward_step(&Echo, &exact, &corners, &grid, &LossWeights::default()).unwrap();
        assert_eq!(out.loss.total, 0.0);
    }

    #[test]
    fn featureless_corners_are_rejected() {
        let surface = flat(3).unwrap();
        let target = TargetSurface::new(&surface).unwrap();
        let grid = UvGrid::new(3).unwrap();
        let err = forward_step(&Echo, &target, &surface.corner_set(), &grid, &LossWeights::default());
        assert!(matches!(err, Err(ModelError::InvalidShape(_))));
    }

    #[test]
    fn grid_must_match_target_rate() {
        let surface = flat(3).unwrap();
        let target = TargetSurface::new(&surface).unwrap();
        let corners = surface.corner_set().with_random_features(2, 0).unwrap();
        let grid = UvGrid::new(5).unwrap();
        assert!(forward_step(&Echo, &target, &corners, &grid, &LossWeights::face()).is_err());
    }
}
