use serde::Serialize;

use super::diagnostics::PatchMeshDiagnostics;
use super::error::GeomError;
use super::metrics::{GeomMetrics, TimingBucket};
use super::normals::{incidence_counts, mesh_normals};
use super::sampler::SampledComplex;
use super::topology::{quad_indices, triangle_indices};
use super::{Tolerance, Vec3};

/// Triangle mesh of a sampled complex with optional per-vertex attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PatchMesh {
    pub positions: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// Same cells as `triangles`, one quad per cell.
    pub quads: Option<Vec<[u32; 4]>>,
    pub uvs: Option<Vec<[f64; 2]>>,
    /// Raw (unnormalized) vertex normals.
    pub normals: Option<Vec<[f64; 3]>>,
}

impl PatchMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, triangles: Vec<[u32; 3]>) -> Self {
        Self { positions, triangles, ..Self::default() }
    }

    /// Builds the grid mesh of `patch_count` patches sampled at `sample_rate`.
    ///
    /// `positions` must hold `patch_count * sample_rate²` points laid out patch after patch.
    pub fn from_grid(
        positions: Vec<[f64; 3]>,
        patch_count: usize,
        sample_rate: usize,
    ) -> Result<Self, GeomError> {
        let expected = patch_count * sample_rate * sample_rate;
        if positions.len() != expected {
            return Err(GeomError::shape(format!(
                "{} positions for {patch_count} patches at rate {sample_rate} (expected {expected})",
                positions.len()
            )));
        }
        let triangles = triangle_indices(patch_count, sample_rate)?;
        let quads = quad_indices(patch_count, sample_rate)?;
        Ok(Self { positions, triangles, quads: Some(quads), uvs: None, normals: None })
    }

    /// Mesh of sampled points with their UVs and raw vertex normals attached.
    pub fn from_sampled(sampled: &SampledComplex) -> Result<Self, GeomError> {
        let mut mesh = Self::from_grid(sampled.points.clone(), sampled.patch_count, sampled.sample_rate)?;
        mesh.uvs = Some(sampled.uv.iter().map(|r| [r[0], r[1]]).collect());
        mesh.compute_normals()?;
        Ok(mesh)
    }

    /// Replaces `normals` with the raw vertex normals of the current positions.
    pub fn compute_normals(&mut self) -> Result<(), GeomError> {
        let (_, vertex) = mesh_normals(&self.positions, &self.triangles)?;
        self.normals = Some(vertex);
        Ok(())
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions.iter().flatten().any(|c| !c.is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.triangles.iter().flatten().all(|&i| (i as usize) < n)
            && self
                .quads
                .as_ref()
                .is_none_or(|quads| quads.iter().flatten().all(|&i| (i as usize) < n))
    }

    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    /// `[x0, y0, z0, x1, ...]` view over `positions`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    #[must_use]
    pub fn indices_flat(&self) -> &[u32] {
        self.triangles.as_flattened()
    }

    #[must_use]
    pub fn quads_flat(&self) -> Option<&[u32]> {
        self.quads.as_deref().map(<[[u32; 4]]>::as_flattened)
    }

    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(<[[f64; 2]]>::as_flattened)
    }

    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(<[[f64; 3]]>::as_flattened)
    }

    /// Counts degenerate faces, zero vertex normals and incidence extremes.
    pub fn diagnostics(&self, tol: Tolerance) -> Result<PatchMeshDiagnostics, GeomError> {
        let mut metrics = GeomMetrics::default();
        metrics.begin();

        let mut diag = metrics.time(TimingBucket::Diagnostics, || -> Result<_, GeomError> {
            let (faces, vertex) = mesh_normals(&self.positions, &self.triangles)?;
            let counts = incidence_counts(self.positions.len(), &self.triangles)?;

            let mut diag = PatchMeshDiagnostics::new();
            diag.vertex_count = self.vertex_count();
            diag.triangle_count = self.triangle_count();
            diag.degenerate_triangle_count = faces.iter().filter(|&&n| tol.is_zero_vec3(n)).count();
            diag.zero_normal_vertex_count = vertex.iter().filter(|&&n| tol.is_zero_vec3(n)).count();
            diag.min_incidence = counts.iter().copied().min().unwrap_or(0);
            diag.max_incidence = counts.iter().copied().max().unwrap_or(0);
            diag.isolated_vertex_count = counts.iter().filter(|&&c| c == 0).count();
            diag.max_face_normal_length = faces
                .iter()
                .map(|&n| Vec3::from_array(n).length())
                .fold(0.0, f64::max);
            Ok(diag)
        })?;

        if diag.degenerate_triangle_count > 0 {
            diag.add_warning(format!(
                "{} degenerate triangles contribute zero normals",
                diag.degenerate_triangle_count
            ));
        }
        if diag.isolated_vertex_count > 0 {
            diag.add_warning(format!("{} vertices belong to no triangle", diag.isolated_vertex_count));
        }
        diag.timing = metrics.end();
        Ok(diag)
    }
}
