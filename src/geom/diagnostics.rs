//! Diagnostics for sampled patch meshes.
//!
//! Degenerate triangles are not errors in this crate: they produce zero face normals that
//! flow arithmetically into the vertex sums. [`PatchMeshDiagnostics`] makes them visible so
//! callers can tell a flat prediction from a collapsed one.
//!
//! # Example
//!
//! ```ignore
//! let diag = mesh.diagnostics(Tolerance::ZERO_LENGTH)?;
//! if diag.has_warnings() {
//!     log::warn!("{}", diag.summary());
//! }
//! ```

use serde::Serialize;

use super::metrics::GeomTimingReport;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PatchMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    /// Triangles whose face normal is zero within tolerance.
    pub degenerate_triangle_count: usize,

    /// Vertices whose summed normal is zero within tolerance.
    ///
    /// Either every incident face is degenerate or the incident normals cancel out.
    pub zero_normal_vertex_count: usize,

    /// Vertices referenced by no triangle.
    pub isolated_vertex_count: usize,

    /// Smallest number of triangles touching a vertex.
    pub min_incidence: u32,
    /// Largest number of triangles touching a vertex (6 for interior grid vertices).
    pub max_incidence: u32,

    /// Length of the largest face normal, i.e. twice the largest triangle area.
    pub max_face_normal_length: f64,

    /// Only populated with the `mesh_engine_metrics` feature on non-wasm targets.
    #[serde(skip)]
    pub timing: Option<GeomTimingReport>,

    pub warnings: Vec<String>,
}

impl PatchMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No degenerate faces, no zero normals, no isolated vertices.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_triangle_count == 0
            && self.zero_normal_vertex_count == 0
            && self.isolated_vertex_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// One-line summary for logs and the CLI.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "degenerate={} zero_normals={} incidence={}..{}",
            self.degenerate_triangle_count,
            self.zero_normal_vertex_count,
            self.min_incidence,
            self.max_incidence
        );
        if let Some(timing) = self.timing.as_ref() {
            out.push_str(&format!(" total_ms={:.3}", timing.total_ms()));
        }
        out
    }
}
