//! Quantized, line-oriented text snapshots of generated patches.
//!
//! Used by the CLI and by golden tests; values are rounded to [`SNAPSHOT_QUANTIZE`] so tiny
//! floating point drift does not show up as a diff.

use std::fmt::Write as _;

use crate::geom::{GeneratedSurface, PatchMesh, PatchMeshDiagnostics};

pub const SNAPSHOT_QUANTIZE: f64 = 1e-6;
const SNAPSHOT_DECIMALS: usize = 6;

/// Unix newlines with exactly one trailing newline.
#[must_use]
pub fn normalize_snapshot_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    if normalized.ends_with('\n') {
        normalized
    } else {
        format!("{normalized}\n")
    }
}

fn quantize_f64(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
    // -0.0 prints as "-0.000000"
    if q == 0.0 { 0.0 } else { q }
}

fn write_f64(out: &mut String, value: f64) {
    let value = quantize_f64(value);
    let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
}

fn write_vec3_line(out: &mut String, prefix: &str, v: [f64; 3]) {
    let _ = write!(out, "{prefix} ");
    write_f64(out, v[0]);
    out.push(' ');
    write_f64(out, v[1]);
    out.push(' ');
    write_f64(out, v[2]);
    out.push('\n');
}

fn write_diagnostics(out: &mut String, diag: &PatchMeshDiagnostics) {
    let _ = writeln!(out, "mesh_diag.vertex_count {}", diag.vertex_count);
    let _ = writeln!(out, "mesh_diag.triangle_count {}", diag.triangle_count);
    let _ = writeln!(out, "mesh_diag.degenerate_triangle_count {}", diag.degenerate_triangle_count);
    let _ = writeln!(out, "mesh_diag.zero_normal_vertex_count {}", diag.zero_normal_vertex_count);
    let _ = writeln!(out, "mesh_diag.isolated_vertex_count {}", diag.isolated_vertex_count);
    let _ = writeln!(out, "mesh_diag.min_incidence {}", diag.min_incidence);
    let _ = writeln!(out, "mesh_diag.max_incidence {}", diag.max_incidence);
    let _ = write!(out, "mesh_diag.max_face_normal_length ");
    write_f64(out, diag.max_face_normal_length);
    out.push('\n');
    let _ = writeln!(out, "mesh_diag.warning_count {}", diag.warnings.len());
    for (idx, warning) in diag.warnings.iter().enumerate() {
        let _ = writeln!(out, "mesh_diag.warning.{idx} {warning}");
    }
}

fn write_mesh(out: &mut String, mesh: &PatchMesh) {
    let _ = writeln!(out, "mesh.vertex_count {}", mesh.vertex_count());
    let _ = writeln!(out, "mesh.triangle_count {}", mesh.triangle_count());
    let _ = writeln!(out, "mesh.has_uvs {}", mesh.uvs.is_some());
    let _ = writeln!(out, "mesh.has_normals {}", mesh.normals.is_some());

    let _ = writeln!(out, "mesh.positions {}", mesh.positions.len());
    for p in mesh.positions.iter().copied() {
        write_vec3_line(out, "p", p);
    }

    let _ = writeln!(out, "mesh.indices {}", mesh.triangles.len());
    for [a, b, c] in mesh.triangles.iter().copied() {
        let _ = writeln!(out, "i {a} {b} {c}");
    }

    if let Some(quads) = mesh.quads.as_ref() {
        let _ = writeln!(out, "mesh.quads {}", quads.len());
        for [a, b, c, d] in quads.iter().copied() {
            let _ = writeln!(out, "q {a} {b} {c} {d}");
        }
    } else {
        let _ = writeln!(out, "mesh.quads none");
    }

    if let Some(normals) = mesh.normals.as_ref() {
        let _ = writeln!(out, "mesh.normals {}", normals.len());
        for n in normals.iter().copied() {
            write_vec3_line(out, "n", n);
        }
    } else {
        let _ = writeln!(out, "mesh.normals none");
    }
}

/// Snapshot of a generated surface: corners, mesh diagnostics and the full mesh.
#[must_use]
pub fn surface_snapshot(
    op: &str,
    surface: &GeneratedSurface,
    mesh: &PatchMesh,
    diag: &PatchMeshDiagnostics,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# patchfit-engine golden v1");
    let _ = writeln!(out, "op {op}");
    let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
    let _ = writeln!(out, "sample_rate {}", surface.sample_rate);
    for corner in surface.corners {
        write_vec3_line(&mut out, "c", corner);
    }
    write_diagnostics(&mut out, diag);
    write_mesh(&mut out, mesh);
    normalize_snapshot_text(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_drops_negative_zero_and_noise() {
        let mut out = String::new();
        write_f64(&mut out, -1e-9);
        out.push(' ');
        write_f64(&mut out, 0.123_456_700_1);
        assert_eq!(out, "0.000000 0.123457");
    }

    #[test]
    fn normalize_adds_single_trailing_newline() {
        assert_eq!(normalize_snapshot_text("a\r\nb"), "a\nb\n");
        assert_eq!(normalize_snapshot_text("a\n"), "a\n");
    }
}
