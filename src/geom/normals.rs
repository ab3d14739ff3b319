//! Face and vertex normals of sampled grids.
//!
//! Face normals are the raw cross product `(V[b] - V[a]) x (V[c] - V[a])`, so their length is
//! twice the triangle area. Vertex normals are the plain sum of incident face normals and are
//! never renormalized here: the loss compares raw sums, which mixes magnitude and direction
//! error. Normalize explicitly through [`normalize_normals`] or [`normals_to_rgb`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::core::Vec3;
use super::error::GeomError;

fn check_triangles(vertex_count: usize, triangles: &[[u32; 3]]) -> Result<(), GeomError> {
    for (t, tri) in triangles.iter().enumerate() {
        if let Some(bad) = tri.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeomError::shape(format!(
                "triangle {t} references vertex {bad}, but only {vertex_count} vertices exist"
            )));
        }
    }
    Ok(())
}

#[inline]
fn face_normal(points: &[[f64; 3]], [a, b, c]: [u32; 3]) -> [f64; 3] {
    let pa = Vec3::from_array(points[a as usize]);
    let e0 = Vec3::from_array(points[b as usize]) - pa;
    let e1 = Vec3::from_array(points[c as usize]) - pa;
    e0.cross(e1).to_array()
}

/// One unnormalized normal per triangle. Zero-area triangles give a zero normal.
pub fn face_normals(points: &[[f64; 3]], triangles: &[[u32; 3]]) -> Result<Vec<[f64; 3]>, GeomError> {
    check_triangles(points.len(), triangles)?;

    #[cfg(feature = "parallel")]
    let normals = triangles.par_iter().map(|&tri| face_normal(points, tri)).collect();
    #[cfg(not(feature = "parallel"))]
    let normals = triangles.iter().map(|&tri| face_normal(points, tri)).collect();

    Ok(normals)
}

/// Scatter-adds every face normal onto the three vertices of its triangle.
pub fn vertex_normals(
    points: &[[f64; 3]],
    triangles: &[[u32; 3]],
    face_normals: &[[f64; 3]],
) -> Result<Vec<[f64; 3]>, GeomError> {
    if face_normals.len() != triangles.len() {
        return Err(GeomError::shape(format!(
            "{} face normals for {} triangles",
            face_normals.len(),
            triangles.len()
        )));
    }
    check_triangles(points.len(), triangles)?;

    let mut normals = vec![Vec3::ZERO; points.len()];
    for (tri, n) in triangles.iter().zip(face_normals) {
        let n = Vec3::from_array(*n);
        for &i in tri {
            normals[i as usize] += n;
        }
    }
    Ok(normals.into_iter().map(Vec3::to_array).collect())
}

/// Face and vertex normals in one call.
pub fn mesh_normals(
    points: &[[f64; 3]],
    triangles: &[[u32; 3]],
) -> Result<(Vec<[f64; 3]>, Vec<[f64; 3]>), GeomError> {
    let faces = face_normals(points, triangles)?;
    let vertices = vertex_normals(points, triangles, &faces)?;
    Ok((faces, vertices))
}

/// Unit normals; zero (or non-finite) normals stay zero.
#[must_use]
pub fn normalize_normals(normals: &[[f64; 3]]) -> Vec<[f64; 3]> {
    normals
        .iter()
        .map(|&n| Vec3::from_array(n).normalized().map_or([0.0; 3], Vec3::to_array))
        .collect()
}

/// Maps normals to RGB for display: Y and Z swap, then `0.5 + 0.5 n`.
///
/// With `normalize` false the raw sums are mapped as-is.
#[must_use]
pub fn normals_to_rgb(normals: &[[f64; 3]], normalize: bool) -> Vec<[f64; 3]> {
    let source = if normalize { normalize_normals(normals) } else { normals.to_vec() };
    source
        .into_iter()
        .map(|n| [0.5 + 0.5 * n[0], 0.5 + 0.5 * n[2], 0.5 + 0.5 * n[1]])
        .collect()
}

/// Number of triangles touching each vertex.
pub fn incidence_counts(vertex_count: usize, triangles: &[[u32; 3]]) -> Result<Vec<u32>, GeomError> {
    check_triangles(vertex_count, triangles)?;
    let mut counts = vec![0u32; vertex_count];
    for tri in triangles {
        for &i in tri {
            counts[i as usize] += 1;
        }
    }
    Ok(counts)
}
