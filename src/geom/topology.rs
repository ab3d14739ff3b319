//! Grid connectivity for sampled complexes.
//!
//! Patch `p` owns the flat sample range `[p * R², (p + 1) * R²)`. Cell `(i, j)` with
//! `i, j` in `[0, R - 2]` has corners
//!
//! ```text
//! a = offset + i*R + j      b = a + 1
//! c = offset + (i+1)*R + j  d = c + 1
//! ```
//!
//! and yields triangles `(a, b, c)`, `(b, d, c)` or the quad `(b, d, c, a)`.

use super::error::{GeomError, check_sample_rate, index_u32};

/// First flat sample index of a patch.
#[must_use]
pub const fn patch_offset(patch_index: usize, sample_rate: usize) -> usize {
    patch_index * sample_rate * sample_rate
}

#[must_use]
pub const fn triangles_per_patch(sample_rate: usize) -> usize {
    let cells = sample_rate.saturating_sub(1);
    2 * cells * cells
}

#[must_use]
pub const fn quads_per_patch(sample_rate: usize) -> usize {
    let cells = sample_rate.saturating_sub(1);
    cells * cells
}

/// Visits every cell of every patch as `(a, b, c, d)`.
fn for_each_cell(
    num_patches: usize,
    sample_rate: usize,
    mut visit: impl FnMut([u32; 4]),
) -> Result<(), GeomError> {
    check_sample_rate(sample_rate)?;
    let last = patch_offset(num_patches, sample_rate);
    if num_patches > 0 {
        index_u32(last - 1)?;
    }

    for patch_index in 0..num_patches {
        let offset = patch_offset(patch_index, sample_rate);
        for i in 0..sample_rate - 1 {
            for j in 0..sample_rate - 1 {
                let corner_a = offset + i * sample_rate + j;
                let corner_c = offset + (i + 1) * sample_rate + j;
                let corner_b = corner_a + 1;
                let corner_d = corner_c + 1;
                // Range checked above against the last index of the last patch.
                visit([
                    corner_a as u32,
                    corner_b as u32,
                    corner_c as u32,
                    corner_d as u32,
                ]);
            }
        }
    }
    Ok(())
}

/// `2 (R-1)²` triangles per patch.
pub fn triangle_indices(num_patches: usize, sample_rate: usize) -> Result<Vec<[u32; 3]>, GeomError> {
    let mut triangles = Vec::with_capacity(num_patches * triangles_per_patch(sample_rate));
    for_each_cell(num_patches, sample_rate, |[a, b, c, d]| {
        triangles.push([a, b, c]);
        triangles.push([b, d, c]);
    })?;
    Ok(triangles)
}

/// `(R-1)²` quads per patch, wound `(b, d, c, a)`.
pub fn quad_indices(num_patches: usize, sample_rate: usize) -> Result<Vec<[u32; 4]>, GeomError> {
    let mut quads = Vec::with_capacity(num_patches * quads_per_patch(sample_rate));
    for_each_cell(num_patches, sample_rate, |[a, b, c, d]| {
        quads.push([b, d, c, a]);
    })?;
    Ok(quads)
}

/// Flat `u32` index buffer, three entries per triangle.
#[must_use]
pub fn flatten_triangles(triangles: &[[u32; 3]]) -> Vec<u32> {
    triangles.iter().flatten().copied().collect()
}

/// Splits a flat index buffer back into triangles.
pub fn triangles_from_flat(indices: &[u32]) -> Result<Vec<[u32; 3]>, GeomError> {
    if indices.len() % 3 != 0 {
        return Err(GeomError::shape(format!(
            "index buffer length {} is not a multiple of 3",
            indices.len()
        )));
    }
    Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
}
