use crate::geom::{
    flatten_triangles, patch_offset, quad_indices, quads_per_patch, triangle_indices,
    triangles_from_flat, triangles_per_patch,
};

#[test]
fn first_cell_winding() {
    let tris = triangle_indices(1, 3).unwrap();
    assert_eq!(tris.len(), 8);
    assert_eq!(tris[0], [0, 1, 3]);
    assert_eq!(tris[1], [1, 4, 3]);

    let quads = quad_indices(1, 3).unwrap();
    assert_eq!(quads.len(), 4);
    assert_eq!(quads[0], [1, 4, 3, 0]);
}

#[test]
fn counts_and_ranges_per_patch() {
    for rate in 2..7 {
        let patches = 3;
        let tris = triangle_indices(patches, rate).unwrap();
        assert_eq!(tris.len(), patches * triangles_per_patch(rate));
        assert_eq!(triangles_per_patch(rate), 2 * (rate - 1) * (rate - 1));
        assert_eq!(quad_indices(patches, rate).unwrap().len(), patches * quads_per_patch(rate));

        let per_patch = triangles_per_patch(rate);
        for (t, tri) in tris.iter().enumerate() {
            let p = t / per_patch;
            let lo = patch_offset(p, rate) as u32;
            let hi = patch_offset(p + 1, rate) as u32;
            assert!(tri.iter().all(|&i| (lo..hi).contains(&i)), "rate {rate} tri {t}");
        }
    }
}

#[test]
fn second_patch_is_offset_by_r_squared() {
    let tris = triangle_indices(2, 3).unwrap();
    assert_eq!(tris[8], [9, 10, 12]);
}

#[test]
fn zero_patches_yield_nothing_and_small_rates_fail() {
    assert!(triangle_indices(0, 4).unwrap().is_empty());
    assert!(triangle_indices(1, 1).is_err());
    assert!(quad_indices(1, 0).is_err());
}

#[test]
fn flat_buffer_round_trip_and_bad_length() {
    let tris = triangle_indices(1, 2).unwrap();
    let flat = flatten_triangles(&tris);
    assert_eq!(flat, vec![0, 1, 2, 1, 3, 2]);
    assert_eq!(triangles_from_flat(&flat).unwrap(), tris);
    assert!(triangles_from_flat(&flat[..5]).is_err());
}
