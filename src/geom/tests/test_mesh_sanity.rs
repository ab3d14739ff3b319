use crate::geom::{GeneratedSurface, PatchMesh, Tolerance, curved, flat, sample_complex, UvGrid};

#[test]
fn generated_mesh_is_valid_with_packed_buffers() {
    let surface: GeneratedSurface = curved(5, 0.25).unwrap();
    let mesh = surface.mesh().unwrap();

    mesh.validate().expect("mesh validate");
    assert_eq!(mesh.positions_flat().len(), mesh.positions.len() * 3);
    assert_eq!(mesh.indices_flat().len(), mesh.triangles.len() * 3);
    assert_eq!(mesh.normals_flat().unwrap().len(), mesh.positions.len() * 3);
    assert_eq!(mesh.quads_flat().unwrap().len(), 16 * 4);
    assert!(mesh.uvs_flat().is_none());

    for p in &mesh.positions {
        assert!(p.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn flat_diagnostics_report_grid_incidence() {
    let mesh = flat(4).unwrap().mesh().unwrap();
    let diag = mesh.diagnostics(Tolerance::default()).unwrap();
    assert_eq!(diag.vertex_count, 16);
    assert_eq!(diag.triangle_count, 18);
    assert_eq!(diag.min_incidence, 1);
    assert_eq!(diag.max_incidence, 6);
    assert_eq!(diag.degenerate_triangle_count, 0);
    assert!((diag.max_face_normal_length - 0.0625).abs() < 1e-15);
    assert!(diag.is_clean());
}

#[test]
fn collapsed_grid_is_flagged() {
    let mesh = PatchMesh::from_grid(vec![[1.0, 1.0, 1.0]; 9], 1, 3).unwrap();
    let diag = mesh.diagnostics(Tolerance::default()).unwrap();
    assert_eq!(diag.degenerate_triangle_count, 8);
    assert_eq!(diag.zero_normal_vertex_count, 9);
    assert!(diag.has_warnings());
    assert!(!diag.is_clean());
}

#[test]
fn sampled_mesh_carries_uvs() {
    let surface = flat(3).unwrap();
    let sampled = sample_complex(&surface.complex, &surface.corner_set(), &UvGrid::new(3).unwrap()).unwrap();
    let mesh = PatchMesh::from_sampled(&sampled).unwrap();
    assert_eq!(mesh.uvs.as_ref().map(Vec::len), Some(9));
    assert!(mesh.has_valid_attribute_lengths());
}
