use crate::geom::{
    Complex, CornerSet, GridSpacing, PatchMesh, Rows, SamplingOptions, UvGrid, lerp_point, sample,
    sample_complex, sample_points,
};

const CORNERS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 2.0],
];

#[test]
fn lerp_recovers_corners_in_crossed_order() {
    assert_eq!(lerp_point(&CORNERS, 0.0, 0.0), CORNERS[2]);
    assert_eq!(lerp_point(&CORNERS, 1.0, 0.0), CORNERS[3]);
    assert_eq!(lerp_point(&CORNERS, 0.0, 1.0), CORNERS[1]);
    assert_eq!(lerp_point(&CORNERS, 1.0, 1.0), CORNERS[0]);
}

#[test]
fn lerp_center_is_corner_mean_and_outside_extrapolates() {
    assert_eq!(lerp_point(&CORNERS, 0.5, 0.5), [0.5, 0.5, 0.5]);
    // u = 2 along the C2 -> C3 edge overshoots past C3.
    assert_eq!(lerp_point(&CORNERS, 2.0, 0.0), [-1.0, 1.0, 4.0]);
}

#[test]
fn grid_index_is_row_major_in_u() {
    let grid = UvGrid::new(4).unwrap();
    let k = 2 * 4 + 1;
    assert_eq!((grid.u()[k], grid.v()[k]), (0.5, 0.25));
    let rows = grid.to_rows();
    assert_eq!(rows.row(k), &[0.5, 0.25]);
}

#[test]
fn closed_grid_reaches_the_far_edge() {
    let grid = SamplingOptions::new(3).spacing(GridSpacing::Closed).grid().unwrap();
    assert_eq!(grid.u()[8], 1.0);
    assert_eq!(grid.v()[8], 1.0);
    assert_eq!(grid.u()[3], 0.5);
}

#[test]
fn sample_rate_below_two_is_rejected() {
    assert!(UvGrid::new(1).is_err());
    assert!(UvGrid::new(0).is_err());
}

#[test]
fn sample_matches_lerp_point_for_any_width() {
    let grid = UvGrid::new(3).unwrap();
    let corners = Rows::from_points(&CORNERS);
    let sampled = sample(&corners, &grid).unwrap();
    let points = sample_points(&CORNERS, &grid).unwrap();
    for (k, p) in points.iter().enumerate() {
        assert_eq!(sampled.row(k), p.as_slice());
    }
    assert!(sample(&Rows::zeros(3, 2), &grid).is_err());
}

#[test]
fn complex_samples_patch_after_patch_with_features() {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [2.0, 0.0, 0.0],
        [2.0, 0.0, 1.0],
    ];
    let features = Rows::from_flat((0..6).map(f64::from).collect(), 1).unwrap();
    let corners = CornerSet::new(positions).with_features(features).unwrap();
    let complex = Complex::new(vec![[0, 1, 2, 3], [1, 4, 5, 2]]).unwrap();
    let grid = UvGrid::with_spacing(2, GridSpacing::Closed).unwrap();

    let sampled = sample_complex(&complex, &corners, &grid).unwrap();
    assert_eq!(sampled.len(), 8);
    assert_eq!(sampled.patch_count, 2);

    let features = sampled.features.as_ref().unwrap();
    // (u, v) = (0, 0) picks corner slot 2 of each patch.
    assert_eq!(features.row(0), &[2.0]);
    assert_eq!(features.row(4), &[5.0]);
    assert_eq!(sampled.points[4], [2.0, 0.0, 1.0]);
    assert_eq!(sampled.uv.row(7), &[1.0, 1.0]);
}

#[test]
fn complex_rejects_missing_corners() {
    let complex = Complex::new(vec![[0, 1, 2, 7]]).unwrap();
    let corners = CornerSet::new(CORNERS.to_vec());
    let grid = UvGrid::new(2).unwrap();
    assert!(sample_complex(&complex, &corners, &grid).is_err());
    assert!(Complex::new(Vec::new()).is_err());
}

#[test]
fn random_features_are_seeded() {
    let a = CornerSet::new(CORNERS.to_vec()).with_random_features(20, 7).unwrap();
    let b = CornerSet::new(CORNERS.to_vec()).with_random_features(20, 7).unwrap();
    let c = CornerSet::new(CORNERS.to_vec()).with_random_features(20, 8).unwrap();
    assert_eq!(a.features(), b.features());
    assert_ne!(a.features(), c.features());
    assert_eq!(a.features().map(Rows::dim), Some(20));
    assert!(a.features().unwrap().as_slice().iter().all(|x| x.is_finite()));
}

#[test]
fn coordinate_grid_samples_but_does_not_mesh() {
    let grid = UvGrid::from_coordinates(vec![0.5, 1.0, 0.0], vec![0.5, 0.0, 0.0]).unwrap();
    assert_eq!(grid.sample_rate(), 0);
    assert_eq!(grid.len(), 3);

    let points = sample_points(&CORNERS, &grid).unwrap();
    assert_eq!(points[1], CORNERS[3]);
    assert_eq!(points[2], CORNERS[2]);

    let complex = Complex::new(vec![[0, 1, 2, 3]]).unwrap();
    let corners = CornerSet::new(CORNERS.to_vec());
    let sampled = sample_complex(&complex, &corners, &grid).unwrap();
    assert_eq!(sampled.sample_rate, 0);
    assert!(PatchMesh::from_sampled(&sampled).is_err());

    assert!(UvGrid::from_coordinates(vec![0.0], Vec::new()).is_err());
}
