mod core;
mod diagnostics;
mod encoding;
mod error;
mod evaluation;
mod generators;
mod mesh;
mod metrics;
mod noise;
mod normals;
mod raster;
mod rows;
mod sampler;
mod topology;

pub use self::core::{Tolerance, Vec3};
pub use diagnostics::PatchMeshDiagnostics;
pub use encoding::{PositionalEncoding, positional_encoding};
pub use error::{GeomError, MIN_SAMPLE_RATE, SourceError};
pub use evaluation::{
    ErrorStats, NormalComparison, compare_normals, mean_distance, psnr, vertex_errors,
};
pub use generators::{
    DEFAULT_CURVED_SCALE, DEFAULT_LINEAR_SLOPE, DEFAULT_PERLIN_AMPLITUDE, DEFAULT_PERLIN_OCTAVES,
    DEFAULT_PERLIN_SEED, DEFAULT_TEXTURE_AMPLITUDE, GeneratedSurface, SurfaceKind, curved,
    extract_corners, flat, generate, generate_height_field, linear, perlin, textured,
};
pub use mesh::PatchMesh;
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use noise::{NoiseSource, PerlinNoise};
pub use normals::{
    face_normals, incidence_counts, mesh_normals, normalize_normals, normals_to_rgb,
    vertex_normals,
};
pub use raster::{ImageSource, RasterImage};
pub use rows::Rows;
pub use sampler::{
    Complex, CornerSet, GridSpacing, POINT_ENCODING_SIZE, SampledComplex, SamplingOptions, UvGrid,
    grid_coordinate, lerp, lerp_point, sample, sample_complex, sample_points,
};
pub use topology::{
    flatten_triangles, patch_offset, quad_indices, quads_per_patch, triangle_indices,
    triangles_from_flat, triangles_per_patch,
};

#[cfg(test)]
mod tests;
