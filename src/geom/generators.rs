//! Reference surfaces used as fitting targets.
//!
//! Every generator produces a single unit patch (complex `[[0, 1, 2, 3]]`) sampled on the
//! half-open grid: `points[i * R + j] = (u, h(u, v), v)` with `u = i / R`, `v = j / R`. The
//! variants only differ in the height function `h`.
//!
//! ```ignore
//! use patchfit_engine::geom::{SurfaceKind, generate};
//!
//! let target = generate(SurfaceKind::perlin(), 64, None)?;
//! let mesh = target.mesh()?;
//! ```

use serde::{Deserialize, Serialize};

use super::error::{GeomError, SourceError, check_sample_rate};
use super::mesh::PatchMesh;
use super::noise::{NoiseSource, PerlinNoise};
use super::raster::ImageSource;
use super::sampler::{Complex, CornerSet};

pub const DEFAULT_LINEAR_SLOPE: f64 = 0.25;
pub const DEFAULT_CURVED_SCALE: f64 = 0.25;
pub const DEFAULT_PERLIN_AMPLITUDE: f64 = 0.25;
pub const DEFAULT_PERLIN_OCTAVES: u32 = 16;
pub const DEFAULT_PERLIN_SEED: u64 = 1;
pub const DEFAULT_TEXTURE_AMPLITUDE: f64 = 0.1;

/// Generator catalogue with per-variant parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceKind {
    Flat,
    /// `h = slope * (u + v)`
    Linear { slope: f64 },
    /// `h = scale * (u + v)²`
    Curved { scale: f64 },
    /// `h = amplitude * noise([u, v])`
    ///
    /// The noise is zero on its lattice, which sits at multiples of `1 / octaves`. When the
    /// sample rate divides `octaves` every grid sample lands on the lattice and the surface is
    /// flat; the defaults (16 octaves at rate 16) do exactly that. See
    /// [`SurfaceKind::samples_on_lattice`].
    Perlin { amplitude: f64, octaves: u32, seed: u64 },
    /// `h = amplitude * red(pixel(u * width, v * height)) / 255`
    Textured { amplitude: f64 },
}

impl SurfaceKind {
    pub const NAMES: &'static [&'static str] = &["flat", "linear", "curved", "perlin", "textured"];

    #[must_use]
    pub const fn flat() -> Self {
        Self::Flat
    }

    #[must_use]
    pub const fn linear() -> Self {
        Self::Linear { slope: DEFAULT_LINEAR_SLOPE }
    }

    #[must_use]
    pub const fn curved() -> Self {
        Self::Curved { scale: DEFAULT_CURVED_SCALE }
    }

    #[must_use]
    pub const fn perlin() -> Self {
        Self::Perlin {
            amplitude: DEFAULT_PERLIN_AMPLITUDE,
            octaves: DEFAULT_PERLIN_OCTAVES,
            seed: DEFAULT_PERLIN_SEED,
        }
    }

    #[must_use]
    pub const fn textured() -> Self {
        Self::Textured { amplitude: DEFAULT_TEXTURE_AMPLITUDE }
    }

    /// Default-parameter variant for a catalogue name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flat" => Some(Self::flat()),
            "linear" => Some(Self::linear()),
            "curved" => Some(Self::curved()),
            "perlin" => Some(Self::perlin()),
            "textured" => Some(Self::textured()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Linear { .. } => "linear",
            Self::Curved { .. } => "curved",
            Self::Perlin { .. } => "perlin",
            Self::Textured { .. } => "textured",
        }
    }

    /// `true` when every sample at `sample_rate` falls on a noise lattice point, so the
    /// generated heights are all zero. Only perlin surfaces can degenerate this way.
    #[must_use]
    pub const fn samples_on_lattice(self, sample_rate: usize) -> bool {
        match self {
            Self::Perlin { octaves, .. } => sample_rate > 0 && (octaves as usize) % sample_rate == 0,
            _ => false,
        }
    }

    /// `true` for variants that read an image collaborator.
    #[must_use]
    pub const fn needs_image(self) -> bool {
        matches!(self, Self::Textured { .. })
    }
}

/// Ground-truth patch: topology, sampled points and the four extracted corners.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSurface {
    pub complex: Complex,
    pub points: Vec<[f64; 3]>,
    pub corners: [[f64; 3]; 4],
    pub sample_rate: usize,
}

impl GeneratedSurface {
    /// Corner set over the extracted corners, without features.
    #[must_use]
    pub fn corner_set(&self) -> CornerSet {
        CornerSet::new(self.corners.to_vec())
    }

    /// Grid mesh of the target points with raw vertex normals.
    pub fn mesh(&self) -> Result<PatchMesh, GeomError> {
        let mut mesh =
            PatchMesh::from_grid(self.points.clone(), self.complex.patch_count(), self.sample_rate)?;
        mesh.compute_normals()?;
        Ok(mesh)
    }
}

/// `points[0]`, `points[R-1]`, `points[R*R-1]`, `points[R*R-R]`.
pub fn extract_corners(points: &[[f64; 3]], sample_rate: usize) -> Result<[[f64; 3]; 4], GeomError> {
    check_sample_rate(sample_rate)?;
    let n = sample_rate * sample_rate;
    if points.len() != n {
        return Err(GeomError::shape(format!(
            "{} points for a {sample_rate}x{sample_rate} grid",
            points.len()
        )));
    }
    Ok([points[0], points[sample_rate - 1], points[n - 1], points[n - sample_rate]])
}

/// Shared builder: samples `(u, height(u, v), v)` over the half-open grid.
pub fn generate_height_field(
    sample_rate: usize,
    mut height: impl FnMut(f64, f64) -> Result<f64, SourceError>,
) -> Result<GeneratedSurface, GeomError> {
    check_sample_rate(sample_rate)?;
    let rate = sample_rate as f64;
    let mut points = Vec::with_capacity(sample_rate * sample_rate);
    for i in 0..sample_rate {
        for j in 0..sample_rate {
            let (u, v) = (i as f64 / rate, j as f64 / rate);
            let h = height(u, v).map_err(GeomError::Collaborator)?;
            points.push([u, h, v]);
        }
    }
    let corners = extract_corners(&points, sample_rate)?;
    Ok(GeneratedSurface { complex: Complex::single_patch(), points, corners, sample_rate })
}

pub fn flat(sample_rate: usize) -> Result<GeneratedSurface, GeomError> {
    generate_height_field(sample_rate, |_, _| Ok(0.0))
}

pub fn linear(sample_rate: usize, slope: f64) -> Result<GeneratedSurface, GeomError> {
    generate_height_field(sample_rate, |u, v| Ok(slope * (u + v)))
}

pub fn curved(sample_rate: usize, scale: f64) -> Result<GeneratedSurface, GeomError> {
    generate_height_field(sample_rate, |u, v| Ok(scale * (u + v) * (u + v)))
}

pub fn perlin(
    sample_rate: usize,
    noise: &impl NoiseSource,
    amplitude: f64,
) -> Result<GeneratedSurface, GeomError> {
    generate_height_field(sample_rate, |u, v| Ok(amplitude * noise.noise([u, v])?))
}

/// Reads the red channel at pixel `(⌊u·width⌋, ⌊v·height⌋)`, clamped to the raster.
pub fn textured<I: ImageSource + ?Sized>(
    sample_rate: usize,
    image: &I,
    amplitude: f64,
) -> Result<GeneratedSurface, GeomError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(GeomError::Collaborator(
            format!("image source is empty ({width}x{height})").into(),
        ));
    }
    generate_height_field(sample_rate, |u, v| {
        let x = ((u * width as f64) as usize).min(width - 1);
        let y = ((v * height as f64) as usize).min(height - 1);
        let red = image.pixel(x, y)?[0];
        Ok(amplitude * f64::from(red) / 255.0)
    })
}

/// Builds any catalogue surface. `image` is required for [`SurfaceKind::Textured`].
pub fn generate(
    kind: SurfaceKind,
    sample_rate: usize,
    image: Option<&dyn ImageSource>,
) -> Result<GeneratedSurface, GeomError> {
    if kind.samples_on_lattice(sample_rate) {
        log::warn!(
            "{} surface at rate {sample_rate} samples only noise lattice points; heights will be flat",
            kind.name()
        );
    }
    let surface = match kind {
        SurfaceKind::Flat => flat(sample_rate),
        SurfaceKind::Linear { slope } => linear(sample_rate, slope),
        SurfaceKind::Curved { scale } => curved(sample_rate, scale),
        SurfaceKind::Perlin { amplitude, octaves, seed } => {
            perlin(sample_rate, &PerlinNoise::new(octaves, seed), amplitude)
        }
        SurfaceKind::Textured { amplitude } => {
            let image = image.ok_or_else(|| {
                GeomError::Collaborator("textured surface requires an image source".into())
            })?;
            textured(sample_rate, image, amplitude)
        }
    }?;
    log::debug!(
        "generated {} surface: {} points at rate {sample_rate}",
        kind.name(),
        surface.points.len()
    );
    Ok(surface)
}
