//! Image collaborators for the `textured` generator.
//!
//! The crate does not decode image files; callers hand over decoded pixels as a
//! [`RasterImage`] or implement [`ImageSource`] over their own decoder.

use super::error::SourceError;

/// Fixed-size raster addressed by integer pixel coordinates.
pub trait ImageSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// RGBA of pixel `(x, y)`; `x` runs along the width.
    fn pixel(&self, x: usize, y: usize) -> Result<[u8; 4], SourceError>;
}

/// In-memory RGBA8 raster, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgba8(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self, SourceError> {
        if width == 0 || height == 0 {
            return Err(format!("raster must not be empty ({width}x{height})").into());
        }
        if rgba.len() != width * height * 4 {
            return Err(format!(
                "raster {width}x{height} needs {} RGBA bytes, got {}",
                width * height * 4,
                rgba.len()
            )
            .into());
        }
        Ok(Self { width, height, rgba })
    }

    /// Single-channel raster; the value is replicated to RGB with opaque alpha.
    pub fn from_luma8(width: usize, height: usize, luma: &[u8]) -> Result<Self, SourceError> {
        let rgba = luma.iter().flat_map(|&l| [l, l, l, 255]).collect();
        Self::from_rgba8(width, height, rgba)
    }

    /// Raster filled by `f(x, y)`, useful for procedural test textures.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; 4],
    ) -> Result<Self, SourceError> {
        let mut rgba = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba8(width, height, rgba)
    }
}

impl ImageSource for RasterImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, x: usize, y: usize) -> Result<[u8; 4], SourceError> {
        if x >= self.width || y >= self.height {
            return Err(format!(
                "pixel ({x}, {y}) outside {}x{} raster",
                self.width, self.height
            )
            .into());
        }
        let at = (y * self.width + x) * 4;
        Ok([self.rgba[at], self.rgba[at + 1], self.rgba[at + 2], self.rgba[at + 3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_buffer_size() {
        assert!(RasterImage::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(RasterImage::from_rgba8(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn pixel_is_row_major() {
        let img = RasterImage::from_fn(3, 2, |x, y| [(x + 10 * y) as u8, 0, 0, 255]).unwrap();
        assert_eq!(img.pixel(2, 1).unwrap()[0], 12);
        assert!(img.pixel(3, 0).is_err());
    }

    #[test]
    fn luma_replicates_channels() {
        let img = RasterImage::from_luma8(1, 1, &[77]).unwrap();
        assert_eq!(img.pixel(0, 0).unwrap(), [77, 77, 77, 255]);
    }
}
