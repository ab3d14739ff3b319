//! Noise collaborators for the `perlin` generator.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::error::SourceError;

/// Scalar noise field over UV coordinates.
///
/// Implementations must be deterministic for a fixed configuration.
pub trait NoiseSource {
    fn noise(&self, coord: [f64; 2]) -> Result<f64, SourceError>;
}

impl<F> NoiseSource for F
where
    F: Fn([f64; 2]) -> Result<f64, SourceError>,
{
    fn noise(&self, coord: [f64; 2]) -> Result<f64, SourceError> {
        self(coord)
    }
}

/// Seeded 2D gradient noise.
///
/// `octaves` multiplies the input frequency, so `octaves = 16` puts sixteen lattice cells
/// across the unit patch. Output lies roughly in `[-1, 1]` and is zero on lattice points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerlinNoise {
    octaves: u32,
    seed: u64,
    perm: Vec<u8>,
}

const GRADIENTS: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
];

impl PerlinNoise {
    #[must_use]
    pub fn new(octaves: u32, seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        table.shuffle(&mut rng);
        let mut perm = Vec::with_capacity(512);
        perm.extend_from_slice(&table);
        perm.extend_from_slice(&table);
        Self { octaves, seed, perm }
    }

    #[must_use]
    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn gradient(&self, xi: usize, yi: usize) -> [f64; 2] {
        let h = self.perm[self.perm[xi] as usize + yi];
        GRADIENTS[(h & 7) as usize]
    }

    fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xf = x - x0;
        let yf = y - y0;
        // Lattice wraps every 256 cells.
        let xi = (x0.rem_euclid(256.0)) as usize;
        let yi = (y0.rem_euclid(256.0)) as usize;
        let xi1 = (xi + 1) & 255;
        let yi1 = (yi + 1) & 255;

        let dot = |g: [f64; 2], dx: f64, dy: f64| g[0] * dx + g[1] * dy;
        let n00 = dot(self.gradient(xi, yi), xf, yf);
        let n10 = dot(self.gradient(xi1, yi), xf - 1.0, yf);
        let n01 = dot(self.gradient(xi, yi1), xf, yf - 1.0);
        let n11 = dot(self.gradient(xi1, yi1), xf - 1.0, yf - 1.0);

        let u = fade(xf);
        let v = fade(yf);
        let nx0 = n00 + u * (n10 - n00);
        let nx1 = n01 + u * (n11 - n01);
        // Max magnitude of 2D gradient noise is sqrt(2)/2.
        (nx0 + v * (nx1 - nx0)) * std::f64::consts::SQRT_2
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

impl NoiseSource for PerlinNoise {
    fn noise(&self, coord: [f64; 2]) -> Result<f64, SourceError> {
        if !coord[0].is_finite() || !coord[1].is_finite() {
            return Err(format!("noise coordinate {coord:?} is not finite").into());
        }
        let scale = f64::from(self.octaves);
        Ok(self.sample(coord[0] * scale, coord[1] * scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = PerlinNoise::new(16, 1);
        let b = PerlinNoise::new(16, 1);
        for k in 0..32 {
            let p = [k as f64 * 0.031, k as f64 * 0.017];
            assert_eq!(a.noise(p).unwrap(), b.noise(p).unwrap());
        }
    }

    #[test]
    fn zero_on_lattice_points() {
        let noise = PerlinNoise::new(4, 3);
        assert_eq!(noise.noise([0.25, 0.5]).unwrap(), 0.0);
        assert_eq!(noise.noise([0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn bounded_and_not_constant() {
        let noise = PerlinNoise::new(16, 1);
        let values: Vec<f64> = (0..64)
            .map(|k| noise.noise([k as f64 / 67.0, (k * 7 % 64) as f64 / 71.0]).unwrap())
            .collect();
        assert!(values.iter().all(|v| v.abs() <= 1.0 + 1e-9));
        assert!(values.iter().any(|v| v.abs() > 1e-3));
    }

    #[test]
    fn non_finite_coordinate_is_reported() {
        let noise = PerlinNoise::new(16, 1);
        assert!(noise.noise([f64::NAN, 0.0]).is_err());
    }
}
