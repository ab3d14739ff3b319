//! Multi-frequency sinusoidal coordinate encoding.
//!
//! For `L` levels a `k`-wide row `x` expands to
//! `[x, sin(2^0 x), cos(2^0 x), sin(2^1 x), cos(2^1 x), ...]`, where every `sin`/`cos` term is a
//! `k`-wide block. Frequencies are exact powers of two with no `π` factor. Leaving out the raw
//! term gives `k * 2L` columns instead of `k * (2L + 1)`.
//!
//! The joint form encodes several sources side by side: the raw rows of every source come first,
//! then per level the `sin`/`cos` pair of each source in order.

use serde::{Deserialize, Serialize};

use super::error::GeomError;
use super::rows::Rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalEncoding {
    pub levels: usize,
    pub include_raw: bool,
}

impl PositionalEncoding {
    #[must_use]
    pub const fn new(levels: usize) -> Self {
        Self { levels, include_raw: true }
    }

    #[must_use]
    pub const fn without_raw(mut self) -> Self {
        self.include_raw = false;
        self
    }

    /// Trailing width produced for `k`-wide input rows.
    #[must_use]
    pub const fn output_dim(self, k: usize) -> usize {
        let bands = 2 * self.levels;
        if self.include_raw { k * (bands + 1) } else { k * bands }
    }

    pub fn encode(self, x: &Rows) -> Rows {
        let mut out = Rows::zeros(x.len(), self.output_dim(x.dim()));
        for i in 0..x.len() {
            self.encode_row_into(&[x.row(i)], out.row_mut(i));
        }
        out
    }

    /// Encodes several sources with matching row counts into one interleaved block.
    pub fn encode_joint(self, sources: &[&Rows]) -> Result<Rows, GeomError> {
        let Some(first) = sources.first() else {
            return Err(GeomError::shape("joint encoding needs at least one source"));
        };
        let len = first.len();
        if let Some(bad) = sources.iter().find(|s| s.len() != len) {
            return Err(GeomError::shape(format!(
                "joint encoding sources disagree on row count: {} vs {len}",
                bad.len()
            )));
        }

        let width: usize = sources.iter().map(|s| s.dim()).sum();
        let mut out = Rows::zeros(len, self.output_dim(width));
        let mut row_sources: Vec<&[f64]> = Vec::with_capacity(sources.len());
        for i in 0..len {
            row_sources.clear();
            row_sources.extend(sources.iter().map(|s| s.row(i)));
            self.encode_row_into(&row_sources, out.row_mut(i));
        }
        Ok(out)
    }

    /// Writes the encoding of one sample into `out`.
    ///
    /// `out.len()` must equal `output_dim` of the summed source widths.
    pub fn encode_row_into(self, sources: &[&[f64]], out: &mut [f64]) {
        let mut cursor = 0;
        if self.include_raw {
            for src in sources {
                out[cursor..cursor + src.len()].copy_from_slice(src);
                cursor += src.len();
            }
        }
        let mut freq = 1.0_f64;
        for _ in 0..self.levels {
            for src in sources {
                for (slot, x) in out[cursor..cursor + src.len()].iter_mut().zip(src.iter()) {
                    *slot = (freq * x).sin();
                }
                cursor += src.len();
                for (slot, x) in out[cursor..cursor + src.len()].iter_mut().zip(src.iter()) {
                    *slot = (freq * x).cos();
                }
                cursor += src.len();
            }
            freq *= 2.0;
        }
        debug_assert_eq!(cursor, out.len());
    }
}

/// `encode(x, L)` with the raw term included.
#[must_use]
pub fn positional_encoding(x: &Rows, levels: usize) -> Rows {
    PositionalEncoding::new(levels).encode(x)
}
