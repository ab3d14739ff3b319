//! Row-major numeric buffers.
//!
//! Features, UV coordinates and encodings cross every API boundary as `Rows`: a contiguous
//! `len * dim` buffer of `f64`, so callers can hand them to any array library without
//! conversion.

use serde::Serialize;

use super::error::GeomError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rows {
    data: Vec<f64>,
    len: usize,
    dim: usize,
}

impl Rows {
    /// Builds rows from a flat buffer with shape `(data.len() / dim, dim)`.
    pub fn from_flat(data: Vec<f64>, dim: usize) -> Result<Self, GeomError> {
        if dim == 0 {
            return Err(GeomError::shape("row dimension must be > 0"));
        }
        if data.len() % dim != 0 {
            return Err(GeomError::shape(format!(
                "buffer length {} is not divisible by row dimension {dim}",
                data.len()
            )));
        }
        let len = data.len() / dim;
        Ok(Self { data, len, dim })
    }

    /// Copies per-sample rows into contiguous storage.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, GeomError> {
        let Some(first) = rows.first() else {
            return Err(GeomError::shape("rows must not be empty"));
        };
        let dim = first.len();
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(GeomError::shape(format!(
                    "row {i} has len {}, expected {dim}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, len: rows.len(), dim })
    }

    /// Zero-filled rows. A zero `dim` is allowed and yields `len` empty rows.
    #[must_use]
    pub fn zeros(len: usize, dim: usize) -> Self {
        Self { data: vec![0.0; len * dim], len, dim }
    }

    #[must_use]
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self {
            data: points.iter().flatten().copied().collect(),
            len: points.len(),
            dim: 3,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns row `idx`. Panics if `idx >= len`.
    #[inline]
    #[must_use]
    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.dim;
        &self.data[start..start + self.dim]
    }

    #[inline]
    pub fn row_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.dim;
        &mut self.data[start..start + self.dim]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.len).map(move |i| self.row(i))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Interprets three-wide rows as points.
    pub fn to_points(&self) -> Result<Vec<[f64; 3]>, GeomError> {
        if self.dim != 3 {
            return Err(GeomError::shape(format!(
                "expected rows of dimension 3, got {}",
                self.dim
            )));
        }
        Ok(self.iter().map(|r| [r[0], r[1], r[2]]).collect())
    }

    /// Concatenates blocks column-wise: row `i` of the result is row `i` of every block in order.
    pub fn concat_columns(blocks: &[&Rows]) -> Result<Self, GeomError> {
        let Some(first) = blocks.first() else {
            return Err(GeomError::shape("cannot concatenate zero blocks"));
        };
        let len = first.len();
        if let Some(bad) = blocks.iter().find(|b| b.len() != len) {
            return Err(GeomError::shape(format!(
                "row count mismatch: {} vs {len}",
                bad.len()
            )));
        }
        let dim: usize = blocks.iter().map(|b| b.dim()).sum();
        let mut data = Vec::with_capacity(len * dim);
        for i in 0..len {
            for block in blocks {
                data.extend_from_slice(block.row(i));
            }
        }
        Ok(Self { data, len, dim })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_rejects_ragged_buffer() {
        assert!(matches!(
            Rows::from_flat(vec![1.0, 2.0, 3.0], 2),
            Err(GeomError::InvalidShape(_))
        ));
        assert!(Rows::from_flat(vec![], 0).is_err());
    }

    #[test]
    fn from_rows_rejects_mismatched_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(Rows::from_rows(&rows).is_err());
    }

    #[test]
    fn concat_columns_interleaves_rows() {
        let a = Rows::from_flat(vec![1.0, 2.0], 1).unwrap();
        let b = Rows::from_flat(vec![10.0, 11.0, 20.0, 21.0], 2).unwrap();
        let c = Rows::concat_columns(&[&a, &b]).unwrap();
        assert_eq!(c.dim(), 3);
        assert_eq!(c.row(0), &[1.0, 10.0, 11.0]);
        assert_eq!(c.row(1), &[2.0, 20.0, 21.0]);
    }

    #[test]
    fn zero_width_rows_keep_their_length() {
        let rows = Rows::zeros(4, 0);
        assert_eq!(rows.len(), 4);
        assert!(rows.row(3).is_empty());
    }
}
