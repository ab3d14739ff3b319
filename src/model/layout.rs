use serde::Serialize;

use crate::geom::PositionalEncoding;

use super::ModelInput;
use super::error::ModelError;

/// Per-sample quantity a model can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Lerped corner features.
    Features,
    /// Lerped base points.
    Points,
    /// `(u, v)` of the sample.
    Uv,
}

impl InputSource {
    #[must_use]
    pub const fn dim(self, feature_dim: usize) -> usize {
        match self {
            Self::Features => feature_dim,
            Self::Points => 3,
            Self::Uv => 2,
        }
    }

    fn row<'a>(self, input: &'a ModelInput<'_>, idx: usize) -> Result<&'a [f64], ModelError> {
        match self {
            Self::Features => Ok(input.features.row(idx)),
            Self::Points => Ok(&input.points[idx]),
            Self::Uv => input
                .uv
                .map(|uv| uv.row(idx))
                .ok_or_else(|| ModelError::InvalidShape("model needs uv coordinates".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputBlock {
    Plain(InputSource),
    /// Sources encoded jointly: raw values of all sources, then per level each source's sin/cos.
    Encoded { sources: Vec<InputSource>, encoding: PositionalEncoding },
}

impl InputBlock {
    #[must_use]
    pub fn encoded(sources: &[InputSource], levels: usize) -> Self {
        Self::Encoded { sources: sources.to_vec(), encoding: PositionalEncoding::new(levels) }
    }

    #[must_use]
    pub fn dim(&self, feature_dim: usize) -> usize {
        match self {
            Self::Plain(src) => src.dim(feature_dim),
            Self::Encoded { sources, encoding } => {
                encoding.output_dim(sources.iter().map(|s| s.dim(feature_dim)).sum())
            }
        }
    }

    fn sources(&self) -> &[InputSource] {
        match self {
            Self::Plain(src) => std::slice::from_ref(src),
            Self::Encoded { sources, .. } => sources,
        }
    }
}

/// Ordered concatenation of input blocks forming one network input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputLayout {
    blocks: Vec<InputBlock>,
}

impl InputLayout {
    pub fn new(blocks: Vec<InputBlock>) -> Result<Self, ModelError> {
        if blocks.is_empty() {
            return Err(ModelError::InvalidConfig("input layout has no blocks".into()));
        }
        if blocks.iter().any(|b| b.sources().is_empty()) {
            return Err(ModelError::InvalidConfig("encoded block has no sources".into()));
        }
        Ok(Self { blocks })
    }

    #[must_use]
    pub fn blocks(&self) -> &[InputBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn input_dim(&self, feature_dim: usize) -> usize {
        self.blocks.iter().map(|b| b.dim(feature_dim)).sum()
    }

    #[must_use]
    pub fn needs_uv(&self) -> bool {
        self.blocks.iter().any(|b| b.sources().contains(&InputSource::Uv))
    }

    /// Writes the network input of sample `idx` into `out`.
    pub fn write_row(
        &self,
        input: &ModelInput<'_>,
        idx: usize,
        out: &mut [f64],
    ) -> Result<(), ModelError> {
        let feature_dim = input.features.dim();
        let mut cursor = 0;
        let mut rows: Vec<&[f64]> = Vec::with_capacity(3);
        for block in &self.blocks {
            let width = block.dim(feature_dim);
            let slot = &mut out[cursor..cursor + width];
            match block {
                InputBlock::Plain(src) => slot.copy_from_slice(src.row(input, idx)?),
                InputBlock::Encoded { sources, encoding } => {
                    rows.clear();
                    for src in sources {
                        rows.push(src.row(input, idx)?);
                    }
                    encoding.encode_row_into(&rows, slot);
                }
            }
            cursor += width;
        }
        debug_assert_eq!(cursor, out.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rows;

    #[test]
    fn dims_follow_block_order() {
        let layout = InputLayout::new(vec![
            InputBlock::Plain(InputSource::Features),
            InputBlock::encoded(&[InputSource::Points, InputSource::Uv], 8),
        ])
        .unwrap();
        assert_eq!(layout.input_dim(20), 20 + 5 * 17);
        assert!(layout.needs_uv());
    }

    #[test]
    fn write_row_concatenates_blocks() {
        let points = [[1.0, 2.0, 3.0]];
        let features = Rows::from_flat(vec![7.0], 1).unwrap();
        let input = ModelInput::new(&points, &features, None).unwrap();
        let layout = InputLayout::new(vec![
            InputBlock::Plain(InputSource::Features),
            InputBlock::encoded(&[InputSource::Points], 1),
        ])
        .unwrap();
        let mut out = vec![0.0; layout.input_dim(1)];
        layout.write_row(&input, 0, &mut out).unwrap();
        assert_eq!(&out[..4], &[7.0, 1.0, 2.0, 3.0]);
        assert_eq!(out[4], 1.0_f64.sin());
        assert_eq!(out[7], 1.0_f64.cos());
    }

    #[test]
    fn missing_uv_is_an_error() {
        let points = [[0.0; 3]];
        let features = Rows::zeros(1, 2);
        let input = ModelInput::new(&points, &features, None).unwrap();
        let layout = InputLayout::new(vec![InputBlock::Plain(InputSource::Uv)]).unwrap();
        let mut out = [0.0; 2];
        assert!(matches!(
            layout.write_row(&input, 0, &mut out),
            Err(ModelError::InvalidShape(_))
        ));
    }
}
