/// Error reported by a noise or image collaborator.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Smallest sample rate that still yields one grid cell per patch.
pub const MIN_SAMPLE_RATE: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// Failure reported by a noise or image source, passed through unchanged.
    #[error("{0}")]
    Collaborator(SourceError),
}

impl GeomError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }
}

pub(crate) fn check_sample_rate(sample_rate: usize) -> Result<(), GeomError> {
    if sample_rate < MIN_SAMPLE_RATE {
        return Err(GeomError::shape(format!(
            "sample rate must be at least {MIN_SAMPLE_RATE}, got {sample_rate}"
        )));
    }
    Ok(())
}

/// Converts a flat vertex index into the `u32` index buffer type.
pub(crate) fn index_u32(index: usize) -> Result<u32, GeomError> {
    u32::try_from(index)
        .map_err(|_| GeomError::shape(format!("vertex index {index} exceeds the u32 index range")))
}
