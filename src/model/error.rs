use crate::geom::GeomError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Geom(#[from] GeomError),
}
