use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid geometry: {0}")]
    Invalid(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
