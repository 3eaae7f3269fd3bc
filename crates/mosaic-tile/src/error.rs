use thiserror::Error;

use mosaic_core::CoreError;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("invalid tiling config: {0}")]
    Config(String),
    #[error("bond stitching failed: {0}")]
    Stitch(String),
    #[error("geometry error: {0}")]
    Core(#[from] CoreError),
}

pub type TileResult<T> = Result<T, TileError>;
