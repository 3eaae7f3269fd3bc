#![forbid(unsafe_code)]

//! mosaic-tile: replicate a molecular template along up to three periodic
//! directions and repair the bonds that the template's own periodic
//! boundary cut, so the result is a single correctly connected structure.

pub mod config;
pub mod error;
pub mod replicate;
pub mod stitch;
pub mod tiler;

pub use config::{TilingSpec, DEFAULT_NEIGHBOR_WIDTH};
pub use error::{TileError, TileResult};
pub use tiler::tile;
