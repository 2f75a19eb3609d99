//! Pixel operations for quilting overlapping chart panels.
//!
//! Both operations work on decoded 8-bit RGBA rasters ([`image::RgbaImage`])
//! of whatever size the archive's tiling scheme produced:
//!
//! - [`composite_over`]: source-over blend of an incoming tile onto the tile
//!   already in the output tree
//! - [`mask_color_keys`]: turn background-coloured pixels transparent so
//!   panels underneath show through

mod composite;
mod mask;

pub use composite::{composite_over, decode_tile};
pub use mask::{mask_color_keys, ColorKey, ColorKeySet, DEFAULT_COLOR_KEYS};

use thiserror::Error;

/// Raster processing errors.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Tile bytes could not be decoded as an image
    #[error("Failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),

    /// Existing and incoming tiles have different sizes
    #[error(
        "Tile dimensions differ: existing {}x{}, incoming {}x{}",
        .existing.0, .existing.1, .incoming.0, .incoming.1
    )]
    DimensionMismatch {
        existing: (u32, u32),
        incoming: (u32, u32),
    },
}
