//! Coordinate type definitions

use thiserror::Error;

/// Highest zoom level whose row range still fits in a `u32`.
pub const MAX_ZOOM: u8 = 31;

/// Tile coordinate as stored in a source archive.
///
/// The row axis follows whatever convention the archive uses. Convert to an
/// [`OutputCoord`] with [`TileCoord::to_output`] before touching the output
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0-31)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Y coordinate in archive-native orientation
    pub row: u32,
}

/// Tile coordinate in the output tree (TMS orientation when flipping is on).
///
/// Only [`TileCoord::to_output`] produces these, so a row can never be
/// flipped twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputCoord {
    pub zoom: u8,
    pub col: u32,
    pub row: u32,
}

/// Errors raised when a coordinate is outside the tile pyramid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Zoom level is outside 0..=MAX_ZOOM
    #[error("Invalid zoom level: {0} (must be between 0 and {max})", max = MAX_ZOOM)]
    InvalidZoom(i64),

    /// Column or row is negative or not below 2^zoom
    #[error("Tile index {value} out of range for zoom {zoom} (must be below {limit})")]
    OutOfRange { zoom: u8, value: i64, limit: u64 },
}
