//! Output tile tree management.
//!
//! Tiles are written as `<root>/Z<zoom>/<row>/<col>.png`. Directories are
//! created lazily on the first visible write, and a fully transparent result
//! never replaces or removes an existing tile.

mod encode;
mod locks;
mod path;
mod tree;

pub use encode::{
    encode_png, encode_tile, validate_payload, EncodedTile, MetadataError, MetadataStatus,
    METADATA_KEYWORD,
};
pub use locks::TileLocks;
pub use path::{row_directory, tile_path};
pub use tree::{OutputTree, SaveOutcome, DEFAULT_EXTENSION};

use crate::raster::RasterError;
use std::path::PathBuf;
use thiserror::Error;

/// Output tree errors.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A regular file sits where a directory is needed
    #[error("{path} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    /// Existing tile could not be read
    #[error("Failed to read tile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing tile is not a decodable image
    #[error("Existing tile {path} is corrupt: {source}")]
    CorruptTile {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    /// PNG encoding of the pixels failed
    #[error("Failed to encode tile {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    /// Tile could not be written
    #[error("Failed to write tile {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    /// Whether the failure affects the whole output subtree rather than one
    /// tile.
    pub fn is_directory_failure(&self) -> bool {
        matches!(
            self,
            OutputError::DirectoryCreate { .. } | OutputError::NotADirectory { .. }
        )
    }
}
