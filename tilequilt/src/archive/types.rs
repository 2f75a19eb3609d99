//! Archive record and error types.

use crate::coord::{CoordError, TileCoord};
use std::path::PathBuf;
use thiserror::Error;

/// One row of an archive's tile table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRecord {
    /// Tile coordinate in archive-native row orientation
    pub coord: TileCoord,
    /// Encoded image bytes exactly as stored
    pub data: Vec<u8>,
}

/// Archive access errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file could not be opened as an SQLite database
    #[error("Archive {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The database has no tile table
    #[error("Archive {path} has no '{table}' table")]
    MissingTable { path: PathBuf, table: String },

    /// Query failed while stepping through the archive
    #[error("Archive query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A single row carried unusable values; only that row is affected
    #[error("Invalid tile record (zoom={zoom}, col={col}, row={row}): {reason}")]
    InvalidRecord {
        zoom: i64,
        col: i64,
        row: i64,
        reason: String,
    },
}

impl ArchiveError {
    /// Whether this error only affects one record and traversal can go on.
    pub fn is_per_record(&self) -> bool {
        matches!(self, ArchiveError::InvalidRecord { .. })
    }

    pub(crate) fn invalid_coord(zoom: i64, col: i64, row: i64, err: CoordError) -> Self {
        ArchiveError::InvalidRecord {
            zoom,
            col,
            row,
            reason: err.to_string(),
        }
    }
}
