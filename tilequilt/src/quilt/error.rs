//! Quilt error types.

use crate::archive::ArchiveError;
use crate::coord::CoordError;
use crate::output::OutputError;
use crate::raster::RasterError;
use thiserror::Error;

/// Errors that abort a whole archive.
#[derive(Debug, Error)]
pub enum QuiltError {
    /// Archive could not be opened or read
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Output subtree is unusable
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Errors that only cost one record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_transparent_display() {
        let err = QuiltError::from(ArchiveError::MissingTable {
            path: PathBuf::from("a.mbtiles"),
            table: "tiles".to_string(),
        });
        assert_eq!(err.to_string(), "Archive a.mbtiles has no 'tiles' table");
    }

    #[test]
    fn test_record_error_from_raster() {
        let err: RecordError = RasterError::DimensionMismatch {
            existing: (1, 1),
            incoming: (2, 2),
        }
        .into();
        assert!(matches!(
            err,
            RecordError::Raster(RasterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_error_trait() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<QuiltError>();
        assert_error::<RecordError>();
    }
}
