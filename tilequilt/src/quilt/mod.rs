//! Quilt orchestration.
//!
//! Ties the archive, raster and output modules together: configuration,
//! the per-archive pipeline, metadata selection and run statistics.
//!
//! # Example
//!
//! ```no_run
//! use tilequilt::quilt::{MetadataMode, QuiltConfig, QuiltOrchestrator};
//!
//! let config = QuiltConfig::new("RNC_ROOT", "RNC_ROOT")
//!     .with_archives(["01a"])
//!     .with_metadata(MetadataMode::Metric);
//! let report = QuiltOrchestrator::new(config).run()?;
//! for archive in report.failed() {
//!     eprintln!("{} failed", archive.id);
//! }
//! # Ok::<(), tilequilt::quilt::QuiltError>(())
//! ```

mod config;
mod error;
mod metadata;
mod orchestrator;
mod stats;

pub use config::{
    MetadataMode, QuiltConfig, DEFAULT_ARCHIVE_PATTERN, DEFAULT_EMPTY_TILE_SIZE,
    DEFAULT_LEGACY_MIN_ZOOM, DEFAULT_PROGRESS_INTERVAL,
};
pub use error::{QuiltError, RecordError};
pub use metadata::MetadataSource;
pub use orchestrator::QuiltOrchestrator;
pub use stats::{ArchiveReport, ArchiveStats, QuiltReport};
