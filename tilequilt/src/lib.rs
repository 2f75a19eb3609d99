//! tilequilt - quilt MBTiles chart panels into a TMS tile tree
//!
//! Reads `(zoom, column, row, image)` records from MBTiles archives, flips
//! rows into TMS orientation, alpha-composites overlapping panels onto any
//! tile already on disk, turns background colours transparent and writes
//! the result as `Z{zoom}/{row}/{col}.png`.
//!
//! # High-Level API
//!
//! The [`quilt`] module drives a complete run:
//!
//! ```no_run
//! use tilequilt::quilt::{QuiltConfig, QuiltOrchestrator};
//!
//! let config = QuiltConfig::new("RNC_ROOT", "RNC_ROOT").with_archives(["01a", "01b"]);
//! let report = QuiltOrchestrator::new(config).run()?;
//! println!("{}", report.totals());
//! # Ok::<(), tilequilt::quilt::QuiltError>(())
//! ```
//!
//! The building blocks ([`archive`], [`coord`], [`raster`], [`output`]) are
//! public for callers that need a different pipeline.

pub mod archive;
pub mod config;
pub mod coord;
pub mod logging;
pub mod output;
pub mod quilt;
pub mod raster;

/// Version of the tilequilt library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
