//! The quilting pipeline.
//!
//! For every configured archive, every tile record flows through:
//!
//! ```text
//! record ─► empty/zoom filters ─► flip row ─► decode
//!                                              │
//!        ┌──────────── per-tile lock ──────────┤
//!        │ load existing ─► composite ─► mask ─► save if visible
//!        └─────────────────────────────────────┘
//! ```
//!
//! Record-level failures are counted and skipped. Only an unreadable archive
//! or an unusable output directory aborts an archive, and the run continues
//! with the next one.

use super::config::{MetadataMode, QuiltConfig};
use super::error::{QuiltError, RecordError};
use super::metadata::MetadataSource;
use super::stats::{ArchiveReport, ArchiveStats, QuiltReport};
use crate::archive::{MbtilesArchive, TileRecord};
use crate::coord::TileCoord;
use crate::output::{MetadataStatus, OutputError, OutputTree, SaveOutcome, TileLocks};
use crate::raster::{composite_over, decode_tile, mask_color_keys, RasterError};
use rayon::prelude::*;
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Records between debug-level progress events.
const DEBUG_PROGRESS_INTERVAL: u64 = 100;

/// Drives archives through the quilting pipeline into one output tree.
///
/// # Example
///
/// ```no_run
/// use tilequilt::quilt::{QuiltConfig, QuiltOrchestrator};
///
/// let config = QuiltConfig::new("RNC_ROOT", "RNC_ROOT").with_archives(["01a", "01b"]);
/// let report = QuiltOrchestrator::new(config).run()?;
/// println!("{}", report.totals());
/// # Ok::<(), tilequilt::quilt::QuiltError>(())
/// ```
pub struct QuiltOrchestrator {
    config: QuiltConfig,
    tree: OutputTree,
    locks: TileLocks,
}

impl QuiltOrchestrator {
    pub fn new(config: QuiltConfig) -> Self {
        let tree = OutputTree::new(&config.output_dir).with_extension(&config.extension);
        Self {
            config,
            tree,
            locks: TileLocks::new(),
        }
    }

    pub fn config(&self) -> &QuiltConfig {
        &self.config
    }

    pub fn output_tree(&self) -> &OutputTree {
        &self.tree
    }

    /// Process every configured archive.
    ///
    /// Archive failures are recorded in the report, not returned. The only
    /// error is failing to start the worker pool.
    pub fn run(&self) -> Result<QuiltReport, QuiltError> {
        let archives = if self.config.workers <= 1 {
            self.config
                .archives
                .iter()
                .map(|id| self.report_for(id))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .thread_name(|i| format!("quilt-worker-{}", i))
                .build()
                .map_err(|e| QuiltError::WorkerPool(e.to_string()))?;
            pool.install(|| {
                self.config
                    .archives
                    .par_iter()
                    .map(|id| self.report_for(id))
                    .collect()
            })
        };

        Ok(QuiltReport { archives })
    }

    fn report_for(&self, id: &str) -> ArchiveReport {
        let path = self.config.archive_path(id);
        let result = self.process_archive_path(&path);
        match &result {
            Ok(stats) => info!(archive = id, "Finished: {}", stats),
            Err(e) => error!(archive = id, error = %e, "Archive aborted"),
        }
        ArchiveReport {
            id: id.to_string(),
            path,
            result,
        }
    }

    /// Process a single archive identified as in the configuration.
    pub fn process_archive(&self, id: &str) -> Result<ArchiveStats, QuiltError> {
        self.process_archive_path(&self.config.archive_path(id))
    }

    /// Process the archive at `path`.
    pub fn process_archive_path(&self, path: &Path) -> Result<ArchiveStats, QuiltError> {
        let archive = MbtilesArchive::open(path)?;
        let name = archive.name();
        let total = archive.tile_count()?;
        info!(archive = %name, path = %path.display(), tiles = total, "Opening archive");

        let metadata = MetadataSource::resolve(&self.config, path);
        let mut stats = ArchiveStats::default();
        let mut query = archive.tiles()?;

        for item in query.records()? {
            let record = match item {
                Ok(record) => record,
                Err(e) if e.is_per_record() => {
                    stats.invalid_records += 1;
                    self.report_skip(&name, None, &e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if self.config.is_empty_tile(record.data.len()) {
                stats.skipped_empty += 1;
                self.report_skip(&name, Some(&record.coord), &"matches empty-tile byte length");
                continue;
            }
            if self.config.metadata == MetadataMode::LegacyLookup
                && record.coord.zoom < self.config.legacy_min_zoom
            {
                stats.skipped_below_min_zoom += 1;
                self.report_skip(&name, Some(&record.coord), &"below legacy minimum zoom");
                continue;
            }

            stats.processed += 1;
            self.log_progress(&name, stats.processed, total);

            let payload = match metadata.payload_for(&record.coord) {
                Ok(payload) => payload,
                Err(e) => {
                    stats.metadata_failures += 1;
                    warn!(archive = %name, tile = ?record.coord, error = %e, "Metadata lookup failed");
                    None
                }
            };

            match self.process_record(&record, payload.as_deref()) {
                Ok((outcome, merged)) => self.record_outcome(&name, &record, outcome, merged, &mut stats),
                Err(RecordError::Output(e)) if e.is_directory_failure() => {
                    return Err(QuiltError::Output(e));
                }
                Err(e) => {
                    count_failure(&e, &mut stats);
                    if matches!(e, RecordError::Raster(RasterError::DimensionMismatch { .. })) {
                        warn!(archive = %name, tile = ?record.coord, error = %e, "Skipping tile");
                    } else {
                        self.report_skip(&name, Some(&record.coord), &e);
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Run one record through flip, decode, composite, mask and save.
    ///
    /// Returns the save outcome and whether an existing tile was blended in.
    fn process_record(
        &self,
        record: &TileRecord,
        metadata: Option<&str>,
    ) -> Result<(SaveOutcome, bool), RecordError> {
        let coord = record.coord.to_output(self.config.flip_y)?;
        let path = self.tree.resolve_path(&coord);
        let incoming = decode_tile(&record.data)?;

        self.locks.with_lock(&path, || -> Result<_, RecordError> {
            let existing = if self.config.merge {
                self.tree.load_if_exists(&path)?
            } else {
                None
            };
            let merged = existing.is_some();

            let mut composite = composite_over(existing.as_ref(), incoming)?;
            let visible = mask_color_keys(&mut composite, &self.config.color_keys);
            let outcome = self
                .tree
                .save_if_visible(&path, &composite, visible, metadata)?;
            Ok((outcome, merged))
        })
    }

    fn record_outcome(
        &self,
        archive: &str,
        record: &TileRecord,
        outcome: SaveOutcome,
        merged: bool,
        stats: &mut ArchiveStats,
    ) {
        match outcome {
            SaveOutcome::Written { metadata } => {
                stats.tiles_written += 1;
                if merged {
                    stats.tiles_merged += 1;
                }
                if let MetadataStatus::Failed(e) = metadata {
                    stats.metadata_failures += 1;
                    warn!(archive, tile = ?record.coord, error = %e, "Tile written without metadata");
                }
            }
            SaveOutcome::SkippedTransparent { .. } => {
                stats.skipped_transparent += 1;
                self.report_skip(archive, Some(&record.coord), &"no visible pixels after masking");
            }
        }
    }

    /// Per-record skip report: info in verbose mode, debug otherwise.
    fn report_skip(&self, archive: &str, tile: Option<&TileCoord>, reason: &dyn Display) {
        if self.config.verbosity.is_verbose() {
            info!(archive, tile = ?tile, "Skipped: {}", reason);
        } else {
            debug!(archive, tile = ?tile, "Skipped: {}", reason);
        }
    }

    fn log_progress(&self, archive: &str, processed: u64, total: u64) {
        if processed % self.config.progress_interval.max(1) == 0 {
            info!(archive, processed, total, "Progress");
        } else if processed % DEBUG_PROGRESS_INTERVAL == 0 {
            debug!(archive, processed, total, "Progress");
        }
    }
}

fn count_failure(err: &RecordError, stats: &mut ArchiveStats) {
    match err {
        RecordError::Coord(_) => stats.invalid_records += 1,
        RecordError::Raster(RasterError::Decode(_)) => stats.decode_failures += 1,
        RecordError::Raster(RasterError::DimensionMismatch { .. }) => {
            stats.dimension_mismatches += 1
        }
        RecordError::Output(OutputError::CorruptTile { source, .. }) => match source {
            RasterError::DimensionMismatch { .. } => stats.dimension_mismatches += 1,
            RasterError::Decode(_) => stats.decode_failures += 1,
        },
        RecordError::Output(_) => stats.io_failures += 1,
    }
}
