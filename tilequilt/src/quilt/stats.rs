//! Per-archive counters and the run report.

use super::QuiltError;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Counters for one archive pass.
///
/// Every record ends up in exactly one of the skip, failure or outcome
/// buckets, so nothing is dropped without being counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Records that passed the cheap skip filters and entered the pipeline
    pub processed: u64,
    /// Tiles encoded and written
    pub tiles_written: u64,
    /// Of the written tiles, those blended onto an existing tile
    pub tiles_merged: u64,
    /// Composites with no visible pixel left after masking
    pub skipped_transparent: u64,
    /// Records matching an empty-tile byte length
    pub skipped_empty: u64,
    /// Records below the legacy metadata minimum zoom
    pub skipped_below_min_zoom: u64,
    /// Records with unusable coordinates or tile data
    pub invalid_records: u64,
    /// Incoming or existing tiles that failed to decode
    pub decode_failures: u64,
    pub dimension_mismatches: u64,
    /// Read, encode or write failures on a single tile
    pub io_failures: u64,
    /// Tiles written without their annotation, or failed lookups
    pub metadata_failures: u64,
}

impl ArchiveStats {
    /// Records that were skipped because of an error.
    pub fn failures(&self) -> u64 {
        self.invalid_records + self.decode_failures + self.dimension_mismatches + self.io_failures
    }
}

impl AddAssign for ArchiveStats {
    fn add_assign(&mut self, rhs: Self) {
        self.processed += rhs.processed;
        self.tiles_written += rhs.tiles_written;
        self.tiles_merged += rhs.tiles_merged;
        self.skipped_transparent += rhs.skipped_transparent;
        self.skipped_empty += rhs.skipped_empty;
        self.skipped_below_min_zoom += rhs.skipped_below_min_zoom;
        self.invalid_records += rhs.invalid_records;
        self.decode_failures += rhs.decode_failures;
        self.dimension_mismatches += rhs.dimension_mismatches;
        self.io_failures += rhs.io_failures;
        self.metadata_failures += rhs.metadata_failures;
    }
}

impl fmt::Display for ArchiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} written ({} merged), {} transparent, {} empty, {} failed",
            self.processed,
            self.tiles_written,
            self.tiles_merged,
            self.skipped_transparent,
            self.skipped_empty,
            self.failures()
        )?;
        if self.metadata_failures > 0 {
            write!(f, ", {} without metadata", self.metadata_failures)?;
        }
        Ok(())
    }
}

/// Result of one configured archive.
#[derive(Debug)]
pub struct ArchiveReport {
    pub id: String,
    pub path: PathBuf,
    pub result: Result<ArchiveStats, QuiltError>,
}

/// Result of a whole run, in configured archive order.
#[derive(Debug, Default)]
pub struct QuiltReport {
    pub archives: Vec<ArchiveReport>,
}

impl QuiltReport {
    /// Sum of the counters of every archive that completed.
    pub fn totals(&self) -> ArchiveStats {
        let mut total = ArchiveStats::default();
        for stats in self.archives.iter().filter_map(|a| a.result.as_ref().ok()) {
            total += *stats;
        }
        total
    }

    /// Archives that were aborted.
    pub fn failed(&self) -> impl Iterator<Item = &ArchiveReport> {
        self.archives.iter().filter(|a| a.result.is_err())
    }

    pub fn all_failed(&self) -> bool {
        !self.archives.is_empty() && self.archives.iter().all(|a| a.result.is_err())
    }
}
