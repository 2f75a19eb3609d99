//! Settings structs for the configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::quilt::{MetadataMode, QuiltConfig};
use crate::raster::ColorKeySet;
use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Quilting settings
    pub quilt: QuiltSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[quilt]` section.
#[derive(Debug, Clone)]
pub struct QuiltSettings {
    /// Directory holding the archives
    pub indir: PathBuf,
    /// Root of the output tile tree
    pub outdir: PathBuf,
    /// Archive file name pattern, `{}` replaced by the panel identifier
    pub archive_pattern: String,
    pub flip_y: bool,
    pub merge: bool,
    pub metadata_units: MetadataMode,
    /// Colours turned transparent before a tile is saved
    pub color_keys: ColorKeySet,
    /// Byte lengths of blank tiles
    pub empty_tile_sizes: Vec<usize>,
    pub legacy_min_zoom: u8,
    pub workers: usize,
    /// Panels quilted when none are given on the command line
    pub panels: Vec<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl ConfigFile {
    /// Build the run configuration described by this file.
    pub fn to_quilt_config(&self) -> QuiltConfig {
        let q = &self.quilt;
        QuiltConfig::new(&q.indir, &q.outdir)
            .with_archives(q.panels.iter().cloned())
            .with_archive_pattern(q.archive_pattern.clone())
            .with_flip_y(q.flip_y)
            .with_merge(q.merge)
            .with_metadata(q.metadata_units)
            .with_color_keys(q.color_keys.clone())
            .with_empty_tile_sizes(q.empty_tile_sizes.clone())
            .with_legacy_min_zoom(q.legacy_min_zoom)
            .with_workers(q.workers)
    }
}
