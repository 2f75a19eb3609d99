//! Default values for configuration settings and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::logging::{default_log_dir, default_log_file};
use crate::quilt::{
    MetadataMode, DEFAULT_ARCHIVE_PATTERN, DEFAULT_EMPTY_TILE_SIZE, DEFAULT_LEGACY_MIN_ZOOM,
};
use crate::raster::ColorKeySet;

/// Directory archives are read from.
pub const DEFAULT_INPUT_DIR: &str = "RNC_ROOT";

/// Root of the output tile tree.
pub const DEFAULT_OUTPUT_DIR: &str = "RNC_ROOT";

/// NOAA chart panels, in the order they are quilted when none are named.
///
/// Later panels win where they overlap earlier ones.
pub const DEFAULT_PANELS: &[&str] = &[
    "01a", "01b", "02a", "02b", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
    "13", "14", "15", "16", "17a", "17b", "18", "19", "19b", "19c", "19d", "20a", "20b", "20c",
    "21", "22a", "22b", "23a", "23b", "24a", "24b", "25a", "25b", "26a", "26b", "27", "28a",
    "28b", "29", "30", "31a", "31b",
];

pub fn default_panels() -> Vec<String> {
    DEFAULT_PANELS.iter().map(|p| p.to_string()).collect()
}

impl Default for QuiltSettings {
    fn default() -> Self {
        Self {
            indir: PathBuf::from(DEFAULT_INPUT_DIR),
            outdir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            archive_pattern: DEFAULT_ARCHIVE_PATTERN.to_string(),
            flip_y: true,
            merge: true,
            metadata_units: MetadataMode::default(),
            color_keys: ColorKeySet::default(),
            empty_tile_sizes: vec![DEFAULT_EMPTY_TILE_SIZE],
            legacy_min_zoom: DEFAULT_LEGACY_MIN_ZOOM,
            workers: 1,
            panels: default_panels(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(default_log_dir()),
            file: default_log_file().to_string(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            quilt: QuiltSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
