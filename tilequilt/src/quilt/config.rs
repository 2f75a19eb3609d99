//! Quilt run configuration.

use crate::archive::DEFAULT_LEGACY_TABLE;
use crate::logging::Verbosity;
use crate::output::DEFAULT_EXTENSION;
use crate::raster::ColorKeySet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Byte length of the fully transparent 256x256 PNG the chart archives use
/// for blank tiles.
pub const DEFAULT_EMPTY_TILE_SIZE: usize = 190;

/// Legacy metadata tables only cover zoom 8 and deeper.
pub const DEFAULT_LEGACY_MIN_ZOOM: u8 = 8;

/// Records between progress events.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Default archive file name; `{}` is replaced by the archive identifier.
pub const DEFAULT_ARCHIVE_PATTERN: &str = "ncds_{}.mbtiles";

/// Where a tile's metadata annotation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataMode {
    /// `{"units": "feet"}`
    #[default]
    Feet,
    /// `{"units": "metric"}`
    Metric,
    /// Per-tile payload from the archive's legacy side table
    LegacyLookup,
    /// No annotation
    None,
}

impl MetadataMode {
    /// Payload for the fixed modes.
    pub fn fixed_payload(&self) -> Option<&'static str> {
        match self {
            MetadataMode::Feet => Some(r#"{"units": "feet"}"#),
            MetadataMode::Metric => Some(r#"{"units": "metric"}"#),
            MetadataMode::LegacyLookup | MetadataMode::None => None,
        }
    }
}

impl fmt::Display for MetadataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetadataMode::Feet => "feet",
            MetadataMode::Metric => "metric",
            MetadataMode::LegacyLookup => "legacy",
            MetadataMode::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for MetadataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feet" => Ok(MetadataMode::Feet),
            "metric" => Ok(MetadataMode::Metric),
            "legacy" | "oldformatmbtiles" => Ok(MetadataMode::LegacyLookup),
            "none" => Ok(MetadataMode::None),
            other => Err(format!(
                "unknown metadata mode '{}', expected feet, metric, legacy or none",
                other
            )),
        }
    }
}

/// Everything a quilt run needs.
#[derive(Debug, Clone)]
pub struct QuiltConfig {
    /// Archive identifiers, processed in this order
    pub archives: Vec<String>,
    /// Directory holding the archives
    pub input_dir: PathBuf,
    /// Root of the output tile tree
    pub output_dir: PathBuf,
    /// File name pattern turning an identifier into an archive file name
    pub archive_pattern: String,
    /// Convert archive rows to TMS orientation
    pub flip_y: bool,
    /// Blend onto existing tiles instead of overwriting them
    pub merge: bool,
    pub metadata: MetadataMode,
    /// Side table read in [`MetadataMode::LegacyLookup`]
    pub legacy_table: String,
    /// In legacy mode, records shallower than this zoom are skipped
    pub legacy_min_zoom: u8,
    pub color_keys: ColorKeySet,
    /// Encoded byte lengths that identify blank tiles without decoding
    pub empty_tile_sizes: Vec<usize>,
    pub progress_interval: u64,
    /// Archives processed concurrently (1 keeps archive order deterministic)
    pub workers: usize,
    pub verbosity: Verbosity,
    /// Output file extension
    pub extension: String,
}

impl Default for QuiltConfig {
    fn default() -> Self {
        Self {
            archives: Vec::new(),
            input_dir: PathBuf::from("RNC_ROOT"),
            output_dir: PathBuf::from("RNC_ROOT"),
            archive_pattern: DEFAULT_ARCHIVE_PATTERN.to_string(),
            flip_y: true,
            merge: true,
            metadata: MetadataMode::default(),
            legacy_table: DEFAULT_LEGACY_TABLE.to_string(),
            legacy_min_zoom: DEFAULT_LEGACY_MIN_ZOOM,
            color_keys: ColorKeySet::default(),
            empty_tile_sizes: vec![DEFAULT_EMPTY_TILE_SIZE],
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            workers: 1,
            verbosity: Verbosity::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl QuiltConfig {
    /// Create a configuration for the given directories with defaults
    /// everywhere else.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_archives<I, S>(mut self, archives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.archives = archives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_archive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.archive_pattern = pattern.into();
        self
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataMode) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_legacy_table(mut self, table: impl Into<String>) -> Self {
        self.legacy_table = table.into();
        self
    }

    pub fn with_legacy_min_zoom(mut self, zoom: u8) -> Self {
        self.legacy_min_zoom = zoom;
        self
    }

    pub fn with_color_keys(mut self, keys: ColorKeySet) -> Self {
        self.color_keys = keys;
        self
    }

    pub fn with_empty_tile_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.empty_tile_sizes = sizes;
        self
    }

    /// Progress event every `interval` records (0 is treated as 1).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Number of archives processed at once (0 is treated as 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Path of the archive named by `id`.
    ///
    /// Identifiers ending in `.mbtiles` are taken as file names; anything
    /// else is substituted into the archive pattern.
    pub fn archive_path(&self, id: &str) -> PathBuf {
        if id.ends_with(".mbtiles") {
            self.input_dir.join(id)
        } else {
            self.input_dir.join(self.archive_pattern.replace("{}", id))
        }
    }

    /// Whether a record of this byte length is a known blank tile.
    pub fn is_empty_tile(&self, len: usize) -> bool {
        self.empty_tile_sizes.contains(&len)
    }
}
