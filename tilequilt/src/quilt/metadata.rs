//! Metadata payload strategy, resolved once per archive.

use super::config::{MetadataMode, QuiltConfig};
use crate::archive::{ArchiveError, LegacyMetadata};
use crate::coord::TileCoord;
use std::borrow::Cow;
use std::path::Path;
use tracing::warn;

/// Where the annotation for an archive's tiles comes from.
#[derive(Debug)]
pub enum MetadataSource {
    /// Same payload for every tile
    Fixed(String),
    /// Per-tile payload from the archive's legacy side table
    Lookup(LegacyMetadata),
    /// No annotation
    None,
}

impl MetadataSource {
    /// Pick the strategy for the archive at `path`.
    ///
    /// A legacy lookup on an archive without the side table degrades to
    /// [`MetadataSource::None`] with a warning.
    pub fn resolve(config: &QuiltConfig, path: &Path) -> Self {
        match config.metadata {
            MetadataMode::LegacyLookup => match LegacyMetadata::open(path, &config.legacy_table) {
                Ok(lookup) => MetadataSource::Lookup(lookup),
                Err(e) => {
                    warn!(
                        archive = %path.display(),
                        error = %e,
                        "Legacy metadata unavailable, writing tiles without annotation"
                    );
                    MetadataSource::None
                }
            },
            mode => match mode.fixed_payload() {
                Some(payload) => MetadataSource::Fixed(payload.to_string()),
                None => MetadataSource::None,
            },
        }
    }

    /// Payload for the tile at archive-native `coord`.
    pub fn payload_for(&self, coord: &TileCoord) -> Result<Option<Cow<'_, str>>, ArchiveError> {
        match self {
            MetadataSource::Fixed(text) => Ok(Some(Cow::Borrowed(text.as_str()))),
            MetadataSource::Lookup(lookup) => Ok(lookup.lookup(coord)?.map(Cow::Owned)),
            MetadataSource::None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn coord() -> TileCoord {
        TileCoord {
            zoom: 9,
            col: 1,
            row: 2,
        }
    }

    #[test]
    fn test_fixed_modes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.mbtiles");

        let feet = MetadataSource::resolve(&QuiltConfig::default(), &path);
        assert_eq!(
            feet.payload_for(&coord()).unwrap().as_deref(),
            Some("{\"units\": \"feet\"}")
        );

        let none = MetadataSource::resolve(
            &QuiltConfig::default().with_metadata(MetadataMode::None),
            &path,
        );
        assert!(matches!(none, MetadataSource::None));
        assert_eq!(none.payload_for(&coord()).unwrap(), None);
    }

    #[test]
    fn test_legacy_without_table_degrades_to_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.mbtiles");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE tiles (zoom_level, tile_column, tile_row, tile_data);")
            .unwrap();

        let source = MetadataSource::resolve(
            &QuiltConfig::default().with_metadata(MetadataMode::LegacyLookup),
            &path,
        );
        assert!(matches!(source, MetadataSource::None));
    }

    #[test]
    fn test_legacy_lookup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.mbtiles");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE map (zoom_level, tile_column, tile_row, grid_id, meta);
                 INSERT INTO map VALUES (9, 1, 2, 'g', '{\"units\": \"fathoms\"}');",
            )
            .unwrap();

        let source = MetadataSource::resolve(
            &QuiltConfig::default().with_metadata(MetadataMode::LegacyLookup),
            &path,
        );
        assert!(matches!(source, MetadataSource::Lookup(_)));
        assert_eq!(
            source.payload_for(&coord()).unwrap().as_deref(),
            Some("{\"units\": \"fathoms\"}")
        );
    }
}
