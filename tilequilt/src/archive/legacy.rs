//! Legacy per-tile metadata lookup.
//!
//! Some chart archives predate the fixed units annotation and instead keep
//! a JSON blob per tile in a side table keyed by the tile coordinate. The
//! payload lives in the fifth column; when several rows match, the last one
//! wins.

use super::reader::{has_table, open_read_only};
use super::types::ArchiveError;
use crate::coord::TileCoord;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Side table consulted when no other table name is configured.
pub const DEFAULT_LEGACY_TABLE: &str = "map";

const PAYLOAD_COLUMN: usize = 4;

/// Read-only handle on an archive's legacy metadata table.
///
/// Opens its own connection so lookups can run while a tile query on the
/// same file is mid-iteration.
pub struct LegacyMetadata {
    conn: Connection,
    sql: String,
}

impl std::fmt::Debug for LegacyMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyMetadata")
            .field("sql", &self.sql)
            .finish()
    }
}

impl LegacyMetadata {
    /// Open the lookup table of the archive at `path`.
    ///
    /// Fails with [`ArchiveError::MissingTable`] when the table is absent.
    pub fn open(path: &Path, table: &str) -> Result<Self, ArchiveError> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ArchiveError::MissingTable {
                path: path.to_path_buf(),
                table: table.to_string(),
            });
        }

        let conn = open_read_only(path)?;
        let exists = has_table(&conn, table).map_err(|source| ArchiveError::Unreadable {
            path: PathBuf::from(path),
            source,
        })?;
        if !exists {
            return Err(ArchiveError::MissingTable {
                path: path.to_path_buf(),
                table: table.to_string(),
            });
        }

        let sql = format!(
            "SELECT * FROM {} WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
            table
        );
        // Prepare once up front so a malformed table fails here, not per record.
        conn.prepare_cached(&sql)?;

        Ok(Self { conn, sql })
    }

    /// Look up the payload for an archive-native coordinate.
    ///
    /// Returns `Ok(None)` when no row matches or the payload is empty/NULL.
    pub fn lookup(&self, coord: &TileCoord) -> Result<Option<String>, ArchiveError> {
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(rusqlite::params![coord.zoom, coord.col, coord.row])?;

        let mut payload = None;
        while let Some(row) = rows.next()? {
            payload = match row.get_ref(PAYLOAD_COLUMN)? {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(t) | ValueRef::Blob(t) => {
                    Some(String::from_utf8_lossy(t).into_owned())
                }
            };
        }

        Ok(payload.filter(|p| !p.is_empty()))
    }
}
