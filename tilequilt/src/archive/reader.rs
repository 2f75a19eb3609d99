//! MBTiles tile table reader.

use super::types::{ArchiveError, TileRecord};
use crate::coord::TileCoord;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Statement};
use std::path::{Path, PathBuf};

const TILE_TABLE: &str = "tiles";
const TILE_QUERY: &str = "SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles";

/// An open, read-only MBTiles archive.
pub struct MbtilesArchive {
    path: PathBuf,
    conn: Connection,
}

impl MbtilesArchive {
    /// Open an archive and verify it has a tile table.
    ///
    /// The file is never created or modified.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let conn = open_read_only(path)?;
        if !has_table(&conn, TILE_TABLE).map_err(|source| ArchiveError::Unreadable {
            path: path.to_path_buf(),
            source,
        })? {
            return Err(ArchiveError::MissingTable {
                path: path.to_path_buf(),
                table: TILE_TABLE.to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    /// Path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short display name (file stem) for logs.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Prepare a pass over the tile table in storage order.
    pub fn tiles(&self) -> Result<TileQuery<'_>, ArchiveError> {
        let stmt = self.conn.prepare(TILE_QUERY)?;
        Ok(TileQuery { stmt })
    }

    /// Count tile rows, for the progress total.
    pub fn tile_count(&self) -> Result<u64, ArchiveError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// A prepared tile table query.
///
/// Rows arrive in whatever order SQLite returns them; nothing downstream
/// depends on that order beyond last-writer-wins on overlapping pixels.
pub struct TileQuery<'conn> {
    stmt: Statement<'conn>,
}

impl TileQuery<'_> {
    /// Lazily iterate over the tile records.
    ///
    /// An `Err` that [`ArchiveError::is_per_record`] only concerns that row.
    /// Any other `Err` means SQLite failed to step and the pass should stop.
    pub fn records(
        &mut self,
    ) -> Result<impl Iterator<Item = Result<TileRecord, ArchiveError>> + '_, ArchiveError> {
        let rows = self.stmt.query_map([], |row| {
            Ok(RawRow {
                zoom: row.get_ref(0)?.as_i64().ok(),
                col: row.get_ref(1)?.as_i64().ok(),
                row: row.get_ref(2)?.as_i64().ok(),
                data: match row.get_ref(3)? {
                    ValueRef::Blob(b) => Some(b.to_vec()),
                    ValueRef::Text(t) => Some(t.to_vec()),
                    _ => None,
                },
            })
        })?;

        Ok(rows.map(|raw| raw.map_err(ArchiveError::from)?.into_record()))
    }
}

/// Row values before validation. Type problems are deferred so they stay
/// per-record instead of aborting the iteration.
struct RawRow {
    zoom: Option<i64>,
    col: Option<i64>,
    row: Option<i64>,
    data: Option<Vec<u8>>,
}

impl RawRow {
    fn into_record(self) -> Result<TileRecord, ArchiveError> {
        let (zoom, col, row) = match (self.zoom, self.col, self.row) {
            (Some(z), Some(c), Some(r)) => (z, c, r),
            (z, c, r) => {
                return Err(ArchiveError::InvalidRecord {
                    zoom: z.unwrap_or(-1),
                    col: c.unwrap_or(-1),
                    row: r.unwrap_or(-1),
                    reason: "non-integer tile coordinate".to_string(),
                })
            }
        };

        let coord = TileCoord::from_archive(zoom, col, row)
            .map_err(|e| ArchiveError::invalid_coord(zoom, col, row, e))?;

        let data = self.data.ok_or_else(|| ArchiveError::InvalidRecord {
            zoom,
            col,
            row,
            reason: "tile_data is not a blob".to_string(),
        })?;

        Ok(TileRecord { coord, data })
    }
}

/// Open an SQLite file without ever creating it.
pub(super) fn open_read_only(path: &Path) -> Result<Connection, ArchiveError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| ArchiveError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether a table or view named `name` exists.
pub(super) fn has_table(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_archive(dir: &TempDir, rows: &[(i64, i64, i64, &[u8])]) -> PathBuf {
        let path = dir.path().join("test.mbtiles");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, \
             tile_row INTEGER, tile_data BLOB);",
        )
        .unwrap();
        for (z, c, r, data) in rows {
            conn.execute(
                "INSERT INTO tiles VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![z, c, r, data],
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn test_open_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let result = MbtilesArchive::open(&dir.path().join("nope.mbtiles"));
        assert!(matches!(result, Err(ArchiveError::Unreadable { .. })));
        assert!(!dir.path().join("nope.mbtiles").exists());
    }

    #[test]
    fn test_open_not_a_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.mbtiles");
        std::fs::write(&path, b"this is not sqlite at all, just some text bytes").unwrap();
        let result = MbtilesArchive::open(&path);
        assert!(matches!(result, Err(ArchiveError::Unreadable { .. })));
    }

    #[test]
    fn test_open_without_tiles_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.mbtiles");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE metadata (name TEXT, value TEXT);")
            .unwrap();
        drop(conn);

        let result = MbtilesArchive::open(&path);
        assert!(matches!(
            result,
            Err(ArchiveError::MissingTable { ref table, .. }) if table == "tiles"
        ));
    }

    #[test]
    fn test_records_in_storage_order() {
        let dir = TempDir::new().unwrap();
        let path = create_archive(&dir, &[(1, 0, 1, b"a"), (2, 3, 2, b"bb")]);

        let archive = MbtilesArchive::open(&path).unwrap();
        assert_eq!(archive.name(), "test");
        assert_eq!(archive.tile_count().unwrap(), 2);

        let mut query = archive.tiles().unwrap();
        let records: Vec<_> = query.records().unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].coord,
            TileCoord {
                zoom: 1,
                col: 0,
                row: 1
            }
        );
        assert_eq!(records[1].data, b"bb".to_vec());
    }

    #[test]
    fn test_invalid_row_is_per_record() {
        let dir = TempDir::new().unwrap();
        let path = create_archive(&dir, &[(1, 0, 5, b"a"), (1, 1, 1, b"b")]);

        let archive = MbtilesArchive::open(&path).unwrap();
        let mut query = archive.tiles().unwrap();
        let results: Vec<_> = query.records().unwrap().collect();

        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert!(err.is_per_record());
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_null_tile_data_is_per_record() {
        let dir = TempDir::new().unwrap();
        let path = create_archive(&dir, &[]);
        let conn = Connection::open(&path).unwrap();
        conn.execute("INSERT INTO tiles VALUES (0, 0, 0, NULL)", [])
            .unwrap();
        drop(conn);

        let archive = MbtilesArchive::open(&path).unwrap();
        let mut query = archive.tiles().unwrap();
        let results: Vec<_> = query.records().unwrap().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(ArchiveError::InvalidRecord { ref reason, .. }) if reason.contains("blob")
        ));
    }

    #[test]
    fn test_tiles_view_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("view.mbtiles");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE images (tile_id TEXT, tile_data BLOB);
             CREATE TABLE map (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_id TEXT);
             CREATE VIEW tiles AS SELECT map.zoom_level AS zoom_level,
                 map.tile_column AS tile_column, map.tile_row AS tile_row,
                 images.tile_data AS tile_data
                 FROM map JOIN images ON images.tile_id = map.tile_id;
             INSERT INTO images VALUES ('x', x'0102');
             INSERT INTO map VALUES (3, 1, 2, 'x');",
        )
        .unwrap();
        drop(conn);

        let archive = MbtilesArchive::open(&path).unwrap();
        let mut query = archive.tiles().unwrap();
        let records: Vec<_> = query.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, vec![1, 2]);
    }
}
