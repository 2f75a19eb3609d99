//! Read-only access to MBTiles archives.
//!
//! An archive is an SQLite file with a `tiles` table (or view) of
//! `(zoom_level, tile_column, tile_row, tile_data)`. Older chart archives
//! also carry a per-tile `map` table whose fifth column holds a metadata
//! payload; [`LegacyMetadata`] reads it.
//!
//! # Example
//!
//! ```ignore
//! use tilequilt::archive::MbtilesArchive;
//!
//! let archive = MbtilesArchive::open("RNC_ROOT/ncds_01a.mbtiles".as_ref())?;
//! let mut query = archive.tiles()?;
//! for record in query.records()? {
//!     let record = record?;
//!     println!("{:?} {} bytes", record.coord, record.data.len());
//! }
//! ```

mod legacy;
mod reader;
mod types;

pub use legacy::{LegacyMetadata, DEFAULT_LEGACY_TABLE};
pub use reader::{MbtilesArchive, TileQuery};
pub use types::{ArchiveError, TileRecord};
