//! The output tile tree.

use super::encode::{encode_tile, MetadataStatus};
use super::path::tile_path;
use super::OutputError;
use crate::coord::OutputCoord;
use crate::raster::decode_tile;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Default extension of written tiles.
pub const DEFAULT_EXTENSION: &str = "png";

/// What [`OutputTree::save_if_visible`] did.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Tile encoded and written (replacing any previous file)
    Written { metadata: MetadataStatus },
    /// Nothing visible to write; any existing file was left untouched
    SkippedTransparent { existing_kept: bool },
}

/// Root of a `Z<zoom>/<row>/<col>.<ext>` tile tree.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
    extension: String,
}

impl OutputTree {
    /// Create a tree rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the tile at `coord`.
    pub fn resolve_path(&self, coord: &OutputCoord) -> PathBuf {
        tile_path(&self.root, coord, &self.extension)
    }

    /// Create `dir` and its parents if missing.
    ///
    /// Succeeds when the directory already exists; fails when something
    /// other than a directory occupies the path.
    pub fn ensure_directory(&self, dir: &Path) -> Result<(), OutputError> {
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(OutputError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        fs::create_dir_all(dir).map_err(|source| OutputError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Decode the tile at `path` if one exists.
    pub fn load_if_exists(&self, path: &Path) -> Result<Option<RgbaImage>, OutputError> {
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(|source| OutputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decode_tile(&bytes).map_err(|source| OutputError::CorruptTile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(image))
    }

    /// Write `image` to `path` when it has visible pixels.
    ///
    /// A fully transparent raster never creates, truncates or deletes a
    /// file: whatever is at `path` stays as it was.
    pub fn save_if_visible(
        &self,
        path: &Path,
        image: &RgbaImage,
        has_visible_data: bool,
        metadata: Option<&str>,
    ) -> Result<SaveOutcome, OutputError> {
        if !has_visible_data {
            return Ok(SaveOutcome::SkippedTransparent {
                existing_kept: path.is_file(),
            });
        }

        if let Some(dir) = path.parent() {
            self.ensure_directory(dir)?;
        }

        let tile = encode_tile(image, metadata).map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, &tile.bytes).map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        trace!(path = %path.display(), bytes = tile.bytes.len(), "Tile written");

        Ok(SaveOutcome::Written {
            metadata: tile.metadata,
        })
    }
}

/// Write via a sibling temp file and rename, so a reader never sees a
/// half-written tile.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}
