//! Output tree path construction.

use crate::coord::OutputCoord;
use std::path::{Path, PathBuf};

/// Construct the path of an output tile.
///
/// ```text
/// <root>/Z<zoom>/<row>/<col>.<ext>
/// ```
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use tilequilt::coord::OutputCoord;
/// use tilequilt::output::tile_path;
///
/// let coord = OutputCoord { zoom: 10, col: 164, row: 357 };
/// let path = tile_path(&PathBuf::from("/charts"), &coord, "png");
///
/// assert_eq!(path, PathBuf::from("/charts/Z10/357/164.png"));
/// ```
pub fn tile_path(root: &Path, coord: &OutputCoord, extension: &str) -> PathBuf {
    row_directory(root, coord).join(format!("{}.{}", coord.col, extension))
}

/// Directory holding every tile of one output row.
pub fn row_directory(root: &Path, coord: &OutputCoord) -> PathBuf {
    root.join(format!("Z{}", coord.zoom))
        .join(coord.row.to_string())
}
