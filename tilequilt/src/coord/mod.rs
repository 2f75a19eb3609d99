//! Coordinate handling for tile records.
//!
//! MBTiles archives and TMS servers disagree on which end of the row axis is
//! zero. The conversion is a pure function applied exactly once per record:
//!
//! ```text
//! row_tms = 2^zoom - 1 - row_native
//! ```

mod types;


pub use types::{CoordError, OutputCoord, TileCoord, MAX_ZOOM};

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Flip a row index between archive-native and TMS orientation.
///
/// The transform is its own inverse: `flip_row(z, flip_row(z, r)?)? == r`.
///
/// # Example
///
/// ```
/// use tilequilt::coord::flip_row;
///
/// assert_eq!(flip_row(10, 666).unwrap(), 357);
/// assert_eq!(flip_row(10, 357).unwrap(), 666);
/// ```
#[inline]
pub fn flip_row(zoom: u8, row: u32) -> Result<u32, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom.into()));
    }
    let limit = tiles_per_axis(zoom);
    if u64::from(row) >= limit {
        return Err(CoordError::OutOfRange {
            zoom,
            value: row.into(),
            limit,
        });
    }
    // limit - 1 - row < 2^31, always fits
    Ok((limit - 1 - u64::from(row)) as u32)
}

impl TileCoord {
    /// Build a coordinate from raw archive integers, validating ranges.
    pub fn from_archive(zoom: i64, col: i64, row: i64) -> Result<Self, CoordError> {
        let zoom = u8::try_from(zoom)
            .ok()
            .filter(|z| *z <= MAX_ZOOM)
            .ok_or(CoordError::InvalidZoom(zoom))?;
        let limit = tiles_per_axis(zoom);
        let check = |value: i64| -> Result<u32, CoordError> {
            match u64::try_from(value) {
                Ok(v) if v < limit => Ok(v as u32),
                _ => Err(CoordError::OutOfRange { zoom, value, limit }),
            }
        };
        Ok(Self {
            zoom,
            col: check(col)?,
            row: check(row)?,
        })
    }

    /// Map this archive coordinate into the output tree.
    ///
    /// With `flip_y` set the row is converted to TMS orientation, otherwise
    /// it is carried over as is.
    pub fn to_output(&self, flip_y: bool) -> Result<OutputCoord, CoordError> {
        let row = if flip_y {
            flip_row(self.zoom, self.row)?
        } else {
            self.row
        };
        Ok(OutputCoord {
            zoom: self.zoom,
            col: self.col,
            row,
        })
    }
}
