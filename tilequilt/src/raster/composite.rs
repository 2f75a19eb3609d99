//! Source-over compositing of tile rasters.

use super::RasterError;
use image::RgbaImage;
use rayon::prelude::*;

/// Decode encoded tile bytes (PNG, or any format the `image` build supports)
/// into an RGBA raster. Dimensions come from the data itself.
pub fn decode_tile(data: &[u8]) -> Result<RgbaImage, RasterError> {
    Ok(image::load_from_memory(data)?.to_rgba8())
}

/// Blend `incoming` over `existing`.
///
/// With no existing tile the incoming raster is returned untouched. Colour
/// channels use straight alpha:
///
/// ```text
/// out.a   = in.a + ex.a * (1 - in.a)
/// out.rgb = (in.rgb * in.a + ex.rgb * ex.a * (1 - in.a)) / out.a
/// ```
///
/// Results are rounded to the nearest 8-bit value. A fully opaque incoming
/// pixel replaces the existing one outright, so overlapping opaque content is
/// last-writer-wins.
///
/// # Errors
///
/// [`RasterError::DimensionMismatch`] when the two rasters differ in size.
/// Tiles are never resized.
pub fn composite_over(
    existing: Option<&RgbaImage>,
    mut incoming: RgbaImage,
) -> Result<RgbaImage, RasterError> {
    let Some(existing) = existing else {
        return Ok(incoming);
    };

    if existing.dimensions() != incoming.dimensions() {
        return Err(RasterError::DimensionMismatch {
            existing: existing.dimensions(),
            incoming: incoming.dimensions(),
        });
    }

    let dst: &[u8] = existing;
    let src: &mut [u8] = &mut incoming;
    src.par_chunks_exact_mut(4)
        .zip(dst.par_chunks_exact(4))
        .for_each(|(top, bottom)| blend_pixel(top, bottom));

    Ok(incoming)
}

/// Blend one pixel in place: `top` becomes `top over bottom`.
#[inline]
fn blend_pixel(top: &mut [u8], bottom: &[u8]) {
    match top[3] {
        255 => {}
        0 => top.copy_from_slice(bottom),
        _ => {
            let ta = f32::from(top[3]) / 255.0;
            let ba = f32::from(bottom[3]) / 255.0 * (1.0 - ta);
            let out_a = ta + ba;
            for c in 0..3 {
                let v = (f32::from(top[c]) * ta + f32::from(bottom[c]) * ba) / out_a;
                top[c] = to_channel(v);
            }
            top[3] = to_channel(out_a * 255.0);
        }
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_tile_png() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let decoded = decode_tile(&encode(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_tile_garbage() {
        let result = decode_tile(b"definitely not an image");
        assert!(matches!(result, Err(RasterError::Decode(_))));
    }

    #[test]
    fn test_no_existing_returns_incoming() {
        let incoming = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8, y as u8, 9, (x * 60) as u8]));
        let result = composite_over(None, incoming.clone()).unwrap();
        assert_eq!(result, incoming);
    }

    #[test]
    fn test_opaque_incoming_wins() {
        let existing = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));
        let incoming = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 10, 255]));
        let result = composite_over(Some(&existing), incoming.clone()).unwrap();
        assert_eq!(result, incoming);
    }

    #[test]
    fn test_transparent_incoming_keeps_existing() {
        let existing = RgbaImage::from_pixel(2, 2, Rgba([12, 34, 56, 78]));
        let incoming = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        let result = composite_over(Some(&existing), incoming).unwrap();
        assert_eq!(result, existing);
    }

    #[test]
    fn test_half_alpha_over_opaque() {
        let existing = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let incoming = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        let result = composite_over(Some(&existing), incoming).unwrap();
        // 255 * 128/255 = 128
        assert_eq!(*result.get_pixel(0, 0), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_half_alpha_over_half_alpha() {
        let existing = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 128]));
        let incoming = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128]));
        let result = composite_over(Some(&existing), incoming).unwrap();
        let px = result.get_pixel(0, 0).0;
        // out.a = 0.502 + 0.502 * 0.498 = 0.752 -> 192
        assert_eq!(px[3], 192);
        // red share = 0.502 / 0.752 -> 170, blue share = 0.250 / 0.752 -> 85
        assert_eq!(px[0], 170);
        assert_eq!(px[1], 0);
        assert_eq!(px[2], 85);
    }

    #[test]
    fn test_both_transparent_stays_transparent() {
        let existing = RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 0]));
        let incoming = RgbaImage::from_pixel(1, 1, Rgba([7, 7, 7, 0]));
        let result = composite_over(Some(&existing), incoming).unwrap();
        assert_eq!(result.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let existing = RgbaImage::new(256, 256);
        let incoming = RgbaImage::new(512, 512);
        let result = composite_over(Some(&existing), incoming);
        match result {
            Err(RasterError::DimensionMismatch { existing, incoming }) => {
                assert_eq!(existing, (256, 256));
                assert_eq!(incoming, (512, 512));
            }
            other => panic!("expected dimension mismatch, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = RasterError::DimensionMismatch {
            existing: (256, 256),
            incoming: (512, 256),
        };
        assert_eq!(
            err.to_string(),
            "Tile dimensions differ: existing 256x256, incoming 512x256"
        );
    }
}
