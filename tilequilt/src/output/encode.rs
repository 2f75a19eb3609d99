//! PNG encoding with an optional text annotation.
//!
//! The annotation is stored under the `meta` keyword. Payloads that fit in
//! Latin-1 go into a `tEXt` chunk, anything else into a UTF-8 `iTXt` chunk.
//! Pixel data is authoritative: if the annotation cannot be attached the
//! tile is encoded without it and the failure is reported alongside.

use image::RgbaImage;
use thiserror::Error;

/// Keyword of the text chunk carrying the metadata payload.
pub const METADATA_KEYWORD: &str = "meta";

/// Why a metadata payload could not be attached.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Payload cannot be represented in a PNG text chunk
    #[error("Invalid metadata payload: {0}")]
    InvalidPayload(String),

    /// The PNG encoder rejected the text chunk
    #[error("Failed to write metadata chunk: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Outcome of the annotation step for one encoded tile.
#[derive(Debug)]
pub enum MetadataStatus {
    /// No payload was configured for this tile
    NotRequested,
    /// Payload embedded
    Attached,
    /// Tile was encoded without the payload
    Failed(MetadataError),
}

/// An encoded tile ready to be written.
#[derive(Debug)]
pub struct EncodedTile {
    pub bytes: Vec<u8>,
    pub metadata: MetadataStatus,
}

/// Encode an RGBA raster as PNG, attaching `metadata` when given.
///
/// Only errors from encoding the pixels themselves are returned; metadata
/// problems end up in [`EncodedTile::metadata`].
pub fn encode_tile(
    image: &RgbaImage,
    metadata: Option<&str>,
) -> Result<EncodedTile, png::EncodingError> {
    let Some(payload) = metadata else {
        return Ok(EncodedTile {
            bytes: encode_png(image, None)?,
            metadata: MetadataStatus::NotRequested,
        });
    };

    let failure = match validate_payload(payload) {
        Ok(()) => match encode_png(image, Some(payload)) {
            Ok(bytes) => {
                return Ok(EncodedTile {
                    bytes,
                    metadata: MetadataStatus::Attached,
                })
            }
            Err(e) => MetadataError::Encoding(e),
        },
        Err(e) => e,
    };

    Ok(EncodedTile {
        bytes: encode_png(image, None)?,
        metadata: MetadataStatus::Failed(failure),
    })
}

/// Check that a payload can live in a PNG text chunk.
pub fn validate_payload(payload: &str) -> Result<(), MetadataError> {
    if payload.is_empty() {
        return Err(MetadataError::InvalidPayload("payload is empty".to_string()));
    }
    if payload.contains('\0') {
        return Err(MetadataError::InvalidPayload(
            "payload contains a NUL character".to_string(),
        ));
    }
    Ok(())
}

/// Encode 8-bit RGBA PNG bytes.
pub fn encode_png(image: &RgbaImage, metadata: Option<&str>) -> Result<Vec<u8>, png::EncodingError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        if let Some(text) = metadata {
            if is_latin1(text) {
                encoder.add_text_chunk(METADATA_KEYWORD.to_string(), text.to_string())?;
            } else {
                encoder.add_itxt_chunk(METADATA_KEYWORD.to_string(), text.to_string())?;
            }
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(bytes)
}

fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| (c as u32) <= 0xFF)
}
