//! PNG encoding for lossless export.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};

/// Encode RGBA pixel data to PNG bytes, keeping the alpha channel.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for a zero-sized image and
/// `EncodeError::InvalidPixelData` if the buffer is not `width * height * 4` bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
