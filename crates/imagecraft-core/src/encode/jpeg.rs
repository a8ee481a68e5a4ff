//! JPEG encoding for export.
//!
//! Surfaces carry alpha and JPEG does not, so pixels are first flattened onto
//! an opaque background. Black is used, which is what a browser canvas does
//! when exporting a transparent canvas as JPEG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};
use crate::surface::Color;

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails.
///
/// # Example
///
/// ```ignore
/// use imagecraft_core::encode::encode_jpeg;
///
/// let pixels = vec![128u8; 100 * 100 * 4];
/// let jpeg = encode_jpeg(&pixels, 100, 100, 90).unwrap();
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let rgb = flatten_alpha(pixels, Color::BLACK);
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Composite RGBA pixels over an opaque `background`, returning packed RGB.
pub fn flatten_alpha(pixels: &[u8], background: Color) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    let bg = [background.r, background.g, background.b];

    for px in pixels.chunks_exact(4) {
        let alpha = px[3] as u32;
        for c in 0..3 {
            let v = (px[c] as u32 * alpha + bg[c] as u32 * (255 - alpha) + 127) / 255;
            rgb.push(v as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_jpeg(bytes: &[u8]) -> bool {
        bytes.len() >= 4 && bytes[0..2] == [0xFF, 0xD8] && bytes[bytes.len() - 2..] == [0xFF, 0xD9]
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let pixels = vec![128u8; 64 * 32 * 4];
        let jpeg = encode_jpeg(&pixels, 64, 32, 90).unwrap();
        assert!(is_jpeg(&jpeg));
    }

    #[test]
    fn test_encode_jpeg_decodes_to_same_size() {
        let pixels = vec![200u8; 30 * 20 * 4];
        let jpeg = encode_jpeg(&pixels, 30, 20, 80).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn test_transparent_pixels_become_black() {
        let pixels = vec![255, 255, 255, 0].repeat(16 * 16);
        let jpeg = encode_jpeg(&pixels, 16, 16, 100).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap().into_rgb8();
        let p = decoded.get_pixel(8, 8).0;
        assert!(p.iter().all(|&c| c < 8), "expected black, got {:?}", p);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 4];
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_rejects_rgb_buffer() {
        // An RGB-sized buffer is not valid RGBA input
        let pixels = vec![128u8; 10 * 10 * 3];
        let result = encode_jpeg(&pixels, 10, 10, 90);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 400,
                actual: 300
            })
        ));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 100, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 100, 0, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_flatten_alpha() {
        let pixels = [255, 0, 0, 255, 255, 255, 255, 0, 100, 100, 100, 128];
        assert_eq!(flatten_alpha(&pixels, Color::BLACK), vec![255, 0, 0, 0, 0, 0, 50, 50, 50]);
        assert_eq!(
            flatten_alpha(&pixels, Color::WHITE),
            vec![255, 0, 0, 255, 255, 255, 177, 177, 177]
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=40, 1u32..=40)
    }

    proptest! {
        /// Property: valid input always produces a complete JPEG stream.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in dimensions_strategy(),
            quality in 1u8..=100,
            fill in any::<u8>(),
        ) {
            let pixels = vec![fill; (width * height * 4) as usize];
            let jpeg = encode_jpeg(&pixels, width, height, quality).unwrap();

            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Property: any buffer length other than width * height * 4 is rejected.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in dimensions_strategy(),
            delta in -10i64..=10,
        ) {
            prop_assume!(delta != 0);
            let expected = (width * height * 4) as i64;
            prop_assume!(expected + delta >= 0);

            let pixels = vec![0u8; (expected + delta) as usize];
            let result = encode_jpeg(&pixels, width, height, 90);
            prop_assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })), "expected InvalidPixelData");
        }

        /// Property: flattening is exact for opaque pixels and yields 3 bytes per pixel.
        #[test]
        fn prop_flatten_opaque_is_identity(rgb in prop::collection::vec(any::<u8>(), 3..=60)) {
            let rgb = &rgb[..rgb.len() / 3 * 3];
            let rgba: Vec<u8> = rgb.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect();

            prop_assert_eq!(flatten_alpha(&rgba, Color::BLACK), rgb.to_vec());
        }
    }
}
