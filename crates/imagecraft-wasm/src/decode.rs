//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG or PNG into an RGBA surface
//! - [`probe_dimensions`] - Read the oriented size from the header only
//! - [`is_pdf`] - Check whether bytes are a PDF document
//! - [`resize_image`] - Resample an image to exact dimensions
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, is_pdf } from '@imagecraft/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (!is_pdf(bytes)) {
//!   const image = decode_image(bytes);
//!   console.log(`Decoded ${image.width}x${image.height}`);
//! }
//! ```

use crate::types::{filter_from_u8, to_js_error, JsSurface};
use imagecraft_core::decode;
use imagecraft_core::resize::resample;
use wasm_bindgen::prelude::*;

/// Decode an image from bytes.
///
/// EXIF orientation is applied, so the result is upright.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSurface, JsValue> {
    decode::decode_image(bytes)
        .map(JsSurface::from_surface)
        .map_err(to_js_error)
}

/// Read `[width, height]` after orientation correction without decoding pixels.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    let info = decode::probe_image(bytes).map_err(to_js_error)?;
    let (width, height) = info.oriented_dimensions();
    Ok(vec![width, height])
}

/// Check if the bytes look like a PDF document.
#[wasm_bindgen]
pub fn is_pdf(bytes: &[u8]) -> bool {
    decode::is_pdf(bytes)
}

/// Resample an image to exactly `width x height`.
///
/// # Arguments
///
/// * `filter` - 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
#[wasm_bindgen]
pub fn resize_image(image: &JsSurface, width: u32, height: u32, filter: u8) -> Result<JsSurface, JsValue> {
    let source = image.to_surface()?;
    resample(&source, width, height, filter_from_u8(filter))
        .map(JsSurface::from_surface)
        .map_err(to_js_error)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_invalid() {
        assert!(decode_image(&[0u8, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_empty() {
        assert!(decode_image(&[]).is_err());
    }
}
