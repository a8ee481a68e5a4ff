//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core imagecraft
//! types, handling the conversion between Rust and JavaScript data representations.

use imagecraft_core::decode::FilterType;
use imagecraft_core::{RasterSurface, Surface};
use wasm_bindgen::prelude::*;

/// An RGBA surface for JavaScript.
///
/// The pixel layout matches `ImageData.data`, so a surface can be painted
/// with `new ImageData(new Uint8ClampedArray(surface.pixels()), w, h)`.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it into a
/// `Uint8Array`. Call `free()` to release a large surface early; otherwise the
/// finalizer does it.
#[wasm_bindgen]
pub struct JsSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsSurface {
    /// Create a surface from RGBA data (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsSurface {
        JsSurface {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsSurface {
    pub(crate) fn from_surface(surface: RasterSurface) -> Self {
        Self {
            width: surface.width,
            height: surface.height,
            pixels: surface.pixels,
        }
    }

    /// Copy into a core surface.
    ///
    /// Fails if the buffer length does not match the dimensions.
    pub(crate) fn to_surface(&self) -> Result<RasterSurface, JsValue> {
        let mut surface = RasterSurface::blank(self.width, self.height);
        surface.set_pixels(&self.pixels).map_err(to_js_error)?;
        Ok(surface)
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest
/// - 1 = Bilinear
/// - 2 = Lanczos3
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Map any displayable error into a JavaScript exception value.
pub(crate) fn to_js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_to_surface_rejects_short_buffer() {
        let js = JsSurface::new(10, 10, vec![0u8; 10]);
        assert!(js.to_surface().is_err());
    }
}
