//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_png`] - Encode a surface losslessly
//! - [`encode_jpeg`] - Encode a surface with quality 0.0 to 1.0
//! - [`encode_pdf`] - Encode one or more surfaces as PDF pages
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg } from '@imagecraft/wasm';
//!
//! const jpeg = encode_jpeg(rendered, 0.92);
//! const blob = new Blob([jpeg], { type: 'image/jpeg' });
//! ```

use crate::types::{to_js_error, JsSurface};
use imagecraft_core::encode::{self, EncodeOptions, PdfWriter};
use imagecraft_core::Surface;
use wasm_bindgen::prelude::*;

/// Encode a surface as PNG. Alpha is kept.
#[wasm_bindgen]
pub fn encode_png(image: &JsSurface) -> Result<Vec<u8>, JsValue> {
    image.to_surface()?.encode(&EncodeOptions::png()).map_err(to_js_error)
}

/// Encode a surface as JPEG.
///
/// Transparent pixels are composited onto black. `quality` is clamped to
/// 0.0..=1.0 and mapped onto the encoder's 1 to 100 scale.
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsSurface, quality: f32) -> Result<Vec<u8>, JsValue> {
    image.to_surface()?.encode(&EncodeOptions::jpeg(quality)).map_err(to_js_error)
}

/// Encode by MIME type or extension (`"image/png"`, `"jpg"`, ...).
#[wasm_bindgen]
pub fn encode_image(image: &JsSurface, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
    let format = encode::ImageFormat::parse(format)
        .ok_or_else(|| JsValue::from_str(&format!("Unsupported output format: {}", format)))?;
    let options = EncodeOptions { format, quality };
    image.to_surface()?.encode(&options).map_err(to_js_error)
}

/// Encode surfaces as a multi-page PDF, one page per surface.
///
/// Each page is sized to its surface in points and oriented landscape when
/// wider than tall.
#[wasm_bindgen]
pub fn encode_pdf(pages: Vec<JsSurface>, quality: f32) -> Result<Vec<u8>, JsValue> {
    let mut writer = PdfWriter::new(quality);
    for page in &pages {
        writer.add_page(&page.to_surface()?).map_err(to_js_error)?;
    }
    writer.finish().map_err(to_js_error)
}
