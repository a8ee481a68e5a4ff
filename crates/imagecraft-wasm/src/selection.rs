//! Selection operation WASM bindings.
//!
//! Crop, fill and border on a standalone surface, with the rectangle already
//! in the surface's pixel units (see `map_selection`). A zero-area rectangle
//! means "no selection".

use crate::types::{to_js_error, JsSurface};
use imagecraft_core::selection;
use imagecraft_core::{Color, NaturalRect};
use wasm_bindgen::prelude::*;

/// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` color.
pub(crate) fn parse_color(value: &str) -> Result<Color, JsValue> {
    Color::parse_hex(value).ok_or_else(|| JsValue::from_str(&format!("Invalid color: {}", value)))
}

fn optional_rect(x: f64, y: f64, width: f64, height: f64) -> Option<NaturalRect> {
    let rect = NaturalRect::new(x, y, width, height);
    (!rect.is_degenerate()).then_some(rect)
}

/// Cut the rectangle out of `image`.
///
/// # Errors
///
/// Fails if the rectangle has no area.
#[wasm_bindgen]
pub fn crop_image(image: &JsSurface, x: f64, y: f64, width: f64, height: f64) -> Result<JsSurface, JsValue> {
    let source = image.to_surface()?;
    selection::crop(&source, &NaturalRect::new(x, y, width, height))
        .map(JsSurface::from_surface)
        .map_err(to_js_error)
}

/// Fill the rectangle (or the whole image) with an opaque color.
#[wasm_bindgen]
pub fn fill_image(
    image: &JsSurface,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: &str,
) -> Result<JsSurface, JsValue> {
    let color = parse_color(color)?;
    let mut surface = image.to_surface()?;
    selection::fill(&mut surface, optional_rect(x, y, width, height).as_ref(), color);
    Ok(JsSurface::from_surface(surface))
}

/// Draw a border inside the rectangle (or around the whole image).
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn border_image(
    image: &JsSurface,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: &str,
    line_width: f64,
) -> Result<JsSurface, JsValue> {
    let color = parse_color(color)?;
    let mut surface = image.to_surface()?;
    selection::border(&mut surface, optional_rect(x, y, width, height).as_ref(), color, line_width);
    Ok(JsSurface::from_surface(surface))
}
