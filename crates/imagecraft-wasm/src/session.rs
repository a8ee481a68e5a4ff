//! Editing session WASM bindings.
//!
//! Wraps the core session so the editing UI only has to forward user actions:
//! geometry buttons, the selection widget's rectangle, the laid-out image
//! size, and the destructive crop/fill/border actions.

use crate::filters::FilterState;
use crate::selection::parse_color;
use crate::types::{to_js_error, JsSurface};
use imagecraft_core::encode::{EncodeOptions, ImageFormat};
use imagecraft_core::{DisplaySize, SelectionRect};
use wasm_bindgen::prelude::*;

/// One image being edited.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = EditSession.from_bytes(bytes);
/// session.set_display(img.clientWidth, img.clientHeight);
/// session.set_selection(sel.x, sel.y, sel.width, sel.height);
/// session.crop();
/// const png = session.export("image/png", 1.0);
/// ```
#[wasm_bindgen]
pub struct EditSession {
    inner: imagecraft_core::EditSession,
}

#[wasm_bindgen]
impl EditSession {
    /// Decode `bytes` and start a session.
    pub fn from_bytes(bytes: &[u8]) -> Result<EditSession, JsValue> {
        let inner = imagecraft_core::EditSession::from_bytes(bytes).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Start a session on an already decoded surface.
    pub fn from_surface(image: &JsSurface) -> Result<EditSession, JsValue> {
        let source = imagecraft_core::ImageSource::new(image.to_surface()?);
        Ok(Self {
            inner: imagecraft_core::EditSession::new(source),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.source().natural_width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.source().natural_height()
    }

    /// Record the on-screen size of the image. Zero clears it.
    pub fn set_display(&mut self, width: f64, height: f64) {
        let display = DisplaySize::new(width, height);
        self.inner.set_display(display.is_measured().then_some(display));
    }

    /// Set the selection in display units. A zero-area rectangle clears it.
    pub fn set_selection(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_selection(SelectionRect::new(x, y, width, height));
    }

    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    pub fn has_selection(&self) -> bool {
        self.inner.selection().is_some()
    }

    /// Copy of the current filter state.
    pub fn filters(&self) -> FilterState {
        FilterState::from_inner(*self.inner.filters())
    }

    pub fn set_filters(&mut self, state: &FilterState) {
        self.inner.set_filters(*state.inner());
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.inner.rotate_by(degrees);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.inner.zoom_by(delta);
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.inner.toggle_flip_horizontal();
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.inner.toggle_flip_vertical();
    }

    pub fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    /// Render the current state for preview.
    pub fn render(&self) -> Result<JsSurface, JsValue> {
        self.inner.render().map(JsSurface::from_surface).map_err(to_js_error)
    }

    /// Crop to the selection and make the result the new image.
    pub fn crop(&mut self) -> Result<(), JsValue> {
        self.inner.crop().map_err(to_js_error)
    }

    /// Fill the selection (or everything) with a hex color.
    pub fn fill(&mut self, color: &str) -> Result<(), JsValue> {
        let color = parse_color(color)?;
        self.inner.fill(color).map_err(to_js_error)
    }

    /// Draw a border of `line_width` pixels inside the selection (or the image edge).
    pub fn border(&mut self, color: &str, line_width: f64) -> Result<(), JsValue> {
        let color = parse_color(color)?;
        self.inner.border(color, line_width).map_err(to_js_error)
    }

    /// Encode the edited image, cropped to the selection if one is active.
    ///
    /// `format` is a MIME type or extension; `quality` only affects JPEG.
    pub fn export(&self, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
        let format = ImageFormat::parse(format)
            .ok_or_else(|| JsValue::from_str(&format!("Unsupported output format: {}", format)))?;
        self.inner
            .export(&EncodeOptions { format, quality })
            .map_err(to_js_error)
    }

    /// Encode the edited image as a one-page PDF.
    pub fn export_pdf(&self, quality: f32) -> Result<Vec<u8>, JsValue> {
        self.inner.export_pdf(quality).map_err(to_js_error)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_crop_before_layout_fails() {
        let image = JsSurface::new(10, 10, vec![0u8; 400]);
        let mut s = EditSession::from_surface(&image).unwrap();
        s.set_selection(0.0, 0.0, 5.0, 5.0);
        assert!(s.crop().is_err());
        assert_eq!(s.width(), 10);
    }

    #[wasm_bindgen_test]
    fn test_crop_without_selection_fails() {
        let image = JsSurface::new(10, 10, vec![0u8; 400]);
        let mut s = EditSession::from_surface(&image).unwrap();
        s.set_display(10.0, 10.0);
        assert!(s.crop().is_err());
    }
}
