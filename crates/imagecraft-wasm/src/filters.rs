//! Filter state WASM bindings.
//!
//! Exposes the editing session's adjustments (color filters and geometry) as
//! a mutable JavaScript object, plus the renderer that applies them.

use crate::types::{to_js_error, JsSurface};
use imagecraft_core::{FilterChain, TransformPipeline};
use wasm_bindgen::prelude::*;

/// Filter state wrapper for JavaScript
#[wasm_bindgen]
pub struct FilterState {
    inner: imagecraft_core::FilterState,
}

#[wasm_bindgen]
impl FilterState {
    /// Create a filter state with default values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: imagecraft_core::FilterState::default(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f64 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f64) {
        self.inner.brightness = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f64) {
        self.inner.contrast = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturate(&self) -> f64 {
        self.inner.saturate
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturate(&mut self, value: f64) {
        self.inner.saturate = value;
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> f64 {
        self.inner.grayscale
    }

    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: f64) {
        self.inner.grayscale = value;
    }

    #[wasm_bindgen(getter)]
    pub fn sepia(&self) -> f64 {
        self.inner.sepia
    }

    #[wasm_bindgen(setter)]
    pub fn set_sepia(&mut self, value: f64) {
        self.inner.sepia = value;
    }

    #[wasm_bindgen(getter = hueRotate)]
    pub fn hue_rotate(&self) -> f64 {
        self.inner.hue_rotate
    }

    #[wasm_bindgen(setter = hueRotate)]
    pub fn set_hue_rotate(&mut self, value: f64) {
        self.inner.hue_rotate = value;
    }

    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f64 {
        self.inner.blur
    }

    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f64) {
        self.inner.blur = value;
    }

    /// Rotation in degrees, clockwise, in [0, 360)
    #[wasm_bindgen(getter)]
    pub fn rotate(&self) -> f64 {
        self.inner.rotate
    }

    #[wasm_bindgen(setter)]
    pub fn set_rotate(&mut self, value: f64) {
        self.inner.rotate = value.rem_euclid(360.0);
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale
    }

    /// Set the scale, clamped to the minimum
    #[wasm_bindgen(setter)]
    pub fn set_scale(&mut self, value: f64) {
        self.inner.scale = value.max(imagecraft_core::MIN_SCALE);
    }

    #[wasm_bindgen(getter = flipHorizontal)]
    pub fn flip_horizontal(&self) -> bool {
        self.inner.flip_horizontal
    }

    #[wasm_bindgen(getter = flipVertical)]
    pub fn flip_vertical(&self) -> bool {
        self.inner.flip_vertical
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

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// CSS `filter` string for live preview, e.g. `brightness(120%) blur(2px)`
    pub fn css_filter(&self) -> String {
        FilterChain::from_state(&self.inner).to_css()
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain object; missing fields take defaults
    pub fn from_json(value: JsValue) -> Result<FilterState, JsValue> {
        let inner: imagecraft_core::FilterState = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub(crate) fn inner(&self) -> &imagecraft_core::FilterState {
        &self.inner
    }

    pub(crate) fn from_inner(inner: imagecraft_core::FilterState) -> Self {
        Self { inner }
    }
}

/// Render an image with filters and geometry applied.
///
/// The output grows to the rotated bounding box, so no corner is clipped.
///
/// # Arguments
/// * `image` - Source image at natural resolution
/// * `state` - Filters and geometry to apply
/// * `high_quality` - Use Lanczos3 sampling (export) instead of bilinear (preview)
///
/// # Example (TypeScript)
/// ```typescript
/// const state = new FilterState();
/// state.rotate_by(90);
/// state.sepia = 40;
/// const rendered = apply_filters(image, state, false);
/// ```
#[wasm_bindgen]
pub fn apply_filters(image: &JsSurface, state: &FilterState, high_quality: bool) -> Result<JsSurface, JsValue> {
    let source = image.to_surface()?;
    let pipeline = if high_quality {
        TransformPipeline::export()
    } else {
        TransformPipeline::preview()
    };

    pipeline
        .apply(&source, state.inner())
        .map(JsSurface::from_surface)
        .map_err(to_js_error)
}
