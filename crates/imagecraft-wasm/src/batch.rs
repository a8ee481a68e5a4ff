//! Batch resize WASM bindings.
//!
//! Collects files, resizes them one at a time and returns a ZIP archive.
//! Progress is reported through an optional JavaScript callback
//! `(completed, total) => boolean | void`; returning `false` cancels the
//! batch before the next file.

use std::ops::ControlFlow;

use crate::types::to_js_error;
use imagecraft_core::batch::{self, BatchItem, BatchProgress, DEFAULT_ARCHIVE_NAME};
use imagecraft_core::resize::ResizeSettings;
use wasm_bindgen::prelude::*;

/// Wrap an optional JS callback as a progress handler.
///
/// A callback that throws is reported to the console and does not cancel.
pub(crate) fn progress_callback(
    callback: Option<js_sys::Function>,
) -> impl FnMut(&BatchProgress) -> ControlFlow<()> {
    move |progress: &BatchProgress| {
        let Some(callback) = callback.as_ref() else {
            return ControlFlow::Continue(());
        };

        let completed = JsValue::from_f64(progress.completed as f64);
        let total = JsValue::from_f64(progress.total as f64);
        match callback.call2(&JsValue::NULL, &completed, &total) {
            Ok(result) if result.as_bool() == Some(false) => ControlFlow::Break(()),
            Ok(_) => ControlFlow::Continue(()),
            Err(e) => {
                web_sys::console::warn_2(&JsValue::from_str("Progress callback failed:"), &e);
                ControlFlow::Continue(())
            }
        }
    }
}

/// Parse settings from a plain JS object; `undefined` gives the defaults.
fn parse_settings(settings: JsValue) -> Result<ResizeSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(ResizeSettings::default());
    }
    serde_wasm_bindgen::from_value(settings).map_err(to_js_error)
}

/// Files queued for a batch resize.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const resizer = new BatchResizer();
/// for (const file of files) {
///   resizer.add(file.name, new Uint8Array(await file.arrayBuffer()));
/// }
/// const zip = resizer.run(
///   { mode: "fixed", width: 800, height: 600, maintainAspectRatio: true, quality: 0.9 },
///   (done, total) => setProgress(done / total),
/// );
/// ```
#[wasm_bindgen]
pub struct BatchResizer {
    items: Vec<BatchItem>,
}

#[wasm_bindgen]
impl BatchResizer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Queue a file. Returns its index.
    pub fn add(&mut self, name: &str, bytes: Vec<u8>) -> usize {
        self.items.push(BatchItem::new(bytes, name));
        self.items.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.items.len()
    }

    /// `[width, height]` of a queued file, read from its header.
    pub fn dimensions(&mut self, index: usize) -> Result<Vec<u32>, JsValue> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| JsValue::from_str("Index out of range"))?;
        let (width, height) = match item.dimensions {
            Some(dimensions) => dimensions,
            None => item.measure().map_err(to_js_error)?,
        };
        Ok(vec![width, height])
    }

    /// Suggested file name for the archive
    pub fn archive_name(&self) -> String {
        DEFAULT_ARCHIVE_NAME.to_string()
    }

    /// Resize every queued file and return the ZIP bytes.
    ///
    /// # Errors
    ///
    /// Fails if nothing is queued, a file fails under the default abort
    /// policy, or the callback cancels.
    pub fn run(&mut self, settings: JsValue, on_progress: Option<js_sys::Function>) -> Result<Vec<u8>, JsValue> {
        let settings = parse_settings(settings)?;
        let zip = batch::resize_to_zip(&mut self.items, &settings, progress_callback(on_progress))
            .map_err(to_js_error)?;
        Ok(zip)
    }
}

impl Default for BatchResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecraft_core::encode::encode_png;

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&vec![90u8; (width * height * 4) as usize], width, height).unwrap()
    }

    #[test]
    fn test_queue_management() {
        let mut resizer = BatchResizer::new();
        assert_eq!(resizer.add("a.png", png(4, 4)), 0);
        assert_eq!(resizer.add("b.png", png(4, 4)), 1);
        assert_eq!(resizer.length(), 2);

        assert!(resizer.remove(0));
        assert!(!resizer.remove(5));
        assert_eq!(resizer.length(), 1);

        resizer.clear();
        assert_eq!(resizer.length(), 0);
        assert_eq!(resizer.archive_name(), "resized_images.zip");
    }

    #[test]
    fn test_dimensions_probe() {
        let mut resizer = BatchResizer::new();
        resizer.add("wide.png", png(64, 16));
        assert_eq!(resizer.dimensions(0).unwrap(), vec![64, 16]);
    }
}
