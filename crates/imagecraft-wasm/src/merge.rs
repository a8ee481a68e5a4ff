//! Merge WASM bindings.
//!
//! The browser renders PDF pages itself (e.g. with pdf.js), so documents are
//! rasterized through a JavaScript callback
//! `(bytes: Uint8Array, scale: number) => Uint8Array[]` that returns one
//! encoded PNG or JPEG per page.

use crate::batch::progress_callback;
use crate::types::to_js_error;
use imagecraft_core::decode::{decode_image, DecodeError, NoDocumentSupport, PageRasterizer};
use imagecraft_core::merge::{self, MergeKind, MergeQueue, MergeSettings, SourceKind};
use imagecraft_core::RasterSurface;
use wasm_bindgen::prelude::*;

/// Page rasterizer that delegates to a JavaScript function.
struct JsPageRasterizer {
    render: js_sys::Function,
}

impl PageRasterizer for JsPageRasterizer {
    fn rasterize(&self, bytes: &[u8], scale: f32) -> Result<Vec<RasterSurface>, DecodeError> {
        let data = js_sys::Uint8Array::from(bytes);
        let result = self
            .render
            .call2(&JsValue::NULL, &data, &JsValue::from_f64(scale as f64))
            .map_err(|e| DecodeError::UnsupportedDocument(format!("{:?}", e)))?;

        js_sys::Array::from(&result)
            .iter()
            .enumerate()
            .map(|(page, encoded)| {
                let encoded = js_sys::Uint8Array::new(&encoded).to_vec();
                decode_image(&encoded).map_err(|e| DecodeError::PageRender {
                    page,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

fn kind_name(kind: MergeKind) -> &'static str {
    match kind {
        MergeKind::Image => "image",
        MergeKind::Document => "document",
    }
}

/// Encoded merge output.
#[wasm_bindgen]
pub struct MergeResult {
    bytes: Vec<u8>,
    kind: MergeKind,
}

#[wasm_bindgen]
impl MergeResult {
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// `"merged.png"` or `"merged.pdf"`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.kind.file_name().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.kind.mime_type().to_string()
    }

    /// `"image"` or `"document"`
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        kind_name(self.kind).to_string()
    }
}

/// Ordered list of images and PDFs to merge.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const merger = new ImageMerger();
/// for (const file of files) {
///   merger.add(new Uint8Array(await file.arrayBuffer()), file.type);
/// }
/// merger.move_up(2);
/// const result = merger.merge({ spacing: 20 }, renderPdfPages, onProgress);
/// download(result.bytes(), result.file_name);
/// ```
#[wasm_bindgen]
pub struct ImageMerger {
    queue: MergeQueue,
}

#[wasm_bindgen]
impl ImageMerger {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            queue: MergeQueue::new(),
        }
    }

    /// Queue a file. The MIME type decides the kind; an unknown type falls
    /// back to sniffing the bytes. Returns its index.
    pub fn add(&mut self, bytes: Vec<u8>, mime: &str) -> usize {
        match SourceKind::from_mime(mime) {
            Some(kind) => self.queue.push_kind(bytes, kind),
            None => self.queue.push(bytes),
        }
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        self.queue.move_up(index)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.queue.move_down(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.queue.remove(index).is_some()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.queue.len()
    }

    /// Output kind the current queue will produce: `"image"` or `"document"`.
    pub fn output_kind(&self) -> String {
        kind_name(self.queue.kind()).to_string()
    }

    /// Spacing presets in pixels.
    pub fn spacing_presets() -> Vec<u32> {
        merge::SPACING_PRESETS.to_vec()
    }

    /// Merge the queue.
    ///
    /// # Arguments
    ///
    /// * `settings` - `{ spacing, quality }`, or `undefined` for defaults
    /// * `render_pages` - Rasterizes PDF items; required only if any are queued
    /// * `on_progress` - `(completed, total)`; return `false` to cancel
    pub fn merge(
        &self,
        settings: JsValue,
        render_pages: Option<js_sys::Function>,
        on_progress: Option<js_sys::Function>,
    ) -> Result<MergeResult, JsValue> {
        let settings: MergeSettings = if settings.is_undefined() || settings.is_null() {
            MergeSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings).map_err(to_js_error)?
        };

        let progress = progress_callback(on_progress);
        let output = match render_pages {
            Some(render) => merge::merge(
                self.queue.items(),
                &settings,
                &JsPageRasterizer { render },
                progress,
            ),
            None => merge::merge(self.queue.items(), &settings, &NoDocumentSupport, progress),
        }
        .map_err(to_js_error)?;

        Ok(MergeResult {
            bytes: output.bytes,
            kind: output.kind,
        })
    }
}

impl Default for ImageMerger {
    fn default() -> Self {
        Self::new()
    }
}
