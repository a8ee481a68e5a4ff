//! Imagecraft WASM - WebAssembly bindings for Imagecraft
//!
//! This crate exposes the imagecraft-core pipeline to JavaScript/TypeScript
//! applications. The browser owns the UI (upload, selection drawing, layout);
//! everything that touches pixels goes through here.
//!
//! # Module Structure
//!
//! - `types` - RGBA surface wrapper shared by all bindings
//! - `filters` - Filter state and the transform renderer
//! - `transform` - Rotated bounds and selection mapping
//! - `selection` - Crop, fill and border on a surface
//! - `session` - Editing session with destructive operations and export
//! - `decode` / `encode` - Image bytes in and out
//! - `batch` - Batch resize to a ZIP archive
//! - `merge` - Stack images or build a PDF from images and PDF pages
//!
//! # Usage
//!
//! ```typescript
//! import init, { EditSession } from '@imagecraft/wasm';
//!
//! await init();
//!
//! const session = EditSession.from_bytes(new Uint8Array(await file.arrayBuffer()));
//! session.rotate_by(90);
//! const jpeg = session.export("image/jpeg", 0.92);
//! ```

use wasm_bindgen::prelude::*;

mod batch;
mod decode;
mod encode;
mod filters;
mod merge;
mod selection;
mod session;
mod transform;
mod types;

pub use batch::BatchResizer;
pub use decode::{decode_image, is_pdf, probe_dimensions, resize_image};
pub use encode::{encode_image, encode_jpeg, encode_pdf, encode_png};
pub use filters::{apply_filters, FilterState};
pub use merge::{ImageMerger, MergeResult};
pub use selection::{border_image, crop_image, fill_image};
pub use session::EditSession;
pub use transform::{map_selection, rotated_bounds};
pub use types::JsSurface;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
