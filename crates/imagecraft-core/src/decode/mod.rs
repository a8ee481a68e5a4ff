//! Turning input bytes into surfaces.
//!
//! This module provides functionality for:
//! - Decoding raster images (JPEG, PNG) with EXIF orientation correction
//! - Probing image dimensions from the header without a full decode
//! - Rasterizing document pages through a pluggable [`PageRasterizer`]
//!
//! All operations are synchronous and single-threaded.
//!
//! # Examples
//!
//! ```ignore
//! use imagecraft_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let surface = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", surface.width, surface.height);
//! ```

mod document;
mod raster;
mod types;

#[cfg(feature = "pdfium")]
pub use document::PdfiumRasterizer;
pub use document::{is_pdf, NoDocumentSupport, PageRasterizer};
pub use raster::{decode_image, decode_image_no_orientation, get_orientation, probe_image};
pub use types::{DecodeError, FilterType, ImageInfo, Orientation};
