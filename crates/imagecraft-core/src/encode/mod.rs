//! Turning surfaces into output bytes.
//!
//! This module provides functionality for:
//! - Encoding surfaces to PNG (lossless) or JPEG (configurable quality)
//! - Assembling multi-page PDF documents, one image per page
//! - Bundling many output files into one ZIP archive
//!
//! # Examples
//!
//! ```ignore
//! use imagecraft_core::encode::{encode_surface, EncodeOptions};
//!
//! let jpeg = encode_surface(&surface, &EncodeOptions::jpeg(0.9)).unwrap();
//! println!("Encoded {} bytes", jpeg.len());
//! ```

mod archive;
mod jpeg;
mod pdf;
mod png;
mod types;

pub use archive::{Archive, ZipBuilder, DEFAULT_ARCHIVE_FOLDER};
pub use jpeg::{encode_jpeg, flatten_alpha};
pub use pdf::{encode_pdf, PageOrientation, PdfWriter};
pub use png::encode_png;
pub use types::{quality_percent, EncodeError, EncodeOptions, ImageFormat, DEFAULT_QUALITY};

use crate::surface::Surface;

/// Encode a surface with the given format and quality.
pub fn encode_surface<S: Surface>(surface: &S, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = surface.dimensions();
    match options.format {
        ImageFormat::Png => encode_png(surface.pixels(), width, height),
        ImageFormat::Jpeg => encode_jpeg(surface.pixels(), width, height, options.jpeg_quality()),
    }
}

/// Validate an RGBA buffer against its dimensions.
pub(crate) fn check_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
