//! Rasterizing document pages (PDF) into surfaces.
//!
//! The merge engine accepts documents alongside images and renders every page
//! to pixels first. Rendering is delegated to a [`PageRasterizer`]; the
//! default [`NoDocumentSupport`] refuses documents, and a PDFium-backed
//! implementation is available with the `pdfium` feature.

use super::DecodeError;
use crate::surface::RasterSurface;

/// Magic bytes at the start of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Check if `bytes` look like a PDF document.
pub fn is_pdf(bytes: &[u8]) -> bool {
    // Header may appear anywhere in the first kilobyte
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Renders every page of a document to an RGBA surface.
pub trait PageRasterizer {
    /// Render all pages in order.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The document file
    /// * `scale` - Pixels per document unit (points for PDF)
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::UnsupportedDocument` if the document cannot be
    /// opened, `DecodeError::PageRender` if a page fails to render.
    fn rasterize(&self, bytes: &[u8], scale: f32) -> Result<Vec<RasterSurface>, DecodeError>;
}

/// Rasterizer used when no document backend is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocumentSupport;

impl PageRasterizer for NoDocumentSupport {
    fn rasterize(&self, _bytes: &[u8], _scale: f32) -> Result<Vec<RasterSurface>, DecodeError> {
        Err(DecodeError::UnsupportedDocument(
            "document rendering is not available in this build".to_string(),
        ))
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use pdfium_render::prelude::*;

    use super::{DecodeError, PageRasterizer};
    use crate::surface::RasterSurface;

    /// PDF rasterizer backed by a dynamically linked PDFium.
    ///
    /// Searches for libpdfium in:
    /// 1. Current directory
    /// 2. `vendor/pdfium/lib/`
    /// 3. System library paths
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfiumRasterizer;

    impl PdfiumRasterizer {
        fn bind() -> Result<Pdfium, DecodeError> {
            let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "./vendor/pdfium/lib/",
                    ))
                })
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| {
                    DecodeError::UnsupportedDocument(format!("Failed to load PDFium library: {:?}", e))
                })?;

            Ok(Pdfium::new(bindings))
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize(&self, bytes: &[u8], scale: f32) -> Result<Vec<RasterSurface>, DecodeError> {
            let pdfium = Self::bind()?;
            let document = pdfium
                .load_pdf_from_byte_slice(bytes, None)
                .map_err(|e| DecodeError::UnsupportedDocument(e.to_string()))?;

            let config = PdfRenderConfig::new().scale_page_by_factor(scale);

            let mut pages = Vec::new();
            for (index, page) in document.pages().iter().enumerate() {
                let bitmap = page
                    .render_with_config(&config)
                    .map_err(|e| DecodeError::PageRender {
                        page: index + 1,
                        reason: e.to_string(),
                    })?;

                let image = bitmap.as_image();
                pages.push(RasterSurface::from_rgba_image(image.into_rgba8()));
            }

            log::debug!("Rasterized {} PDF pages at scale {}", pages.len(), scale);
            Ok(pages)
        }
    }
}
