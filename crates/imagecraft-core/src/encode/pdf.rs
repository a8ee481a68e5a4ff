//! Multi-page PDF assembly.
//!
//! Every page holds exactly one JPEG image drawn edge to edge. The page box is
//! the image's pixel size, one PDF unit per pixel, so nothing is scaled.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use super::jpeg::encode_jpeg;
use super::{quality_percent, EncodeError};
use crate::surface::Surface;

/// Page orientation, derived from the image's aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

impl PageOrientation {
    /// Landscape when strictly wider than tall, portrait otherwise (squares included).
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        }
    }

    /// Order `(a, b)` so the page box matches this orientation.
    pub fn page_box(self, a: u32, b: u32) -> (u32, u32) {
        let (long, short) = (a.max(b), a.min(b));
        match self {
            PageOrientation::Landscape => (long, short),
            PageOrientation::Portrait => (short, long),
        }
    }
}

/// Incrementally builds a PDF with one image per page.
///
/// Pages are encoded as they are added, so only the compressed JPEG of each
/// page is retained.
///
/// # Example
///
/// ```ignore
/// let mut writer = PdfWriter::new(0.95);
/// for page in &pages {
///     writer.add_page(page)?;
/// }
/// let bytes = writer.finish()?;
/// ```
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    quality: u8,
}

impl PdfWriter {
    /// Create an empty document whose page images use `quality` (0.0..=1.0).
    pub fn new(quality: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            quality: quality_percent(quality),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append `surface` as a new page.
    pub fn add_page<S: Surface>(&mut self, surface: &S) -> Result<(), EncodeError> {
        let (width, height) = surface.dimensions();
        let jpeg = encode_jpeg(surface.pixels(), width, height, self.quality)?;
        self.add_jpeg_page(jpeg, width, height)
    }

    /// Append an already JPEG-encoded image as a new page.
    pub fn add_jpeg_page(&mut self, jpeg: Vec<u8>, width: u32, height: u32) -> Result<(), EncodeError> {
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimensions { width, height });
        }

        let orientation = PageOrientation::for_dimensions(width, height);
        let (page_w, page_h) = orientation.page_box(width, height);

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(width as i64),
                "Height" => Object::Integer(height as i64),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            jpeg,
        );
        let image_id = self.doc.add_object(image);

        // Scale the unit square to the page box and draw the image into it
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(page_w as i64),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(page_h as i64),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| EncodeError::Document(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(page_w as i64),
                Object::Integer(page_h as i64),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => Object::Reference(image_id),
                },
            },
            "Contents" => Object::Reference(content_id),
        });
        self.kids.push(Object::Reference(page_id));
        Ok(())
    }

    /// Write the page tree and serialize the document.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::EmptyDocument` if no page was added.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        if self.kids.is_empty() {
            return Err(EncodeError::EmptyDocument);
        }

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => Object::Integer(count),
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| EncodeError::Document(e.to_string()))?;
        Ok(buffer)
    }
}

/// Encode each surface as one page of a new PDF.
pub fn encode_pdf<S: Surface>(pages: &[S], quality: f32) -> Result<Vec<u8>, EncodeError> {
    let mut writer = PdfWriter::new(quality);
    for page in pages {
        writer.add_page(page)?;
    }
    writer.finish()
}
