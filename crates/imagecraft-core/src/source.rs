//! The image being edited: a decoded bitmap plus its on-screen size.

use crate::geometry::DisplaySize;
use crate::surface::{RasterSurface, Surface};

/// A decoded bitmap with its natural pixel grid and, once laid out, its display size.
///
/// The display size is owned by the editing surface; it is `None` until the
/// image has been measured, and any geometry that needs it fails with
/// `PipelineError::NotReady` until then.
#[derive(Debug, Clone)]
pub struct ImageSource {
    bitmap: RasterSurface,
    display: Option<DisplaySize>,
}

impl ImageSource {
    /// Wrap a decoded bitmap. The display size starts unknown.
    pub fn new(bitmap: RasterSurface) -> Self {
        Self {
            bitmap,
            display: None,
        }
    }

    /// Return a copy of this source with the given display size.
    pub fn with_display(mut self, display: DisplaySize) -> Self {
        self.display = Some(display);
        self
    }

    pub fn set_display(&mut self, display: Option<DisplaySize>) {
        self.display = display;
    }

    pub fn display(&self) -> Option<DisplaySize> {
        self.display
    }

    pub fn bitmap(&self) -> &RasterSurface {
        &self.bitmap
    }

    pub fn into_bitmap(self) -> RasterSurface {
        self.bitmap
    }

    pub fn natural_width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn natural_dimensions(&self) -> (u32, u32) {
        (self.bitmap.width(), self.bitmap.height())
    }

    /// Check if the bitmap has zero width or height.
    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }
}

impl From<RasterSurface> for ImageSource {
    fn from(bitmap: RasterSurface) -> Self {
        Self::new(bitmap)
    }
}
