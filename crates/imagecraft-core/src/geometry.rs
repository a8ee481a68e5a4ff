//! Coordinate mapping between the displayed image and its natural pixel grid.
//!
//! The editing surface shows an image scaled to fit its layout box, and the
//! selection widget reports rectangles in those display units. Every pixel
//! operation works on the natural grid, so selections go through [`to_natural`]
//! first.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, x grows right, y grows down
//! - Display and natural scale factors are computed per axis; a uniform
//!   display scale is never assumed
//! - When the natural image sits centered inside a larger rotated frame, the
//!   frame offset from [`frame_offset`] is added on top

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::source::ImageSource;

/// A rectangle in display units, as produced by the selection widget.
///
/// A zero width or height means there is no active selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this rectangle marks an actual region.
    pub fn is_active(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A rectangle in natural pixel units. Derived from a [`SelectionRect`], never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NaturalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NaturalRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width x height` surface.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Shift the rectangle by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Grow (positive `amount`) or shrink (negative) every edge by `amount`.
    pub fn expand(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Snap to the pixel grid by rounding position and size.
    pub fn to_pixel_rect(&self) -> PixelRect {
        PixelRect {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            width: self.width.round().max(0.0) as u32,
            height: self.height.round().max(0.0) as u32,
        }
    }
}

/// An integer rectangle on a pixel grid. The origin may lie outside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Size of the image as laid out on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check if layout has produced a usable size.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Per-axis factors that convert display units into natural pixels.
///
/// # Errors
///
/// Returns `PipelineError::NotReady` if the source has not been measured or
/// its display size is zero on either axis.
pub fn display_scale(source: &ImageSource) -> Result<(f64, f64)> {
    let display = source.display().ok_or(PipelineError::NotReady)?;
    if !display.is_measured() {
        return Err(PipelineError::NotReady);
    }

    let scale_x = source.natural_width() as f64 / display.width;
    let scale_y = source.natural_height() as f64 / display.height;
    Ok((scale_x, scale_y))
}

/// Map a display-space selection onto the source's natural pixel grid.
///
/// # Arguments
///
/// * `rect` - Selection in display units
/// * `source` - Image whose display size the selection was drawn against
///
/// # Example
///
/// ```ignore
/// // 1000x500 image shown at 200x100
/// let natural = to_natural(&SelectionRect::new(50.0, 25.0, 100.0, 50.0), &source)?;
/// assert_eq!(natural, NaturalRect::new(250.0, 125.0, 500.0, 250.0));
/// ```
pub fn to_natural(rect: &SelectionRect, source: &ImageSource) -> Result<NaturalRect> {
    let (scale_x, scale_y) = display_scale(source)?;

    Ok(NaturalRect {
        x: rect.x * scale_x,
        y: rect.y * scale_y,
        width: rect.width * scale_x,
        height: rect.height * scale_y,
    })
}

/// Offset of a natural-size image centered inside a larger frame.
///
/// The transform pipeline grows its output to the rotated bounding box and
/// draws the image around the center, so a natural-space rectangle must be
/// shifted by this amount before it addresses the frame.
pub fn frame_offset(frame: (u32, u32), natural: (u32, u32)) -> (f64, f64) {
    (
        (frame.0 as f64 - natural.0 as f64) / 2.0,
        (frame.1 as f64 - natural.1 as f64) / 2.0,
    )
}

/// Map a display-space selection onto a transformed frame of size `frame`.
///
/// Equivalent to [`to_natural`] followed by the [`frame_offset`] shift.
pub fn to_frame(rect: &SelectionRect, source: &ImageSource, frame: (u32, u32)) -> Result<NaturalRect> {
    let natural = to_natural(rect, source)?;
    let (dx, dy) = frame_offset(frame, source.natural_dimensions());
    Ok(natural.offset(dx, dy))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
