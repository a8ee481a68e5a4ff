//! Imagecraft Core - Raster transform and compositing pipeline
//!
//! This crate provides the image processing behind the Imagecraft tools:
//! mapping selections from the displayed image onto its pixels, rendering
//! filters and geometry onto a new surface, destructive crop/fill/border,
//! batch resizing into an archive and merging images or document pages into
//! one stacked output.
//!
//! All operations are synchronous and process one surface at a time.

pub mod batch;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod merge;
pub mod resize;
pub mod selection;
pub mod session;
pub mod source;
pub mod surface;
pub mod transform;

pub use error::{PipelineError, Result};
pub use filters::{FilterChain, FilterStage};
pub use geometry::{to_frame, to_natural, DisplaySize, NaturalRect, PixelRect, SelectionRect};
pub use session::EditSession;
pub use source::ImageSource;
pub use surface::{Color, RasterSurface, Surface};
pub use transform::{compute_rotated_bounds, InterpolationFilter, TransformPipeline};

use serde::{Deserialize, Serialize};

/// Smallest uniform scale the pipeline will draw with.
pub const MIN_SCALE: f64 = 0.1;

/// Visual adjustments for one editing session.
///
/// Percent values use 100 as "unchanged" for brightness, contrast and
/// saturate, and 0 for grayscale and sepia.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Brightness in percent (0 to 200)
    pub brightness: f64,
    /// Contrast in percent (0 to 200)
    pub contrast: f64,
    /// Saturation in percent (0 to 200)
    pub saturate: f64,
    /// Grayscale amount in percent (0 to 100)
    pub grayscale: f64,
    /// Sepia amount in percent (0 to 100)
    pub sepia: f64,
    /// Hue rotation in degrees
    pub hue_rotate: f64,
    /// Blur radius in pixels
    pub blur: f64,
    /// Rotation in degrees, clockwise
    pub rotate: f64,
    /// Uniform scale factor
    pub scale: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            grayscale: 0.0,
            sepia: 0.0,
            hue_rotate: 0.0,
            blur: 0.0,
            rotate: 0.0,
            scale: 1.0,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Check if rendering with this state leaves pixel positions unchanged.
    pub fn is_geometry_identity(&self) -> bool {
        self.rotate.rem_euclid(360.0) == 0.0
            && self.effective_scale() == 1.0
            && !self.flip_horizontal
            && !self.flip_vertical
    }

    /// Scale as the pipeline uses it: at least [`MIN_SCALE`].
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_nan() {
            return 1.0;
        }
        self.scale.max(MIN_SCALE)
    }

    /// Add `degrees` to the rotation, keeping it in `[0, 360)`.
    pub fn rotate_by(&mut self, degrees: f64) {
        self.rotate = (self.rotate + degrees).rem_euclid(360.0);
    }

    /// Add `delta` to the scale, never going below [`MIN_SCALE`].
    pub fn zoom_by(&mut self, delta: f64) {
        self.scale = (self.effective_scale() + delta).max(MIN_SCALE);
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
