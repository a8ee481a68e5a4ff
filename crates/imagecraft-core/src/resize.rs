//! Resizing surfaces to batch targets.
//!
//! Three sizing rules are supported:
//! - **Percentage**: both axes scaled by `percentage / 100`
//! - **Fixed, keep aspect**: fit within `width x height` (`ratio = min(tW/W, tH/H)`)
//! - **Fixed, distort**: exactly `width x height`
//!
//! Target sizes are rounded to whole pixels and never drop below 1.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::encode::{EncodeError, EncodeOptions, ImageFormat};
use crate::error::{PipelineError, Result};
use crate::surface::{RasterSurface, Surface};

/// How target dimensions are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    #[default]
    Percentage,
    Fixed,
}

/// What a batch does when one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorPolicy {
    /// Stop the batch and return `PipelineError::BatchAborted`.
    #[default]
    Abort,
    /// Log the failure, leave the item out of the archive and continue.
    SkipFailed,
}

/// Settings for a batch resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResizeSettings {
    pub mode: ResizeMode,
    /// Target width for fixed mode.
    pub width: u32,
    /// Target height for fixed mode.
    pub height: u32,
    /// Scale for percentage mode (50 = half size).
    pub percentage: f64,
    /// Fixed mode only: fit within the target instead of stretching to it.
    pub maintain_aspect_ratio: bool,
    /// Lossy encoder quality, 0.0 to 1.0.
    pub quality: f32,
    pub format: ImageFormat,
    pub filter: FilterType,
    pub on_error: ErrorPolicy,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Percentage,
            width: 800,
            height: 600,
            percentage: 50.0,
            maintain_aspect_ratio: true,
            quality: 0.9,
            format: ImageFormat::Jpeg,
            filter: FilterType::Bilinear,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl ResizeSettings {
    pub fn percentage(percentage: f64) -> Self {
        Self {
            mode: ResizeMode::Percentage,
            percentage,
            ..Default::default()
        }
    }

    pub fn fixed(width: u32, height: u32, maintain_aspect_ratio: bool) -> Self {
        Self {
            mode: ResizeMode::Fixed,
            width,
            height,
            maintain_aspect_ratio,
            ..Default::default()
        }
    }

    /// Output dimensions for a `width x height` source.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match self.mode {
            ResizeMode::Percentage => {
                let ratio = self.percentage.max(0.0) / 100.0;
                scaled(width, height, ratio)
            }
            ResizeMode::Fixed if self.maintain_aspect_ratio => {
                fit_within(width, height, self.width.max(1), self.height.max(1))
            }
            ResizeMode::Fixed => (self.width.max(1), self.height.max(1)),
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            format: self.format,
            quality: self.quality,
        }
    }
}

fn scaled(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    (to_pixels(width as f64 * ratio), to_pixels(height as f64 * ratio))
}

fn to_pixels(v: f64) -> u32 {
    v.round().clamp(1.0, u32::MAX as f64) as u32
}

/// Largest size with the source's aspect ratio that fits in `target_w x target_h`.
pub fn fit_within(width: u32, height: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let ratio = f64::min(
        target_w as f64 / width as f64,
        target_h as f64 / height as f64,
    );
    scaled(width, height, ratio)
}

/// Resample all of `src` to exactly `width x height`.
///
/// # Errors
///
/// Returns `PipelineError::EmptySource` if the source or target is empty.
pub fn resample<S: Surface>(src: &S, width: u32, height: u32, filter: FilterType) -> Result<RasterSurface> {
    if src.is_empty() || width == 0 || height == 0 {
        return Err(PipelineError::EmptySource);
    }

    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (width, height) {
        return Ok(RasterSurface::new(width, height, src.pixels().to_vec()));
    }

    let rgba = image::RgbaImage::from_raw(src_w, src_h, src.pixels().to_vec()).ok_or(
        EncodeError::InvalidPixelData {
            expected: src_w as usize * src_h as usize * 4,
            actual: src.pixels().len(),
        },
    )?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(RasterSurface::from_rgba_image(resized))
}

/// Resize `src` according to `settings`.
pub fn resize_surface<S: Surface>(src: &S, settings: &ResizeSettings) -> Result<RasterSurface> {
    let (width, height) = settings.target_dimensions(src.width(), src.height());
    log::debug!(
        "Resizing {}x{} to {}x{} ({:?})",
        src.width(),
        src.height(),
        width,
        height,
        settings.mode
    );
    resample(src, width, height, settings.filter)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
