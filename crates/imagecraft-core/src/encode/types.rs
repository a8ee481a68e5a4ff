//! Core types for encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while producing output bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The image codec failed
    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),

    /// A document was finished without any pages
    #[error("Document has no pages")]
    EmptyDocument,

    /// Building the PDF failed
    #[error("PDF assembly failed: {0}")]
    Document(String),

    /// Writing the archive failed
    #[error("Archive assembly failed: {0}")]
    Archive(String),
}

/// Raster output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless, keeps alpha.
    #[default]
    Png,
    /// Lossy, alpha is flattened onto black.
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Parse a MIME type or file extension.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" | "image/png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// Default lossy quality, matching a browser canvas.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Output format and quality for [`encode_surface`](super::encode_surface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncodeOptions {
    pub format: ImageFormat,
    /// Lossy quality in `0.0..=1.0`. Ignored for PNG.
    pub quality: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncodeOptions {
    pub fn png() -> Self {
        Self::default()
    }

    pub fn jpeg(quality: f32) -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality,
        }
    }

    /// Quality on the codec's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        quality_percent(self.quality)
    }
}

/// Map a `0.0..=1.0` quality to the JPEG encoder's `1..=100` scale.
///
/// Out-of-range and NaN inputs fall back to the nearest valid value
/// (NaN becomes the default quality).
pub fn quality_percent(quality: f32) -> u8 {
    let q = if quality.is_nan() { DEFAULT_QUALITY } else { quality };
    (q.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_percent() {
        assert_eq!(quality_percent(0.9), 90);
        assert_eq!(quality_percent(0.95), 95);
        assert_eq!(quality_percent(1.0), 100);
        assert_eq!(quality_percent(0.0), 1);
        assert_eq!(quality_percent(-3.0), 1);
        assert_eq!(quality_percent(7.0), 100);
        assert_eq!(quality_percent(f32::NAN), 92);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ImageFormat::parse("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::parse("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::parse("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::parse("image/webp"), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_encode_options_defaults() {
        let options = EncodeOptions::default();
        assert_eq!(options.format, ImageFormat::Png);
        assert_eq!(options.jpeg_quality(), 92);
        assert_eq!(EncodeOptions::jpeg(0.5).jpeg_quality(), 50);
    }
}
