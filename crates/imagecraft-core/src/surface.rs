//! Pixel surfaces and the drawing primitives the pipeline is built on.
//!
//! Every stage of the pipeline reads from one surface and writes into another
//! through the [`Surface`] trait, so the stages do not depend on any particular
//! graphics backend. [`RasterSurface`] is the software implementation used by
//! default: a plain RGBA buffer in row-major order.
//!
//! # Drawing Semantics
//!
//! - Rectangles with fractional edges are snapped to the pixel grid by rounding
//! - [`Surface::fill_rect`] and [`Surface::stroke_rect`] overwrite pixels (no blending)
//! - [`Surface::draw_region`] composites with source-over, so drawing onto a
//!   fresh transparent surface is an exact copy
//! - Anything outside the destination bounds is clipped

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::encode::{encode_surface, EncodeError, EncodeOptions};
use crate::filters::FilterChain;
use crate::geometry::{NaturalRect, PixelRect};

/// Bytes per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS hex color: `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// Returns `None` for anything else.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        match hex.len() {
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// An owned, mutable RGBA pixel buffer with drawing primitives.
///
/// Implementors only provide storage; the drawing operations have software
/// defaults written against [`Surface::pixels`] and [`Surface::pixels_mut`].
/// A hardware-backed implementation can override any of them.
pub trait Surface: Sized {
    /// Allocate a fully transparent surface.
    fn blank(width: u32, height: u32) -> Self;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// RGBA pixel data, row-major, `width * height * 4` bytes.
    fn pixels(&self) -> &[u8];

    fn pixels_mut(&mut self) -> &mut [u8];

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Check if the surface has zero width or height.
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Replace all pixel data.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidPixelData` if `pixels` does not hold
    /// exactly `width * height * 4` bytes.
    fn set_pixels(&mut self, pixels: &[u8]) -> Result<(), EncodeError> {
        let expected = self.width() as usize * self.height() as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(EncodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        self.pixels_mut().copy_from_slice(pixels);
        Ok(())
    }

    /// Read one pixel, or `None` outside the surface.
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = (y as usize * self.width() as usize + x as usize) * CHANNELS;
        let p = &self.pixels()[idx..idx + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Copy `src_rect` of `src` to `(dst_x, dst_y)` without scaling.
    ///
    /// Source pixels outside `src` are skipped, leaving the destination as is.
    fn draw_region<S: Surface>(&mut self, src: &S, src_rect: PixelRect, dst_x: i64, dst_y: i64) {
        let (src_w, src_h) = (src.width() as i64, src.height() as i64);
        let (dst_w, dst_h) = (self.width() as i64, self.height() as i64);
        let src_pixels = src.pixels();

        for row in 0..src_rect.height as i64 {
            let sy = src_rect.y + row;
            let dy = dst_y + row;
            if sy < 0 || sy >= src_h || dy < 0 || dy >= dst_h {
                continue;
            }
            for col in 0..src_rect.width as i64 {
                let sx = src_rect.x + col;
                let dx = dst_x + col;
                if sx < 0 || sx >= src_w || dx < 0 || dx >= dst_w {
                    continue;
                }

                let s_idx = ((sy * src_w + sx) as usize) * CHANNELS;
                let d_idx = ((dy * dst_w + dx) as usize) * CHANNELS;
                let src_px = [
                    src_pixels[s_idx],
                    src_pixels[s_idx + 1],
                    src_pixels[s_idx + 2],
                    src_pixels[s_idx + 3],
                ];
                let dst = &mut self.pixels_mut()[d_idx..d_idx + CHANNELS];
                blend_over(dst, src_px);
            }
        }
    }

    /// Draw all of `src` resampled into `dst_rect`.
    fn draw_scaled<S: Surface>(&mut self, src: &S, dst_rect: PixelRect, filter: FilterType) {
        if dst_rect.is_empty() || src.is_empty() {
            return;
        }

        let full = PixelRect::new(0, 0, dst_rect.width, dst_rect.height);
        if src.dimensions() == (dst_rect.width, dst_rect.height) {
            self.draw_region(src, full, dst_rect.x, dst_rect.y);
            return;
        }

        match crate::resize::resample(src, dst_rect.width, dst_rect.height, filter) {
            Ok(scaled) => self.draw_region(&scaled, full, dst_rect.x, dst_rect.y),
            Err(e) => log::warn!("Skipping draw of {}x{} region: {}", dst_rect.width, dst_rect.height, e),
        }
    }

    /// Overwrite `rect` with a flat color.
    fn fill_rect(&mut self, rect: &NaturalRect, color: Color) {
        let rect = normalize(*rect);
        let (x0, x1) = span(rect.x, rect.right(), self.width());
        let (y0, y1) = span(rect.y, rect.bottom(), self.height());
        let width = self.width();
        fill_block(self.pixels_mut(), width, (x0, x1), (y0, y1), color);
    }

    /// Stroke the outline of `rect` with a line of `line_width` centered on its edges.
    ///
    /// The stroke reaches `line_width / 2` outside and inside the rectangle.
    fn stroke_rect(&mut self, rect: &NaturalRect, color: Color, line_width: f64) {
        if !(line_width > 0.0) {
            return;
        }

        let rect = normalize(*rect);
        let half = line_width / 2.0;
        let outer = rect.expand(half);
        let inner = rect.expand(-half);

        let (ow, oh) = (self.width(), self.height());
        let (ox0, ox1) = span(outer.x, outer.right(), ow);
        let (oy0, oy1) = span(outer.y, outer.bottom(), oh);
        let width = self.width();
        let pixels = self.pixels_mut();

        if inner.is_degenerate() {
            fill_block(pixels, width, (ox0, ox1), (oy0, oy1), color);
            return;
        }

        let (ix0, ix1) = span(inner.x, inner.right(), ow);
        let (iy0, iy1) = span(inner.y, inner.bottom(), oh);
        let (ix0, ix1) = (ix0.clamp(ox0, ox1), ix1.clamp(ox0, ox1));
        let (iy0, iy1) = (iy0.clamp(oy0, oy1), iy1.clamp(oy0, oy1));

        // Top and bottom bands span the full outer width
        fill_block(pixels, width, (ox0, ox1), (oy0, iy0), color);
        fill_block(pixels, width, (ox0, ox1), (iy1, oy1), color);
        // Left and right bands fill between them
        fill_block(pixels, width, (ox0, ix0), (iy0, iy1), color);
        fill_block(pixels, width, (ix1, ox1), (iy0, iy1), color);
    }

    /// Run the composed adjustment chain over every pixel.
    fn apply_filter_chain(&mut self, chain: &FilterChain) {
        let (width, height) = self.dimensions();
        chain.apply(self.pixels_mut(), width, height);
    }

    /// Encode the surface to image bytes.
    fn encode(&self, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        encode_surface(self, options)
    }
}

/// Composite `src` over `dst` in place (non-premultiplied source-over).
#[inline]
fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3];
    if sa == 255 || dst[3] == 0 {
        dst.copy_from_slice(&src);
        return;
    }
    if sa == 0 {
        return;
    }

    let sa = sa as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Snap `[start, end)` to a clamped pixel range on an axis of length `limit`.
#[inline]
fn span(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let lo = start.round().clamp(0.0, limit as f64) as u32;
    let hi = end.round().clamp(0.0, limit as f64) as u32;
    (lo, hi.max(lo))
}

/// Flip negative widths/heights so the rectangle grows right and down.
fn normalize(rect: NaturalRect) -> NaturalRect {
    let mut rect = rect;
    if rect.width < 0.0 {
        rect.x += rect.width;
        rect.width = -rect.width;
    }
    if rect.height < 0.0 {
        rect.y += rect.height;
        rect.height = -rect.height;
    }
    rect
}

fn fill_block(pixels: &mut [u8], width: u32, xs: (u32, u32), ys: (u32, u32), color: Color) {
    if xs.0 >= xs.1 || ys.0 >= ys.1 {
        return;
    }
    let rgba = color.to_array();
    for y in ys.0..ys.1 {
        let row = y as usize * width as usize;
        let start = (row + xs.0 as usize) * CHANNELS;
        let end = (row + xs.1 as usize) * CHANNELS;
        for px in pixels[start..end].chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
    }
}

/// Software RGBA surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RasterSurface {
    /// Create a surface from existing RGBA pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a fully transparent surface.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0u8; width as usize * height as usize * CHANNELS])
    }

    /// Create a surface filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let pixels = color.to_array().repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        Self::from_rgba_image(img.into_rgba8())
    }

    /// Convert to an `image::RgbaImage` for use with `image::imageops`.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

impl Surface for RasterSurface {
    fn blank(width: u32, height: u32) -> Self {
        Self::transparent(width, height)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}
