//! Rendering a source through a [`FilterState`] onto a new surface.
//!
//! # Algorithm
//!
//! The output frame is the rotated bounding box of the source. Its content is
//! the source placed by the forward transform
//!
//! ```text
//! p_dst = C_dst + R(θ) · s · F · (p_src - C_src)
//! ```
//!
//! where `C` are the centers, `R(θ)` rotates clockwise on screen (y grows
//! down), `s` is the uniform scale and `F = diag(±1, ±1)` holds the flips. The
//! frame is filled by inverse mapping each output pixel center back into the
//! source.
//!
//! The filter chain is configured first and runs over a copy of the source,
//! so only the image itself is adjusted. The transparent margin that
//! rotation or a scale below 1 leaves in the frame is never filtered, and
//! blur cannot spread the image into it.

use crate::error::{PipelineError, Result};
use crate::filters::FilterChain;
use crate::surface::Surface;
use crate::FilterState;

use super::rotation::{compute_rotated_bounds, InterpolationFilter, Sampler};

/// Applies filters and geometry to produce a new surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformPipeline {
    interpolation: InterpolationFilter,
}

impl TransformPipeline {
    pub fn new(interpolation: InterpolationFilter) -> Self {
        Self { interpolation }
    }

    /// Pipeline tuned for interactive rendering.
    pub fn preview() -> Self {
        Self::new(InterpolationFilter::Bilinear)
    }

    /// Pipeline tuned for final output.
    pub fn export() -> Self {
        Self::new(InterpolationFilter::Lanczos3)
    }

    pub fn interpolation(&self) -> InterpolationFilter {
        self.interpolation
    }

    /// Size of the frame [`apply`](Self::apply) allocates for a `width x height` source.
    ///
    /// Only rotation affects the frame; scale and flips are drawn inside it.
    pub fn frame_size(&self, width: u32, height: u32, filters: &FilterState) -> (u32, u32) {
        compute_rotated_bounds(width, height, filters.rotate)
    }

    /// Render `source` with `filters`.
    ///
    /// # Arguments
    ///
    /// * `source` - Natural-resolution image
    /// * `filters` - Snapshot of the adjustments; never modified
    ///
    /// # Returns
    ///
    /// A new surface of [`frame_size`](Self::frame_size) holding the result.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::EmptySource` if the source has zero width or height.
    pub fn apply<I: Surface, O: Surface>(&self, source: &I, filters: &FilterState) -> Result<O> {
        if source.is_empty() {
            return Err(PipelineError::EmptySource);
        }

        let (src_w, src_h) = source.dimensions();
        let (dst_w, dst_h) = self.frame_size(src_w, src_h, filters);
        log::debug!(
            "Transform {}x{} -> {}x{} (rotate {}, scale {}, flip {}/{})",
            src_w,
            src_h,
            dst_w,
            dst_h,
            filters.rotate,
            filters.effective_scale(),
            filters.flip_horizontal,
            filters.flip_vertical
        );

        let chain = FilterChain::from_state(filters);
        let filtered: O;
        let pixels = if chain.is_identity() {
            source.pixels()
        } else {
            let mut copy = O::blank(src_w, src_h);
            copy.pixels_mut().copy_from_slice(source.pixels());
            copy.apply_filter_chain(&chain);
            filtered = copy;
            filtered.pixels()
        };

        let mut output = O::blank(dst_w, dst_h);
        if filters.is_geometry_identity() {
            output.pixels_mut().copy_from_slice(pixels);
        } else {
            self.draw_transformed(pixels, (src_w, src_h), &mut output, filters);
        }

        Ok(output)
    }

    fn draw_transformed<O: Surface>(
        &self,
        pixels: &[u8],
        (src_w, src_h): (u32, u32),
        output: &mut O,
        filters: &FilterState,
    ) {
        let (dst_w, dst_h) = output.dimensions();
        let sampler = Sampler::new(pixels, src_w, src_h);

        let (sin, cos) = filters.rotate.to_radians().sin_cos();
        let inv_scale = 1.0 / filters.effective_scale();
        let flip_x = if filters.flip_horizontal { -1.0 } else { 1.0 };
        let flip_y = if filters.flip_vertical { -1.0 } else { 1.0 };

        let (src_cx, src_cy) = (src_w as f64 / 2.0, src_h as f64 / 2.0);
        let (dst_cx, dst_cy) = (dst_w as f64 / 2.0, dst_h as f64 / 2.0);

        let row_len = dst_w as usize * 4;
        for (dst_y, row) in output.pixels_mut().chunks_exact_mut(row_len).enumerate() {
            let dy = dst_y as f64 + 0.5 - dst_cy;
            for (dst_x, px) in row.chunks_exact_mut(4).enumerate() {
                let dx = dst_x as f64 + 0.5 - dst_cx;

                // Undo rotation, then scale, then flips
                let rx = dx * cos + dy * sin;
                let ry = -dx * sin + dy * cos;
                let src_x = rx * inv_scale * flip_x + src_cx;
                let src_y = ry * inv_scale * flip_y + src_cy;

                px.copy_from_slice(&sampler.sample(src_x, src_y, self.interpolation));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Color, RasterSurface};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// 2x2 image: red green / blue white.
    fn quad() -> RasterSurface {
        RasterSurface::new(2, 2, [RED, GREEN, BLUE, WHITE].concat())
    }

    fn render(source: &RasterSurface, filters: &FilterState) -> RasterSurface {
        TransformPipeline::preview().apply(source, filters).unwrap()
    }

    #[test]
    fn test_identity_copies_source() {
        let source = quad();
        assert_eq!(render(&source, &FilterState::default()), source);
    }

    #[test]
    fn test_rotate_90_frame_size() {
        let source = RasterSurface::transparent(1000, 500);
        let filters = FilterState {
            rotate: 90.0,
            ..Default::default()
        };
        let out: RasterSurface = TransformPipeline::preview().apply(&source, &filters).unwrap();
        assert_eq!((out.width, out.height), (500, 1000));
    }

    #[test]
    fn test_rotate_90_is_clockwise() {
        let filters = FilterState {
            rotate: 90.0,
            ..Default::default()
        };
        let out = render(&quad(), &filters);

        // Left column (red, blue) becomes the top row, read right to left
        assert_eq!(out.pixel(0, 0), Some(BLUE));
        assert_eq!(out.pixel(1, 0), Some(RED));
        assert_eq!(out.pixel(0, 1), Some(WHITE));
        assert_eq!(out.pixel(1, 1), Some(GREEN));
    }

    #[test]
    fn test_rotate_180() {
        let filters = FilterState {
            rotate: 180.0,
            ..Default::default()
        };
        let out = render(&quad(), &filters);
        assert_eq!(out.pixels, [WHITE, BLUE, GREEN, RED].concat());
    }

    #[test]
    fn test_flip_horizontal() {
        let filters = FilterState {
            flip_horizontal: true,
            ..Default::default()
        };
        let out = render(&quad(), &filters);
        assert_eq!(out.pixels, [GREEN, RED, WHITE, BLUE].concat());
    }

    #[test]
    fn test_flip_vertical() {
        let filters = FilterState {
            flip_vertical: true,
            ..Default::default()
        };
        let out = render(&quad(), &filters);
        assert_eq!(out.pixels, [BLUE, WHITE, RED, GREEN].concat());
    }

    #[test]
    fn test_flip_applied_before_rotation() {
        // Flip then rotate 90 clockwise
        let filters = FilterState {
            rotate: 90.0,
            flip_horizontal: true,
            ..Default::default()
        };
        let out = render(&quad(), &filters);
        // Flipped: green red / white blue; rotated: white green / blue red
        assert_eq!(out.pixels, [WHITE, GREEN, BLUE, RED].concat());
    }

    #[test]
    fn test_scale_down_leaves_transparent_margin() {
        let source = RasterSurface::filled(10, 10, Color::rgb(255, 0, 0));
        let filters = FilterState {
            scale: 0.5,
            ..Default::default()
        };
        let out = render(&source, &filters);

        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(5, 5), Some(RED));
        assert_eq!(out.pixel(9, 9), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_scale_below_minimum_is_clamped() {
        let source = RasterSurface::filled(100, 100, Color::rgb(255, 0, 0));
        let tiny = FilterState {
            scale: 0.001,
            ..Default::default()
        };
        let min = FilterState {
            scale: 0.1,
            ..Default::default()
        };
        assert_eq!(render(&source, &tiny), render(&source, &min));
    }

    #[test]
    fn test_rotation_keeps_corners() {
        let source = RasterSurface::filled(40, 20, Color::rgb(0, 0, 255));
        let filters = FilterState {
            rotate: 30.0,
            ..Default::default()
        };
        let out = render(&source, &filters);

        let expected = compute_rotated_bounds(40, 20, 30.0);
        assert_eq!(out.dimensions(), expected);
        // Center is covered, frame corners are empty
        assert_eq!(out.pixel(out.width / 2, out.height / 2), Some(BLUE));
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_filters_apply_to_drawn_pixels() {
        let source = RasterSurface::filled(4, 4, Color::rgb(100, 100, 100));
        let filters = FilterState {
            brightness: 200.0,
            rotate: 180.0,
            ..Default::default()
        };
        let out = render(&source, &filters);
        assert_eq!(out.pixel(1, 1), Some([200, 200, 200, 255]));
    }

    #[test]
    fn test_blur_stays_inside_scaled_image() {
        let source = RasterSurface::filled(20, 20, Color::rgb(255, 0, 0));
        let filters = FilterState {
            scale: 0.5,
            blur: 2.0,
            ..Default::default()
        };
        let out = render(&source, &filters);

        // Drawn square covers 5..15 on both axes
        assert_eq!(out.pixel(3, 10), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(10, 3), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
        let center = out.pixel(10, 10).unwrap();
        assert_eq!(center[0], 255);
        assert!(center[3] >= 250);
    }

    #[test]
    fn test_rotated_blur_keeps_edge_color() {
        let source = RasterSurface::filled(40, 40, Color::rgb(255, 0, 0));
        let filters = FilterState {
            rotate: 45.0,
            blur: 3.0,
            ..Default::default()
        };
        let out = render(&source, &filters);

        let min_red = out
            .pixels
            .chunks_exact(4)
            .filter(|px| px[3] > 20)
            .map(|px| px[0])
            .min()
            .unwrap();
        assert!(min_red >= 250, "red channel dropped to {}", min_red);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_source() {
        let source = RasterSurface::transparent(0, 10);
        let result: Result<RasterSurface> = TransformPipeline::preview().apply(&source, &FilterState::default());
        assert!(matches!(result, Err(PipelineError::EmptySource)));
    }

    #[test]
    fn test_export_pipeline_matches_preview_on_right_angles() {
        let source = quad();
        let filters = FilterState {
            rotate: 270.0,
            ..Default::default()
        };
        let preview: RasterSurface = TransformPipeline::preview().apply(&source, &filters).unwrap();
        let export: RasterSurface = TransformPipeline::export().apply(&source, &filters).unwrap();
        assert_eq!(preview, export);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::surface::RasterSurface;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=24, 1u32..=24)
    }

    fn numbered(width: u32, height: u32) -> RasterSurface {
        let pixels = (0..width * height)
            .flat_map(|i| [(i % 251) as u8, (i / 251) as u8, 7, 255])
            .collect();
        RasterSurface::new(width, height, pixels)
    }

    proptest! {
        /// Property: right-angle rotations move pixels without resampling,
        /// so the frame holds exactly the source's pixels.
        #[test]
        fn prop_right_angle_rotation_permutes_pixels(
            (width, height) in dimensions_strategy(),
            quarter in 0i32..4,
        ) {
            let source = numbered(width, height);
            let filters = FilterState {
                rotate: quarter as f64 * 90.0,
                ..Default::default()
            };
            let out: RasterSurface = TransformPipeline::preview().apply(&source, &filters).unwrap();

            prop_assert_eq!(out.pixels.len(), source.pixels.len());
            let mut a: Vec<_> = source.pixels.chunks_exact(4).map(|p| p.to_vec()).collect();
            let mut b: Vec<_> = out.pixels.chunks_exact(4).map(|p| p.to_vec()).collect();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }

        /// Property: flipping twice along the same axis is the identity.
        #[test]
        fn prop_double_flip_is_identity(
            (width, height) in dimensions_strategy(),
        ) {
            let source = numbered(width, height);
            let flip = FilterState {
                flip_horizontal: true,
                flip_vertical: true,
                ..Default::default()
            };
            let once: RasterSurface = TransformPipeline::preview().apply(&source, &flip).unwrap();
            let twice: RasterSurface = TransformPipeline::preview().apply(&once, &flip).unwrap();
            prop_assert_eq!(twice, source);
        }
    }
}
