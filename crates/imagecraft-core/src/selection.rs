//! Selection-bound operations: crop, fill and border.
//!
//! Each operation takes a rectangle already mapped onto the target surface's
//! pixel grid (see [`crate::geometry::to_frame`]). Fill and border treat a
//! missing or degenerate rectangle as "the whole surface"; crop refuses it.

use crate::error::{PipelineError, Result};
use crate::geometry::NaturalRect;
use crate::surface::{Color, Surface};

/// Fill color used when the caller does not pick one.
pub const DEFAULT_FILL: Color = Color::WHITE;

/// Border color used when the caller does not pick one.
pub const DEFAULT_BORDER: Color = Color::BLACK;

/// Border line width in pixels used when the caller does not pick one.
pub const DEFAULT_BORDER_WIDTH: f64 = 5.0;

/// Copy the region under `rect` into a new surface.
///
/// The output is `round(width) x round(height)`. Parts of the rectangle that
/// fall outside `surface` stay transparent.
///
/// # Errors
///
/// Returns `PipelineError::NoSelection` if the rectangle has no area after
/// rounding to whole pixels.
pub fn crop<S: Surface>(surface: &S, rect: &NaturalRect) -> Result<S> {
    if rect.is_degenerate() {
        return Err(PipelineError::NoSelection);
    }

    let region = rect.to_pixel_rect();
    if region.is_empty() {
        return Err(PipelineError::NoSelection);
    }

    log::debug!(
        "Crop {}x{} at ({}, {}) from {}x{}",
        region.width,
        region.height,
        region.x,
        region.y,
        surface.width(),
        surface.height()
    );

    let mut output = S::blank(region.width, region.height);
    output.draw_region(surface, region, 0, 0);
    Ok(output)
}

/// Overwrite `rect` (or the whole surface) with an opaque color.
pub fn fill<S: Surface>(surface: &mut S, rect: Option<&NaturalRect>, color: Color) {
    let target = target_rect(surface, rect);
    surface.fill_rect(&target, color);
}

/// Draw an outline of `line_width` that stays inside `rect` (or the whole surface).
///
/// The stroke is centered on a rectangle inset by half the line width, so
/// its outer edge lines up with the selection edge.
pub fn border<S: Surface>(surface: &mut S, rect: Option<&NaturalRect>, color: Color, line_width: f64) {
    if !(line_width > 0.0) {
        return;
    }

    let target = target_rect(surface, rect);
    let half = line_width / 2.0;
    let inset = NaturalRect::new(
        target.x + half,
        target.y + half,
        target.width - line_width,
        target.height - line_width,
    );
    surface.stroke_rect(&inset, color, line_width);
}

fn target_rect<S: Surface>(surface: &S, rect: Option<&NaturalRect>) -> NaturalRect {
    match rect {
        Some(rect) if !rect.is_degenerate() => *rect,
        _ => NaturalRect::full(surface.width(), surface.height()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;

    fn numbered(width: u32, height: u32) -> RasterSurface {
        let pixels = (0..width * height)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        RasterSurface::new(width, height, pixels)
    }

    fn count(surface: &RasterSurface, color: Color) -> usize {
        surface
            .pixels
            .chunks_exact(4)
            .filter(|p| *p == color.to_array())
            .count()
    }

    #[test]
    fn test_crop_copies_region() {
        let src = numbered(10, 10);
        let out = crop(&src, &NaturalRect::new(2.0, 3.0, 4.0, 5.0)).unwrap();

        assert_eq!(out.dimensions(), (4, 5));
        assert_eq!(out.pixel(0, 0), src.pixel(2, 3));
        assert_eq!(out.pixel(3, 4), src.pixel(5, 7));
    }

    #[test]
    fn test_crop_rounds_size() {
        let src = numbered(20, 20);
        let out = crop(&src, &NaturalRect::new(1.2, 1.7, 5.5, 4.4)).unwrap();
        assert_eq!(out.dimensions(), (6, 4));
        assert_eq!(out.pixel(0, 0), src.pixel(1, 2));
    }

    #[test]
    fn test_crop_without_selection() {
        let src = numbered(10, 10);
        for rect in [
            NaturalRect::new(0.0, 0.0, 0.0, 5.0),
            NaturalRect::new(0.0, 0.0, 5.0, 0.0),
            NaturalRect::new(0.0, 0.0, -3.0, 5.0),
            NaturalRect::new(0.0, 0.0, 0.4, 0.4),
        ] {
            assert!(matches!(crop(&src, &rect), Err(PipelineError::NoSelection)), "{:?}", rect);
        }
    }

    #[test]
    fn test_crop_outside_is_transparent() {
        let src = RasterSurface::filled(4, 4, Color::rgb(9, 9, 9));
        let out = crop(&src, &NaturalRect::new(2.0, 2.0, 4.0, 4.0)).unwrap();

        assert_eq!(out.pixel(0, 0), Some([9, 9, 9, 255]));
        assert_eq!(out.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_recrop_with_offset_rect_is_noop() {
        let src = numbered(30, 20);
        let first = crop(&src, &NaturalRect::new(5.0, 4.0, 12.0, 9.0)).unwrap();
        let again = crop(&first, &NaturalRect::full(first.width, first.height)).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_fill_rect() {
        let mut surface = RasterSurface::transparent(10, 10);
        fill(&mut surface, Some(&NaturalRect::new(2.0, 2.0, 3.0, 4.0)), Color::rgb(255, 0, 0));
        assert_eq!(count(&surface, Color::rgb(255, 0, 0)), 12);
        assert_eq!(surface.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_without_selection_covers_surface() {
        let mut surface = numbered(6, 4);
        fill(&mut surface, None, DEFAULT_FILL);
        assert_eq!(count(&surface, Color::WHITE), 24);

        let mut surface = numbered(6, 4);
        fill(&mut surface, Some(&NaturalRect::new(1.0, 1.0, 0.0, 2.0)), DEFAULT_FILL);
        assert_eq!(count(&surface, Color::WHITE), 24);
    }

    #[test]
    fn test_border_full_canvas_stays_inside() {
        let mut surface = RasterSurface::transparent(20, 10);
        border(&mut surface, None, DEFAULT_BORDER, DEFAULT_BORDER_WIDTH);

        // Line is thicker than half the short side, so the ring closes
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(19, 9), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(4, 4), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 5), Some([0, 0, 0, 255]));

        let mut wide = RasterSurface::transparent(30, 30);
        border(&mut wide, None, Color::BLACK, 4.0);
        assert_eq!(wide.pixel(3, 15), Some([0, 0, 0, 255]));
        assert_eq!(wide.pixel(4, 15), Some([0, 0, 0, 0]));
        assert_eq!(wide.pixel(26, 15), Some([0, 0, 0, 255]));
        assert_eq!(wide.pixel(25, 15), Some([0, 0, 0, 0]));
        // Ring area: 30*30 - 22*22
        assert_eq!(count(&wide, Color::BLACK), 900 - 484);
    }

    #[test]
    fn test_border_on_selection() {
        let mut surface = RasterSurface::transparent(20, 20);
        border(&mut surface, Some(&NaturalRect::new(5.0, 5.0, 10.0, 10.0)), Color::BLACK, 2.0);

        assert_eq!(surface.pixel(4, 10), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(5, 10), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(6, 10), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(7, 10), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(14, 10), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(15, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_border_zero_width_is_noop() {
        let mut surface = RasterSurface::transparent(8, 8);
        border(&mut surface, None, Color::BLACK, 0.0);
        assert_eq!(surface, RasterSurface::transparent(8, 8));
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
        (1u32..=60, 1u32..=60)
    }

    proptest! {
        /// Property: crop output is exactly the rounded selection size.
        #[test]
        fn prop_crop_size_is_rounded(
            (width, height) in dimensions_strategy(),
            (x, y) in (0.0f64..=40.0, 0.0f64..=40.0),
            (w, h) in (0.5f64..=50.0, 0.5f64..=50.0),
        ) {
            let src = RasterSurface::filled(width, height, Color::rgb(1, 2, 3));
            let out = crop(&src, &NaturalRect::new(x, y, w, h)).unwrap();
            prop_assert_eq!(out.dimensions(), (w.round() as u32, h.round() as u32));
        }

        /// Property: a border over the full canvas never paints outside a
        /// `line_width` band along the edges.
        #[test]
        fn prop_full_canvas_border_stays_in_band(
            (width, height) in dimensions_strategy(),
            line_width in 1u32..=8,
        ) {
            let mut surface = RasterSurface::transparent(width, height);
            border(&mut surface, None, Color::BLACK, line_width as f64);

            for y in 0..height {
                for x in 0..width {
                    let edge = x.min(y).min(width - 1 - x).min(height - 1 - y);
                    let painted = surface.pixel(x, y) == Some([0, 0, 0, 255]);
                    prop_assert_eq!(painted, edge < line_width, "pixel ({}, {})", x, y);
                }
            }
        }
    }
}
