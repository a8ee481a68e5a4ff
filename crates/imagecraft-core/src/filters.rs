//! Color filter chain.
//!
//! Turns the color part of a [`FilterState`] into a list of named stages and
//! composes them into one affine color matrix, so each pixel is transformed
//! and quantized exactly once. Blur is a spatial stage and runs after the
//! matrix.
//!
//! ## Stage Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturate
//! 4. Grayscale
//! 5. Sepia
//! 6. Hue rotate
//! 7. Blur
//!
//! The matrices are the standard filter-effect ones, so results match what a
//! browser canvas produces for the same filter string (minus the per-stage
//! clamping a browser does between stages).

use crate::FilterState;

/// One named stage of the filter chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    /// Linear multiplier, 1.0 = unchanged.
    Brightness(f32),
    /// Scale around mid-gray, 1.0 = unchanged.
    Contrast(f32),
    /// 1.0 = unchanged, 0.0 = fully desaturated.
    Saturate(f32),
    /// 0.0 = unchanged, 1.0 = fully gray.
    Grayscale(f32),
    /// 0.0 = unchanged, 1.0 = full sepia tone.
    Sepia(f32),
    /// Rotation of the hue angle, in degrees.
    HueRotate(f32),
    /// Gaussian blur radius in pixels.
    Blur(f32),
}

impl FilterStage {
    pub fn name(&self) -> &'static str {
        match self {
            FilterStage::Brightness(_) => "brightness",
            FilterStage::Contrast(_) => "contrast",
            FilterStage::Saturate(_) => "saturate",
            FilterStage::Grayscale(_) => "grayscale",
            FilterStage::Sepia(_) => "sepia",
            FilterStage::HueRotate(_) => "hue-rotate",
            FilterStage::Blur(_) => "blur",
        }
    }

    /// Color matrix for this stage, or `None` for spatial stages.
    pub fn matrix(&self) -> Option<ColorMatrix> {
        let m = match *self {
            FilterStage::Brightness(b) => ColorMatrix::scale(b, 0.0),
            FilterStage::Contrast(c) => ColorMatrix::scale(c, 0.5 - 0.5 * c),
            FilterStage::Saturate(s) => ColorMatrix::saturate(s),
            FilterStage::Grayscale(g) => ColorMatrix::grayscale(g.min(1.0)),
            FilterStage::Sepia(s) => ColorMatrix::sepia(s.min(1.0)),
            FilterStage::HueRotate(deg) => ColorMatrix::hue_rotate(deg),
            FilterStage::Blur(_) => return None,
        };
        Some(m)
    }
}

/// 3x4 affine color matrix over normalized RGB (alpha is untouched).
///
/// Each row is `[r, g, b, offset]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 4]; 3]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]);

    /// Uniform `slope * v + intercept` on every channel.
    fn scale(slope: f32, intercept: f32) -> Self {
        ColorMatrix([
            [slope, 0.0, 0.0, intercept],
            [0.0, slope, 0.0, intercept],
            [0.0, 0.0, slope, intercept],
        ])
    }

    fn saturate(s: f32) -> Self {
        ColorMatrix([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0],
        ])
    }

    fn grayscale(amount: f32) -> Self {
        let a = 1.0 - amount;
        ColorMatrix([
            [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a, 0.0],
            [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a, 0.0],
            [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a, 0.0],
        ])
    }

    fn sepia(amount: f32) -> Self {
        let a = 1.0 - amount;
        ColorMatrix([
            [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a, 0.0],
            [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a, 0.0],
            [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a, 0.0],
        ])
    }

    fn hue_rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        ColorMatrix([
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
                0.0,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
                0.0,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
                0.0,
            ],
        ])
    }

    /// Matrix that applies `self` first, then `next`.
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let a = &next.0;
        let b = &self.0;
        let mut out = [[0.0f32; 4]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for j in 0..3 {
                row[j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
            row[3] = a[i][0] * b[0][3] + a[i][1] * b[1][3] + a[i][2] * b[2][3] + a[i][3];
        }
        ColorMatrix(out)
    }

    #[inline]
    pub fn transform(&self, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
        let m = &self.0;
        (
            m[0][0] * r + m[0][1] * g + m[0][2] * b + m[0][3],
            m[1][0] * r + m[1][1] * g + m[1][2] * b + m[1][3],
            m[2][0] * r + m[2][1] * g + m[2][2] * b + m[2][3],
        )
    }

    pub fn is_identity(&self) -> bool {
        self.0
            .iter()
            .flatten()
            .zip(Self::IDENTITY.0.iter().flatten())
            .all(|(a, b)| (a - b).abs() < 1e-6)
    }
}

/// The ordered filter stages of a [`FilterState`], pre-composed.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
    matrix: ColorMatrix,
    blur: f32,
}

impl FilterChain {
    /// Build the chain for `state`, skipping stages at their neutral value.
    pub fn from_state(state: &FilterState) -> Self {
        let candidates = [
            (state.brightness != 100.0).then(|| FilterStage::Brightness((state.brightness / 100.0) as f32)),
            (state.contrast != 100.0).then(|| FilterStage::Contrast((state.contrast / 100.0) as f32)),
            (state.saturate != 100.0).then(|| FilterStage::Saturate((state.saturate / 100.0) as f32)),
            (state.grayscale > 0.0).then(|| FilterStage::Grayscale((state.grayscale / 100.0) as f32)),
            (state.sepia > 0.0).then(|| FilterStage::Sepia((state.sepia / 100.0) as f32)),
            (state.hue_rotate != 0.0).then(|| FilterStage::HueRotate(state.hue_rotate as f32)),
            (state.blur > 0.0).then(|| FilterStage::Blur(state.blur as f32)),
        ];

        Self::from_stages(candidates.into_iter().flatten().collect())
    }

    /// Compose an explicit list of stages, applied in list order.
    pub fn from_stages(stages: Vec<FilterStage>) -> Self {
        let mut matrix = ColorMatrix::IDENTITY;
        let mut blur = 0.0;
        for stage in &stages {
            match stage.matrix() {
                Some(m) => matrix = matrix.then(&m),
                None => {
                    if let FilterStage::Blur(radius) = stage {
                        blur = radius.max(0.0);
                    }
                }
            }
        }

        Self {
            stages,
            matrix,
            blur,
        }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn matrix(&self) -> &ColorMatrix {
        &self.matrix
    }

    pub fn is_identity(&self) -> bool {
        self.matrix.is_identity() && self.blur <= 0.0
    }

    /// CSS-style filter string, e.g. `brightness(120%) blur(2px)`.
    pub fn to_css(&self) -> String {
        if self.stages.is_empty() {
            return "none".to_string();
        }
        self.stages
            .iter()
            .map(|stage| match stage {
                FilterStage::HueRotate(v) => format!("{}({}deg)", stage.name(), v),
                FilterStage::Blur(v) => format!("{}({}px)", stage.name(), v),
                FilterStage::Brightness(v)
                | FilterStage::Contrast(v)
                | FilterStage::Saturate(v)
                | FilterStage::Grayscale(v)
                | FilterStage::Sepia(v) => format!("{}({}%)", stage.name(), v * 100.0),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Apply the chain to RGBA pixel data in place.
    ///
    /// # Arguments
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    /// * `width`, `height` - Dimensions, needed by the blur stage
    pub fn apply(&self, pixels: &mut [u8], width: u32, height: u32) {
        if !self.matrix.is_identity() {
            for chunk in pixels.chunks_exact_mut(4) {
                let (r, g, b) = self.matrix.transform(
                    chunk[0] as f32 / 255.0,
                    chunk[1] as f32 / 255.0,
                    chunk[2] as f32 / 255.0,
                );
                chunk[0] = quantize(r);
                chunk[1] = quantize(g);
                chunk[2] = quantize(b);
            }
        }

        if self.blur > 0.0 {
            blur_in_place(pixels, width, height, self.blur);
        }
    }
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Gaussian blur over premultiplied color, so transparent neighbours only
/// lower alpha and never darken the color channels.
fn blur_in_place(pixels: &mut [u8], width: u32, height: u32, radius: f32) {
    let mut premultiplied = pixels.to_vec();
    premultiplied.chunks_exact_mut(4).for_each(premultiply);

    let Some(img) = image::RgbaImage::from_raw(width, height, premultiplied) else {
        log::warn!("Skipping blur: buffer does not match {}x{}", width, height);
        return;
    };
    let blurred = image::imageops::blur(&img, radius);

    for (dst, src) in pixels.chunks_exact_mut(4).zip(blurred.as_raw().chunks_exact(4)) {
        dst.copy_from_slice(src);
        unpremultiply(dst);
    }
}

#[inline]
fn premultiply(px: &mut [u8]) {
    let a = px[3] as u32;
    for c in &mut px[..3] {
        *c = ((*c as u32 * a + 127) / 255) as u8;
    }
}

#[inline]
fn unpremultiply(px: &mut [u8]) {
    let a = px[3] as u32;
    if a == 0 {
        px[..3].fill(0);
        return;
    }
    for c in &mut px[..3] {
        *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(pixels: &[u8], state: &FilterState) -> Vec<u8> {
        let mut out = pixels.to_vec();
        let n = (out.len() / 4) as u32;
        FilterChain::from_state(state).apply(&mut out, n, 1);
        out
    }

    #[test]
    fn test_default_state_is_identity() {
        let chain = FilterChain::from_state(&FilterState::default());
        assert!(chain.is_identity());
        assert!(chain.stages().is_empty());
        assert_eq!(chain.to_css(), "none");

        let pixels = vec![12, 34, 56, 78, 200, 100, 50, 255];
        assert_eq!(apply(&pixels, &FilterState::default()), pixels);
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let state = FilterState {
            blur: 2.0,
            hue_rotate: 30.0,
            sepia: 10.0,
            grayscale: 20.0,
            saturate: 50.0,
            contrast: 80.0,
            brightness: 120.0,
            ..Default::default()
        };
        let names: Vec<_> = FilterChain::from_state(&state)
            .stages()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            ["brightness", "contrast", "saturate", "grayscale", "sepia", "hue-rotate", "blur"]
        );
    }

    #[test]
    fn test_brightness_doubles() {
        let state = FilterState {
            brightness: 200.0,
            ..Default::default()
        };
        assert_eq!(apply(&[50, 100, 150, 255], &state), vec![100, 200, 255, 255]);
    }

    #[test]
    fn test_contrast_zero_is_mid_gray() {
        let state = FilterState {
            contrast: 0.0,
            ..Default::default()
        };
        assert_eq!(apply(&[0, 255, 40, 255], &state), vec![128, 128, 128, 255]);
    }

    #[test]
    fn test_grayscale_full_equalizes_channels() {
        let state = FilterState {
            grayscale: 100.0,
            ..Default::default()
        };
        let out = apply(&[200, 50, 10, 255], &state);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_grayscale_amount_is_capped() {
        let full = FilterState {
            grayscale: 100.0,
            ..Default::default()
        };
        let over = FilterState {
            grayscale: 300.0,
            ..Default::default()
        };
        let px = [200, 50, 10, 255];
        assert_eq!(apply(&px, &full), apply(&px, &over));
    }

    #[test]
    fn test_saturate_zero_matches_gray_weights() {
        let state = FilterState {
            saturate: 0.0,
            ..Default::default()
        };
        let out = apply(&[255, 0, 0, 255], &state);
        // 0.213 * 255
        assert_eq!(out[0], 54);
        assert_eq!(out[1], 54);
        assert_eq!(out[2], 54);
    }

    #[test]
    fn test_sepia_white() {
        let state = FilterState {
            sepia: 100.0,
            ..Default::default()
        };
        let out = apply(&[255, 255, 255, 255], &state);
        // Row sums: 1.351, 1.203, 0.937
        assert_eq!(out, vec![255, 255, 239, 255]);
    }

    #[test]
    fn test_hue_rotate_full_turn_is_identity() {
        let state = FilterState {
            hue_rotate: 360.0,
            ..Default::default()
        };
        let px = [200, 80, 30, 255];
        let out = apply(&px, &state);
        for i in 0..3 {
            assert!((out[i] as i32 - px[i] as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_alpha_is_preserved() {
        let state = FilterState {
            brightness: 150.0,
            sepia: 50.0,
            ..Default::default()
        };
        let out = apply(&[10, 20, 30, 77], &state);
        assert_eq!(out[3], 77);
    }

    #[test]
    fn test_composition_order_matters() {
        // Brightness after contrast would give a different result
        let forward = FilterChain::from_stages(vec![FilterStage::Brightness(2.0), FilterStage::Contrast(0.5)]);
        let reverse = FilterChain::from_stages(vec![FilterStage::Contrast(0.5), FilterStage::Brightness(2.0)]);

        let (r, _, _) = forward.matrix().transform(0.2, 0.2, 0.2);
        assert!((r - 0.45).abs() < 1e-5);
        let (r, _, _) = reverse.matrix().transform(0.2, 0.2, 0.2);
        assert!((r - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_blur_smooths_edge() {
        let mut pixels = Vec::new();
        for x in 0..10 {
            let v = if x < 5 { 0 } else { 255 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        let chain = FilterChain::from_stages(vec![FilterStage::Blur(2.0)]);
        chain.apply(&mut pixels, 10, 1);

        let at_edge = pixels[4 * 4];
        assert!(at_edge > 0 && at_edge < 255, "edge value was {}", at_edge);
    }

    #[test]
    fn test_blur_keeps_color_at_alpha_edges() {
        // Opaque red square in the middle of a transparent 12x12 canvas
        let (width, height) = (12u32, 12u32);
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        for y in 4..8 {
            for x in 4..8 {
                let idx = ((y * width + x) * 4) as usize;
                pixels[idx..idx + 4].copy_from_slice(&[255, 0, 0, 255]);
            }
        }

        let chain = FilterChain::from_stages(vec![FilterStage::Blur(2.0)]);
        chain.apply(&mut pixels, width, height);

        let mut softened = 0;
        for px in pixels.chunks_exact(4) {
            if px[3] > 0 {
                assert_eq!(px[0], 255, "dark fringe at alpha {}", px[3]);
                assert_eq!((px[1], px[2]), (0, 0));
            }
            if px[3] > 0 && px[3] < 255 {
                softened += 1;
            }
        }
        assert!(softened > 0, "blur should soften the square's edge");
    }

    #[test]
    fn test_blur_clears_color_where_fully_transparent() {
        let mut px = [90u8, 40, 10, 0];
        unpremultiply(&mut px);
        assert_eq!(px, [0, 0, 0, 0]);

        let mut px = [200u8, 100, 50, 128];
        premultiply(&mut px);
        assert_eq!(px, [100, 50, 25, 128]);
        unpremultiply(&mut px);
        assert!((px[0] as i32 - 200).abs() <= 2);
        assert!((px[1] as i32 - 100).abs() <= 2);
        assert!((px[2] as i32 - 50).abs() <= 2);
    }

    #[test]
    fn test_to_css() {
        let state = FilterState {
            brightness: 120.0,
            hue_rotate: 45.0,
            blur: 3.0,
            ..Default::default()
        };
        assert_eq!(
            FilterChain::from_state(&state).to_css(),
            "brightness(120%) hue-rotate(45deg) blur(3px)"
        );
    }

    #[test]
    fn test_empty_pixels() {
        let chain = FilterChain::from_stages(vec![FilterStage::Sepia(1.0)]);
        let mut pixels: Vec<u8> = vec![];
        chain.apply(&mut pixels, 0, 0);
        assert!(pixels.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn stage_strategy() -> impl Strategy<Value = FilterStage> {
        prop_oneof![
            (0.0f32..=3.0).prop_map(FilterStage::Brightness),
            (0.0f32..=3.0).prop_map(FilterStage::Contrast),
            (0.0f32..=3.0).prop_map(FilterStage::Saturate),
            (0.0f32..=1.0).prop_map(FilterStage::Grayscale),
            (0.0f32..=1.0).prop_map(FilterStage::Sepia),
            (-360.0f32..=360.0).prop_map(FilterStage::HueRotate),
        ]
    }

    proptest! {
        /// Property: the composed matrix equals applying each stage in turn
        /// (without intermediate clamping).
        #[test]
        fn prop_composed_matches_sequential(
            stages in prop::collection::vec(stage_strategy(), 1..6),
            (r, g, b) in (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0),
        ) {
            let chain = FilterChain::from_stages(stages.clone());
            let composed = chain.matrix().transform(r, g, b);

            let mut seq = (r, g, b);
            for stage in &stages {
                let m = stage.matrix().unwrap();
                seq = m.transform(seq.0, seq.1, seq.2);
            }

            prop_assert!((composed.0 - seq.0).abs() < 1e-3);
            prop_assert!((composed.1 - seq.1).abs() < 1e-3);
            prop_assert!((composed.2 - seq.2).abs() < 1e-3);
        }

        /// Property: alpha never changes.
        #[test]
        fn prop_alpha_untouched(
            stages in prop::collection::vec(stage_strategy(), 0..6),
            pixels in prop::collection::vec(any::<u8>(), 4..=64),
        ) {
            let len = pixels.len() / 4 * 4;
            let mut data = pixels[..len].to_vec();
            let before: Vec<u8> = data.iter().skip(3).step_by(4).copied().collect();

            FilterChain::from_stages(stages).apply(&mut data, (len / 4) as u32, 1);

            let after: Vec<u8> = data.iter().skip(3).step_by(4).copied().collect();
            prop_assert_eq!(before, after);
        }
    }
}
