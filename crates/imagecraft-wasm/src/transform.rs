//! WASM bindings for geometry helpers.
//!
//! Lets the editing UI size its preview canvas and map selections without
//! rendering.

use imagecraft_core::geometry::frame_offset;
use imagecraft_core::compute_rotated_bounds;
use wasm_bindgen::prelude::*;

/// Size of the frame needed to hold an image rotated by `angle_degrees`.
///
/// # Returns
///
/// `[width, height]` of the bounding box, never smaller than 1x1 for a
/// non-empty image.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const [w, h] = rotated_bounds(1000, 500, 90); // [500, 1000]
/// ```
#[wasm_bindgen]
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<u32> {
    let (w, h) = compute_rotated_bounds(width, height, angle_degrees);
    vec![w, h]
}

/// Map a display-space rectangle onto a natural-resolution frame.
///
/// Scales each axis by `natural / display` independently, then shifts by the
/// centering offset of the natural image inside a `frame_width x frame_height`
/// frame (pass the natural size to skip the shift).
///
/// # Returns
///
/// `[x, y, width, height]` in frame pixels, or an error if the display size
/// is zero on either axis.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn map_selection(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    display_width: f64,
    display_height: f64,
    natural_width: u32,
    natural_height: u32,
    frame_width: u32,
    frame_height: u32,
) -> Result<Vec<f64>, JsValue> {
    if !(display_width > 0.0 && display_height > 0.0) {
        return Err(JsValue::from_str("Image display size is not known yet"));
    }

    let scale_x = natural_width as f64 / display_width;
    let scale_y = natural_height as f64 / display_height;
    let (dx, dy) = frame_offset((frame_width, frame_height), (natural_width, natural_height));

    Ok(vec![
        x * scale_x + dx,
        y * scale_y + dy,
        width * scale_x,
        height * scale_y,
    ])
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_map_selection_unmeasured_fails() {
        assert!(map_selection(0.0, 0.0, 1.0, 1.0, 0.0, 100.0, 10, 10, 10, 10).is_err());
    }
}
