//! Geometric transforms: rotation, uniform scale and flips.
//!
//! # Order
//!
//! A render applies, relative to the image center:
//! 1. Flip horizontal / vertical
//! 2. Uniform scale
//! 3. Rotation
//! 4. Color filter chain over the drawn frame
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Origin is top-left corner, y grows downward

mod pipeline;
mod rotation;

pub use pipeline::TransformPipeline;
pub use rotation::{compute_rotated_bounds, InterpolationFilter};
