//! Image geometry module
//!
//! - Target size resolution and resampling (resize)
//! - Orientation codes and the combined resize + orient transform (orientation)

pub mod orientation;
pub mod resize;

pub use orientation::{ImageOrientation, Orientation};
pub use resize::{Geometry, ImageResize};
