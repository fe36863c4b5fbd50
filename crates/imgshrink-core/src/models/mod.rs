//! Domain models

pub mod mime;

pub use mime::{is_image_mime, ImageMime};
