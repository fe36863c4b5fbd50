//! imgshrink Image Processing Library
//!
//! Compresses raster images to a byte budget or a target geometry, with
//! orientation normalization for the eight EXIF-style orientation codes.

pub mod compress;
pub mod compression;
pub mod image;
pub mod input;
pub mod search;
pub mod traits;

// Re-export commonly used types
pub use compress::{compress, compress_with, CompressConfig, CompressTransformer, CompressedImage};
pub use compression::ImageEncoder;
pub use crate::image::{Geometry, ImageOrientation, ImageResize, Orientation};
pub use input::{format_data_url, parse_data_url, ImageDecoder, ImageInput, SourceImage};
pub use search::{SearchOutcome, SearchParams, SizeTargetSearch};
pub use traits::{MediaTransformer, SurfaceEncoder, TransformType};
