//! Core traits for image processing
//!
//! `SurfaceEncoder` is the seam between the compression search and the
//! codec; `MediaTransformer` is the async entry point for callers running on
//! a runtime.

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use imgshrink_core::{AppError, ImageMime};

use crate::compress::CompressedImage;
use crate::input::{format_data_url, ImageInput};

/// Transform type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformType {
    ImageResize,
    ImageScale,
    ImageRotate,
    ImageFlip,
    ImageFormatConvert,
    ImageTargetSize,
}

/// Encodes a rendered surface into a byte buffer of the requested type
pub trait SurfaceEncoder: Send + Sync {
    /// Encode `surface` as `mime`. `quality` is in `[0, 1]` and ignored by lossless types.
    fn encode(&self, surface: &DynamicImage, mime: ImageMime, quality: f32)
        -> Result<Bytes, AppError>;

    /// Encode to the textual `data:<mime>;base64,...` representation
    fn encode_data_url(
        &self,
        surface: &DynamicImage,
        mime: ImageMime,
        quality: f32,
    ) -> Result<String, AppError> {
        let data = self.encode(surface, mime, quality)?;
        Ok(format_data_url(&data, mime.as_str()))
    }
}

/// Media transformer trait - handles transformations
#[async_trait]
pub trait MediaTransformer: Send + Sync {
    type Options: Send + Sync;

    /// Apply transformation to an input image
    async fn transform(
        &self,
        input: ImageInput,
        options: Self::Options,
    ) -> Result<CompressedImage, AppError>;

    /// List supported transform types
    fn supported_transforms(&self) -> Vec<TransformType>;
}
