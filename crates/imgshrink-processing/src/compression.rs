use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat};
use imgshrink_core::{AppError, ImageMime};
use std::io::Cursor;

use crate::traits::SurfaceEncoder;

/// Map a `[0, 1]` quality to the JPEG encoder's 1-100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() {
        quality.clamp(0.0, 1.0)
    } else {
        imgshrink_core::config::DEFAULT_QUALITY
    };
    ((q * 100.0).round() as u8).clamp(1, 100)
}

pub fn to_image_format(mime: ImageMime) -> ImageFormat {
    match mime {
        ImageMime::Png => ImageFormat::Png,
        ImageMime::Jpeg => ImageFormat::Jpeg,
        ImageMime::Gif => ImageFormat::Gif,
    }
}

/// Encoder backed by the `image` crate codecs
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageEncoder;

impl ImageEncoder {
    /// Compress to JPEG. Alpha is discarded.
    fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Bytes, AppError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut buffer = Vec::with_capacity(width as usize * height as usize / 4);
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
        encoder
            .encode(rgb_img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| AppError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    /// Lossless container write (PNG, single-frame GIF)
    fn encode_with_format(img: &DynamicImage, mime: ImageMime) -> Result<Bytes, AppError> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), to_image_format(mime))
            .map_err(|e| AppError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }
}

impl SurfaceEncoder for ImageEncoder {
    fn encode(
        &self,
        surface: &DynamicImage,
        mime: ImageMime,
        quality: f32,
    ) -> Result<Bytes, AppError> {
        let (width, height) = surface.dimensions();
        let data = match mime {
            ImageMime::Jpeg => Self::encode_jpeg(surface, quality)?,
            ImageMime::Png => Self::encode_with_format(surface, mime)?,
            ImageMime::Gif => {
                let rgba = DynamicImage::ImageRgba8(surface.to_rgba8());
                Self::encode_with_format(&rgba, mime)?
            }
        };

        tracing::trace!(
            width,
            height,
            mime = %mime,
            quality,
            bytes = data.len(),
            "Encoded surface"
        );

        Ok(data)
    }
}
