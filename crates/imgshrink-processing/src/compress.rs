//! Compression entry point
//!
//! Validates and decodes the input, then either encodes once at the requested
//! geometry or runs the size search. The result is never larger than the
//! input: when encoding does not help, the original bytes are returned.

use async_trait::async_trait;
use bytes::Bytes;
use image::GenericImageView;
use imgshrink_core::config::{DEFAULT_MIN_WIDTH, DEFAULT_QUALITY};
use imgshrink_core::{is_image_mime, AppError, CompressionDefaults, ImageMime};
use serde::{Deserialize, Serialize};

use crate::compression::ImageEncoder;
use crate::image::{Geometry, ImageOrientation, Orientation};
use crate::input::{format_data_url, ImageDecoder, ImageInput, SourceImage};
use crate::search::{SearchParams, SizeTargetSearch};
use crate::traits::{MediaTransformer, SurfaceEncoder, TransformType};

/// Per-call compression options. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompressConfig {
    /// Encoder quality in `[0, 1]` (default 0.9)
    pub quality: Option<f32>,
    /// Output MIME; falls back to the source type when absent or not `image/*`
    #[serde(rename = "type")]
    pub mime: Option<String>,
    /// Byte budget in kilobytes
    pub size: Option<f64>,
    /// Smallest width the size search tries (default 200)
    pub min_width: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<f64>,
    /// Orientation code 1-8
    pub orientation: Option<i64>,
}

impl CompressConfig {
    /// Fill unset options from process defaults
    pub fn with_defaults(mut self, defaults: &CompressionDefaults) -> Self {
        self.quality = self.quality.or(Some(defaults.quality));
        self.min_width = self.min_width.or(Some(defaults.min_width));
        if self.mime.is_none() {
            self.mime = defaults.mime.clone();
        }
        self
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.width,
            height: self.height,
            scale: self.scale,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
            .map(Orientation::from_code)
            .unwrap_or_default()
    }

    /// Quality in `[0, 1]`; anything else uses the default
    pub fn effective_quality(&self) -> f32 {
        match self.quality {
            Some(q) if q.is_finite() && (0.0..=1.0).contains(&q) => q,
            _ => DEFAULT_QUALITY,
        }
    }

    pub fn effective_min_width(&self) -> u32 {
        self.min_width.unwrap_or(DEFAULT_MIN_WIDTH)
    }

    /// Budget in bytes (`size * 1024`). Non-positive or non-finite sizes mean no budget.
    pub fn budget_bytes(&self) -> Option<u64> {
        match self.size {
            Some(kb) if kb.is_finite() && kb > 0.0 => Some((kb * 1024.0) as u64),
            _ => None,
        }
    }

    /// Encodable output type: the requested `image/*` type, else the source type.
    /// Types the encoder cannot produce fall back to PNG.
    pub fn output_mime(&self, source_mime: &str) -> ImageMime {
        let wanted = self
            .mime
            .as_deref()
            .filter(|m| is_image_mime(m))
            .unwrap_or(source_mime);
        ImageMime::parse(wanted).unwrap_or(ImageMime::Png)
    }
}

/// Result of a compression call
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub data: Bytes,
    pub mime: String,
    /// Output dimensions; unknown when the original bytes were returned untouched
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// True when the original input bytes were returned
    pub from_original: bool,
}

impl CompressedImage {
    fn original(source: SourceImage) -> Self {
        Self {
            data: source.data,
            mime: source.mime,
            width: None,
            height: None,
            from_original: true,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_data_url(&self) -> String {
        format_data_url(&self.data, &self.mime)
    }
}

/// Compress with the built-in encoder
pub fn compress(input: ImageInput, config: &CompressConfig) -> Result<CompressedImage, AppError> {
    compress_with(input, config, &ImageEncoder)
}

/// Compress using a caller-supplied encoder
pub fn compress_with<E>(
    input: ImageInput,
    config: &CompressConfig,
    encoder: &E,
) -> Result<CompressedImage, AppError>
where
    E: SurfaceEncoder + ?Sized,
{
    let source = input.into_source()?;
    if !is_image_mime(&source.mime) {
        return Err(AppError::UnsupportedMime(source.mime));
    }

    let mime = config.output_mime(&source.mime);
    let quality = config.effective_quality();
    let orientation = config.orientation();
    let original_len = source.data.len() as u64;
    let budget = config.budget_bytes();

    if let Some(budget_bytes) = budget {
        if original_len < budget_bytes {
            tracing::info!(
                original_bytes = original_len,
                budget_bytes,
                "Input is under the budget, returning it unchanged"
            );
            return Ok(CompressedImage::original(source));
        }
    }

    let image = ImageDecoder::decode(&source.data)?;

    let (data, width, height) = match budget {
        None => {
            let surface = ImageOrientation::transform(&image, &config.geometry(), orientation)?;
            let (width, height) = surface.dimensions();
            let data = encoder.encode(&surface, mime, quality)?;
            (data, width, height)
        }
        Some(budget_bytes) => {
            let params = SearchParams {
                budget_bytes,
                min_width: config.effective_min_width(),
                quality,
                mime,
                orientation,
            };
            let outcome = SizeTargetSearch::run(&image, &params, encoder)?;
            if !outcome.fits {
                tracing::warn!(
                    budget_bytes,
                    width = outcome.chosen_width,
                    "Budget not reached at the minimum width"
                );
            }
            (outcome.data, outcome.width, outcome.height)
        }
    };
    drop(image);

    if data.len() as u64 >= original_len {
        tracing::info!(
            original_bytes = original_len,
            encoded_bytes = data.len(),
            "Encoding did not reduce size, returning original"
        );
        return Ok(CompressedImage::original(source));
    }

    tracing::info!(
        original_bytes = original_len,
        encoded_bytes = data.len(),
        width,
        height,
        mime = %mime,
        "Compressed image"
    );

    Ok(CompressedImage {
        data,
        mime: mime.as_str().to_string(),
        width: Some(width),
        height: Some(height),
        from_original: false,
    })
}

/// Async adapter running `compress` on the blocking pool
#[derive(Debug, Clone, Default)]
pub struct CompressTransformer {
    defaults: CompressionDefaults,
}

impl CompressTransformer {
    pub fn new(defaults: CompressionDefaults) -> Self {
        Self { defaults }
    }
}

#[async_trait]
impl MediaTransformer for CompressTransformer {
    type Options = CompressConfig;

    async fn transform(
        &self,
        input: ImageInput,
        options: CompressConfig,
    ) -> Result<CompressedImage, AppError> {
        let config = options.with_defaults(&self.defaults);
        // Decode/encode are CPU-bound; keep them off the async workers
        tokio::task::spawn_blocking(move || compress(input, &config))
            .await
            .map_err(|e| AppError::Internal(format!("compression task failed: {}", e)))?
    }

    fn supported_transforms(&self) -> Vec<TransformType> {
        vec![
            TransformType::ImageResize,
            TransformType::ImageScale,
            TransformType::ImageRotate,
            TransformType::ImageFlip,
            TransformType::ImageFormatConvert,
            TransformType::ImageTargetSize,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut state: u32 = 0x1234_5678;
        let img = RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let [r, g, b, _] = state.to_le_bytes();
            Rgb([r, g, b])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_config_deserialize_camel_case() {
        let config: CompressConfig = serde_json::from_str(
            r#"{"quality":0.5,"type":"image/jpeg","size":100,"minWidth":300,"orientation":6}"#,
        )
        .unwrap();
        assert_eq!(config.quality, Some(0.5));
        assert_eq!(config.mime.as_deref(), Some("image/jpeg"));
        assert_eq!(config.size, Some(100.0));
        assert_eq!(config.min_width, Some(300));
        assert_eq!(config.orientation(), Orientation::Rotate90);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let result: Result<CompressConfig, _> = serde_json::from_str(r#"{"width1": 700}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_quality() {
        assert_eq!(CompressConfig::default().effective_quality(), 0.9);
        let config = CompressConfig {
            quality: Some(0.3),
            ..Default::default()
        };
        assert_eq!(config.effective_quality(), 0.3);
        let config = CompressConfig {
            quality: Some(3.0),
            ..Default::default()
        };
        assert_eq!(config.effective_quality(), 0.9);
    }

    #[test]
    fn test_budget_bytes() {
        let config = CompressConfig {
            size: Some(100.0),
            ..Default::default()
        };
        assert_eq!(config.budget_bytes(), Some(102_400));
        for size in [0.0, -1.0, f64::NAN] {
            let config = CompressConfig {
                size: Some(size),
                ..Default::default()
            };
            assert_eq!(config.budget_bytes(), None);
        }
        assert_eq!(CompressConfig::default().budget_bytes(), None);
    }

    #[test]
    fn test_output_mime_resolution() {
        let config = CompressConfig::default();
        assert_eq!(config.output_mime("image/png"), ImageMime::Png);
        assert_eq!(config.output_mime("image/jpeg"), ImageMime::Jpeg);
        // Source type the encoder cannot produce
        assert_eq!(config.output_mime("image/webp"), ImageMime::Png);

        let config = CompressConfig {
            mime: Some("image/jpeg".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_mime("image/png"), ImageMime::Jpeg);

        let config = CompressConfig {
            mime: Some("application/pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_mime("image/gif"), ImageMime::Gif);

        let config = CompressConfig {
            mime: Some("image/avif".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_mime("image/jpeg"), ImageMime::Png);
    }

    #[test]
    fn test_with_defaults_only_fills_unset() {
        let defaults = CompressionDefaults {
            quality: 0.5,
            min_width: 64,
            mime: Some("image/gif".to_string()),
        };
        let config = CompressConfig {
            quality: Some(0.7),
            ..Default::default()
        }
        .with_defaults(&defaults);
        assert_eq!(config.quality, Some(0.7));
        assert_eq!(config.min_width, Some(64));
        assert_eq!(config.mime.as_deref(), Some("image/gif"));
    }

    #[test]
    fn test_unsupported_mime_fails_before_decoding() {
        let err = compress(
            ImageInput::blob(b"not an image".to_vec(), "text/plain"),
            &CompressConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMime(ref m) if m == "text/plain"));
    }

    #[test]
    fn test_decode_failure_propagates() {
        let err = compress(
            ImageInput::blob(b"not an image".to_vec(), "image/png"),
            &CompressConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_no_budget_single_encode_at_requested_geometry() {
        let png = noise_png(120, 80);
        let config = CompressConfig {
            mime: Some("image/jpeg".to_string()),
            width: Some(60),
            orientation: Some(6),
            ..Default::default()
        };
        let out = compress(ImageInput::blob(png.clone(), "image/png"), &config).unwrap();
        assert!(!out.from_original);
        assert_eq!(out.mime, "image/jpeg");
        assert_eq!((out.width, out.height), (Some(40), Some(60)));
        assert!(out.len() < png.len());
    }

    #[test]
    fn test_original_returned_when_encoding_grows() {
        // A flat PNG is tiny; a 4x upscale re-encode cannot beat it
        let img = RgbImage::from_pixel(50, 50, Rgb([200, 10, 10]));
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let config = CompressConfig {
            scale: Some(4.0),
            mime: Some("image/jpeg".to_string()),
            quality: Some(1.0),
            ..Default::default()
        };
        let out = compress(ImageInput::blob(png.clone(), "image/png"), &config).unwrap();
        assert!(out.from_original);
        assert_eq!(out.data, Bytes::from(png));
        assert_eq!(out.mime, "image/png");
    }

    #[test]
    fn test_to_data_url() {
        let out = CompressedImage {
            data: Bytes::from_static(b"hello"),
            mime: "image/png".to_string(),
            width: None,
            height: None,
            from_original: true,
        };
        assert_eq!(out.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_transformer_applies_defaults() {
        let transformer = CompressTransformer::new(CompressionDefaults {
            quality: 0.5,
            min_width: 200,
            mime: Some("image/jpeg".to_string()),
        });
        let png = noise_png(64, 64);
        let out = transformer
            .transform(ImageInput::blob(png, "image/png"), CompressConfig::default())
            .await
            .unwrap();
        assert_eq!(out.mime, "image/jpeg");
        assert_eq!((out.width, out.height), (Some(64), Some(64)));
    }

    #[tokio::test]
    async fn test_transformer_propagates_errors() {
        let transformer = CompressTransformer::default();
        let err = transformer
            .transform(
                ImageInput::blob(Vec::new(), "video/mp4"),
                CompressConfig::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "UnsupportedMime");
    }

    #[test]
    fn test_supported_transforms() {
        let transforms = CompressTransformer::default().supported_transforms();
        assert!(transforms.contains(&TransformType::ImageTargetSize));
        assert!(transforms.contains(&TransformType::ImageRotate));
    }
}
