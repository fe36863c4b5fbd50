use image::{imageops::FilterType, DynamicImage, GenericImageView};
use imgshrink_core::AppError;
use serde::{Deserialize, Serialize};

/// Exclusive upper bound for a usable scale factor.
pub const MAX_SCALE: f64 = 10.0;

/// Requested output geometry.
///
/// A present `scale` always wins over `width`/`height`. A scale outside
/// `(0, MAX_SCALE)` means "keep the source size".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<f64>,
}

impl Geometry {
    /// Only a target width; height follows the source aspect ratio
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Scale factor actually applied, if the request is in scale mode
    pub fn effective_scale(&self) -> Option<f64> {
        self.scale.map(|s| {
            if s.is_finite() && s > 0.0 && s < MAX_SCALE {
                s
            } else {
                1.0
            }
        })
    }

    /// Resolve the pre-rotation output size for a source of `src_width` x `src_height`.
    pub fn resolve(&self, src_width: u32, src_height: u32) -> Result<(u32, u32), AppError> {
        let (sw, sh) = (src_width as f64, src_height as f64);

        let (width, height) = match self.effective_scale() {
            Some(scale) => (sw * scale, sh * scale),
            None => match (self.width, self.height) {
                (Some(w), Some(h)) => (w as f64, h as f64),
                (Some(w), None) => (w as f64, w as f64 * sh / sw),
                (None, Some(h)) => (h as f64 * sw / sh, h as f64),
                (None, None) => (sw, sh),
            },
        };

        // NaN and negative values saturate to 0 and are rejected below
        let width = width.round() as u32;
        let height = height.round() as u32;

        if width == 0 || height == 0 {
            return Err(AppError::InvalidDimensions { width, height });
        }

        Ok((width, height))
    }
}

/// Image resampling operations
pub struct ImageResize;

impl ImageResize {
    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resample to exact dimensions (aspect ratio is not preserved)
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn scaled(scale: f64) -> Geometry {
        Geometry {
            scale: Some(scale),
            ..Geometry::default()
        }
    }

    #[test]
    fn test_resolve_source_size_when_empty() {
        assert_eq!(Geometry::default().resolve(640, 480).unwrap(), (640, 480));
    }

    #[test]
    fn test_resolve_explicit_both() {
        let geometry = Geometry {
            width: Some(100),
            height: Some(300),
            scale: None,
        };
        assert_eq!(geometry.resolve(640, 480).unwrap(), (100, 300));
    }

    #[test]
    fn test_resolve_width_only_preserves_aspect_ratio() {
        assert_eq!(Geometry::width(320).resolve(640, 480).unwrap(), (320, 240));
        // 725 * 500 / 800 = 453.125
        assert_eq!(Geometry::width(725).resolve(800, 500).unwrap(), (725, 453));
    }

    #[test]
    fn test_resolve_height_only_preserves_aspect_ratio() {
        let geometry = Geometry {
            height: Some(100),
            ..Geometry::default()
        };
        // 100 * 1000 / 300 = 333.33
        assert_eq!(geometry.resolve(1000, 300).unwrap(), (333, 100));
    }

    #[test]
    fn test_resolve_scale_in_range() {
        assert_eq!(scaled(0.5).resolve(400, 300).unwrap(), (200, 150));
        assert_eq!(scaled(2.5).resolve(400, 300).unwrap(), (1000, 750));
    }

    #[test]
    fn test_scale_out_of_range_means_unscaled() {
        for scale in [0.0, -1.0, 10.0, 25.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                scaled(scale).resolve(400, 300).unwrap(),
                (400, 300),
                "scale {} should behave like 1",
                scale
            );
            assert_eq!(scaled(scale).effective_scale(), Some(1.0));
        }
    }

    #[test]
    fn test_scale_overrides_width_and_height() {
        let geometry = Geometry {
            width: Some(10),
            height: Some(10),
            scale: Some(2.0),
        };
        assert_eq!(geometry.resolve(400, 300).unwrap(), (800, 600));

        let geometry = Geometry {
            width: Some(10),
            height: None,
            scale: Some(50.0),
        };
        assert_eq!(geometry.resolve(400, 300).unwrap(), (400, 300));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let err = Geometry::width(0).resolve(400, 300).unwrap_err();
        assert!(matches!(err, AppError::InvalidDimensions { width: 0, .. }));

        // 1 * 1 / 400 rounds to 0
        let err = Geometry::width(1).resolve(400, 1).unwrap_err();
        assert!(matches!(err, AppError::InvalidDimensions { height: 0, .. }));

        assert!(scaled(0.001).resolve(100, 100).is_err());
    }

    #[test]
    fn test_select_filter() {
        assert_eq!(
            ImageResize::select_filter(1000, 1000, 400, 400),
            FilterType::Triangle
        );
        assert_eq!(
            ImageResize::select_filter(1000, 1000, 600, 600),
            FilterType::CatmullRom
        );
        assert_eq!(
            ImageResize::select_filter(1000, 1000, 900, 900),
            FilterType::Lanczos3
        );
    }

    #[test]
    fn test_resize_image_exact() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([9, 9, 9, 255])));
        let resized = ImageResize::resize_image(&img, 13, 31);
        assert_eq!(resized.dimensions(), (13, 31));
    }
}
