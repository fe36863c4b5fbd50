use super::resize::{Geometry, ImageResize};
use image::{DynamicImage, GenericImageView};
use imgshrink_core::AppError;
use std::borrow::Cow;

/// EXIF-style orientation code.
///
/// The code describes how the stored pixels must be rotated/mirrored to be
/// displayed upright. Codes 5-8 involve a quarter turn and swap the output
/// width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Rotate 90° clockwise, then mirror horizontally
    Transpose = 5,
    Rotate90 = 6,
    /// Rotate 270° clockwise, then mirror horizontally
    Transverse = 7,
    Rotate270 = 8,
}

impl Orientation {
    /// Map a raw code; anything outside 1-8 means no rotation or flip.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the transform includes a quarter turn
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Output canvas size for content resolved to `width` x `height`
    pub fn canvas_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Apply the pixel operation for this code.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90 => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270 => img.rotate270(),
        }
    }
}

/// Combined resize + orientation transform
pub struct ImageOrientation;

impl ImageOrientation {
    /// Render `img` at the requested geometry with `orientation` applied.
    ///
    /// The geometry is resolved against the source before rotation; for
    /// quarter-turn codes the returned surface is `height x width` of the
    /// resolved size. The source is never modified.
    pub fn transform(
        img: &DynamicImage,
        geometry: &Geometry,
        orientation: Orientation,
    ) -> Result<DynamicImage, AppError> {
        let (src_width, src_height) = img.dimensions();
        let (width, height) = geometry.resolve(src_width, src_height)?;

        let resized = if (width, height) == (src_width, src_height) {
            Cow::Borrowed(img)
        } else {
            Cow::Owned(ImageResize::resize_image(img, width, height))
        };

        let (canvas_width, canvas_height) = orientation.canvas_dimensions(width, height);

        tracing::debug!(
            src_width,
            src_height,
            canvas_width,
            canvas_height,
            orientation = orientation.code(),
            "Transforming image"
        );

        let out = orientation.apply(resized.into_owned());
        debug_assert_eq!(out.dimensions(), (canvas_width, canvas_height));
        Ok(out)
    }
}
