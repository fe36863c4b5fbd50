//! Size-targeting search
//!
//! Shrinks the output width in eight equal steps from the source width down
//! to a floor, stopping at the first width whose estimated encoded size is
//! under the byte budget. Estimates come from the length of the base64 data
//! URL; only the chosen width is encoded authoritatively.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use imgshrink_core::{AppError, ImageMime};

use crate::image::{Geometry, ImageOrientation, Orientation};
use crate::traits::SurfaceEncoder;

/// Ratio between decoded byte length and base64 text length
pub const SIZE_ESTIMATE_RATIO: f64 = 0.75;

/// Number of equal steps between the source width and the floor
pub const SEARCH_STEPS: u32 = 8;

/// Estimated binary size of a base64 data URL
pub fn estimate_encoded_size(data_url: &str) -> f64 {
    data_url.len() as f64 * SIZE_ESTIMATE_RATIO
}

/// Candidate widths, largest first.
///
/// `start - k * step` for `k` in `0..=SEARCH_STEPS`, rounded and deduplicated.
/// When `start` is already at or below the floor the only candidate is `start`.
pub fn candidate_widths(start: u32, floor: u32) -> Vec<u32> {
    let floor = floor.max(1);
    if start <= floor {
        return vec![start];
    }

    let step = (start - floor) as f64 / SEARCH_STEPS as f64;
    let mut widths: Vec<u32> = (0..=SEARCH_STEPS)
        .map(|k| (start as f64 - k as f64 * step).round() as u32)
        .collect();
    widths.dedup();
    widths
}

/// Geometry for a search candidate: the given width and the aspect-derived
/// height, never less than one pixel.
pub fn candidate_geometry(width: u32, src_width: u32, src_height: u32) -> Geometry {
    let height = (width as f64 * src_height as f64 / src_width.max(1) as f64)
        .round()
        .max(1.0) as u32;
    Geometry {
        height: Some(height),
        ..Geometry::width(width)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub budget_bytes: u64,
    pub min_width: u32,
    pub quality: f32,
    pub mime: ImageMime,
    pub orientation: Orientation,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Authoritatively encoded bytes at the chosen width
    pub data: Bytes,
    /// Pre-rotation width the search settled on
    pub chosen_width: u32,
    /// Output surface dimensions (after orientation)
    pub width: u32,
    pub height: u32,
    /// Estimate recorded for the chosen width
    pub estimated_bytes: f64,
    /// Whether the estimate for the chosen width was under budget
    pub fits: bool,
    /// Number of estimate passes run
    pub attempts: usize,
}

pub struct SizeTargetSearch;

impl SizeTargetSearch {
    pub fn run<E>(
        image: &DynamicImage,
        params: &SearchParams,
        encoder: &E,
    ) -> Result<SearchOutcome, AppError>
    where
        E: SurfaceEncoder + ?Sized,
    {
        let (src_width, src_height) = image.dimensions();
        let candidates = candidate_widths(src_width, params.min_width);
        let budget = params.budget_bytes as f64;

        tracing::debug!(
            src_width,
            min_width = params.min_width,
            budget_bytes = params.budget_bytes,
            candidates = candidates.len(),
            "Starting size search"
        );

        let mut chosen_width = src_width;
        let mut estimated_bytes = f64::INFINITY;
        let mut fits = false;
        let mut attempts = 0;

        for width in candidates {
            attempts += 1;
            let estimate = {
                let geometry = candidate_geometry(width, src_width, src_height);
                let surface = ImageOrientation::transform(image, &geometry, params.orientation)?;
                let data_url = encoder.encode_data_url(&surface, params.mime, params.quality)?;
                estimate_encoded_size(&data_url)
            };

            tracing::debug!(width, estimate, budget, "Size search candidate");

            chosen_width = width;
            estimated_bytes = estimate;
            if estimate < budget {
                fits = true;
                break;
            }
        }

        if !fits {
            tracing::debug!(
                width = chosen_width,
                estimate = estimated_bytes,
                "No candidate fits the budget, using the floor"
            );
        }

        let surface = ImageOrientation::transform(
            image,
            &candidate_geometry(chosen_width, src_width, src_height),
            params.orientation,
        )?;
        let (width, height) = surface.dimensions();
        let data = encoder.encode(&surface, params.mime, params.quality)?;

        Ok(SearchOutcome {
            data,
            chosen_width,
            width,
            height,
            estimated_bytes,
            fits,
            attempts,
        })
    }
}
