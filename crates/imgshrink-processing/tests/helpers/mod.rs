//! Shared helpers for the compression integration tests.
//!
//! Run from workspace root: `cargo test -p imgshrink-processing`.

pub mod fixtures;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use imgshrink_core::{AppError, ImageMime};
use imgshrink_processing::SurfaceEncoder;
use std::sync::Mutex;

/// Encoder that emits `width * height * bytes_per_pixel` zero bytes and
/// records every surface size it was asked to encode.
pub struct RecordingEncoder {
    bytes_per_pixel: f64,
    calls: Mutex<Vec<(u32, u32, ImageMime)>>,
}

impl RecordingEncoder {
    pub fn new(bytes_per_pixel: f64) -> Self {
        Self {
            bytes_per_pixel,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn widths(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|c| c.0).collect()
    }

    pub fn calls(&self) -> Vec<(u32, u32, ImageMime)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SurfaceEncoder for RecordingEncoder {
    fn encode(
        &self,
        surface: &DynamicImage,
        mime: ImageMime,
        _quality: f32,
    ) -> Result<Bytes, AppError> {
        let (w, h) = surface.dimensions();
        self.calls.lock().unwrap().push((w, h, mime));
        Ok(Bytes::from(vec![
            0u8;
            (w as f64 * h as f64 * self.bytes_per_pixel) as usize
        ]))
    }
}
