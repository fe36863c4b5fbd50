//! Configuration module
//!
//! Process-wide defaults for compression, read from the environment (and a
//! `.env` file when present). Per-call options override these.

use std::env;

use crate::error::AppError;

pub const DEFAULT_QUALITY: f32 = 0.9;
pub const DEFAULT_MIN_WIDTH: u32 = 200;

const QUALITY_VAR: &str = "IMGSHRINK_QUALITY";
const MIN_WIDTH_VAR: &str = "IMGSHRINK_MIN_WIDTH";
const TYPE_VAR: &str = "IMGSHRINK_TYPE";

/// Defaults applied when a compression request leaves an option unset
#[derive(Clone, Debug, PartialEq)]
pub struct CompressionDefaults {
    /// Encoder quality in `[0, 1]`
    pub quality: f32,
    /// Smallest width the size search will try
    pub min_width: u32,
    /// Output MIME type; `None` keeps the source type
    pub mime: Option<String>,
}

impl Default for CompressionDefaults {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            min_width: DEFAULT_MIN_WIDTH,
            mime: None,
        }
    }
}

impl CompressionDefaults {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build defaults from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let quality = match lookup(QUALITY_VAR) {
            Some(raw) => match raw.trim().parse::<f32>() {
                Ok(q) => q,
                Err(_) => {
                    tracing::warn!(
                        var = QUALITY_VAR,
                        value = %raw,
                        "Not a number, using default quality"
                    );
                    DEFAULT_QUALITY
                }
            },
            None => DEFAULT_QUALITY,
        };

        if !(0.0..=1.0).contains(&quality) {
            return Err(AppError::Config(format!(
                "{} must be between 0 and 1, got {}",
                QUALITY_VAR, quality
            )));
        }

        let min_width = lookup(MIN_WIDTH_VAR)
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(w) => Some(w),
                Err(_) => {
                    tracing::warn!(
                        var = MIN_WIDTH_VAR,
                        value = %raw,
                        "Not a pixel count, using default minimum width"
                    );
                    None
                }
            })
            .unwrap_or(DEFAULT_MIN_WIDTH);

        let mime = lookup(TYPE_VAR)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(Self {
            quality,
            min_width,
            mime,
        })
    }
}
