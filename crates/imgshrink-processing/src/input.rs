//! Input handling: blobs, data URLs and decoding

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use image::{DynamicImage, ImageReader};
use imgshrink_core::AppError;
use std::io::Cursor;

/// Prefix every accepted textual input must start with
pub const DATA_URL_IMAGE_PREFIX: &str = "data:image";

/// An image handed to `compress`
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Raw encoded bytes plus the MIME type the caller attached to them
    Blob { data: Bytes, mime: String },
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
}

/// Raw bytes and declared MIME type of the input, after unwrapping any data URL
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub data: Bytes,
    pub mime: String,
}

impl ImageInput {
    pub fn blob(data: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        ImageInput::Blob {
            data: data.into(),
            mime: mime.into(),
        }
    }

    /// Accept a textual input. Only image data URLs are allowed.
    pub fn from_text(text: impl Into<String>) -> Result<Self, AppError> {
        let text = text.into();
        if !text.starts_with(DATA_URL_IMAGE_PREFIX) {
            return Err(AppError::InvalidInput(
                "expected binary image data or a data:image base64 string".to_string(),
            ));
        }
        Ok(ImageInput::DataUrl(text))
    }

    /// Unwrap into raw bytes and declared MIME. MIME is not validated here.
    pub fn into_source(self) -> Result<SourceImage, AppError> {
        match self {
            ImageInput::Blob { data, mime } => Ok(SourceImage { data, mime }),
            ImageInput::DataUrl(text) => {
                let (mime, data) = parse_data_url(&text)?;
                Ok(SourceImage {
                    data: Bytes::from(data),
                    mime,
                })
            }
        }
    }
}

/// Split a base64 data URL into its MIME type and decoded payload.
pub fn parse_data_url(text: &str) -> Result<(String, Vec<u8>), AppError> {
    let rest = text
        .strip_prefix("data:")
        .ok_or_else(|| AppError::InvalidInput("data URL must start with 'data:'".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::InvalidInput("data URL has no payload".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_lowercase();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(AppError::InvalidInput(
            "only base64 data URLs are supported".to_string(),
        ));
    }

    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let data = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| AppError::InvalidInput(format!("invalid base64 payload: {}", e)))?;

    Ok((mime, data))
}

/// Build a `data:<mime>;base64,...` string
pub fn format_data_url(data: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Rasterizes encoded bytes into a pixel surface
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn decode(data: &[u8]) -> Result<DynamicImage, AppError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| AppError::Decode(e.to_string()))?;
        reader.decode().map_err(|e| AppError::Decode(e.to_string()))
    }
}
