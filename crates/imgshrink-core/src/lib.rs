//! imgshrink Core Library
//!
//! This crate provides the error types, image MIME model and configuration
//! defaults shared by the imgshrink processing and CLI crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::CompressionDefaults;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{is_image_mime, ImageMime};
