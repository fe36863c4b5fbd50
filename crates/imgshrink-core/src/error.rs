//! Error types module
//!
//! All failures raised while compressing an image are unified under the
//! `AppError` enum. Nothing in the compression core is retried: every variant
//! is terminal for the call that produced it.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad caller input
    Debug,
    /// Warning level - for data that could not be processed
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be surfaced to the caller
pub trait ErrorMetadata {
    /// Process exit code the CLI uses for this error
    fn exit_code(&self) -> i32;

    /// Machine-readable error code (e.g., "INVALID_INPUT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the caller
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported MIME type: {0} (expected image/*)")]
    UnsupportedMime(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (exit_code, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (i32, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (
            2,
            "INVALID_INPUT",
            false,
            Some("Pass a binary image or a data:image/...;base64 string"),
            LogLevel::Debug,
        ),
        AppError::UnsupportedMime(_) => (
            2,
            "UNSUPPORTED_MIME",
            false,
            Some("Only image/* inputs can be compressed"),
            LogLevel::Debug,
        ),
        AppError::InvalidDimensions { .. } => (
            2,
            "INVALID_DIMENSIONS",
            false,
            Some("Width, height and scale must resolve to at least one pixel"),
            LogLevel::Debug,
        ),
        AppError::Config(_) => (
            78,
            "CONFIG_ERROR",
            false,
            Some("Check IMGSHRINK_* environment variables"),
            LogLevel::Error,
        ),
        AppError::Decode(_) => (
            65,
            "DECODE_ERROR",
            false,
            Some("Check that the data is a complete, supported image"),
            LogLevel::Warn,
        ),
        AppError::Encode(_) => (
            70,
            "ENCODE_ERROR",
            false,
            Some("Try a different output type"),
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (70, "INTERNAL_ERROR", false, None, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedMime(_) => "UnsupportedMime",
            AppError::Decode(_) => "Decode",
            AppError::Encode(_) => "Encode",
            AppError::InvalidDimensions { .. } => "InvalidDimensions",
            AppError::Config(_) => "Config",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn exit_code(&self) -> i32 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }
}
