use std::io::Write;
use std::path::Path;

use anyhow::Context;
use imgshrink_core::ImageMime;
use imgshrink_processing::ImageInput;

/// MIME type for an input file: extension first, then content sniffing.
///
/// Returns `None` when neither identifies an image.
pub fn mime_for_path(path: &Path, data: &[u8]) -> Option<String> {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .and_then(|ext| match ext.as_str() {
            "webp" => Some("image/webp".to_string()),
            "bmp" => Some("image/bmp".to_string()),
            other => ImageMime::from_extension(other).map(|m| m.as_str().to_string()),
        });

    by_extension.or_else(|| {
        image::guess_format(data)
            .ok()
            .map(|format| format.to_mime_type().to_string())
    })
}

/// Turn the positional argument into an input: a literal data URL, or a file path.
pub fn read_input(arg: &str) -> anyhow::Result<ImageInput> {
    if arg.starts_with("data:") {
        return Ok(ImageInput::from_text(arg)?);
    }

    let path = Path::new(arg);
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime =
        mime_for_path(path, &data).unwrap_or_else(|| "application/octet-stream".to_string());
    tracing::debug!(path = %path.display(), bytes = data.len(), mime = %mime, "Read input");

    Ok(ImageInput::blob(data, mime))
}

/// Write to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays binary-clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
