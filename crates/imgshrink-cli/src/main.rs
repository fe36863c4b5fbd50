//! imgshrink: shrink an image to a byte budget.
//!
//! Defaults come from IMGSHRINK_QUALITY, IMGSHRINK_MIN_WIDTH and IMGSHRINK_TYPE
//! (a `.env` file is read when present). Flags override them.

use clap::Parser;
use imgshrink_cli::{init_tracing, read_input, write_output};
use imgshrink_core::{AppError, CompressionDefaults, ErrorMetadata, LogLevel};
use imgshrink_processing::{CompressConfig, CompressTransformer, MediaTransformer};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imgshrink", about = "Resize, rotate and re-encode an image to fit a size budget")]
struct Cli {
    /// Image file path, or a `data:image/...;base64,` string
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Encoder quality between 0 and 1
    #[arg(long)]
    quality: Option<f32>,

    /// Output MIME type, e.g. image/jpeg
    #[arg(long = "type", value_name = "MIME")]
    mime: Option<String>,

    /// Byte budget in kilobytes
    #[arg(long, value_name = "KB")]
    size: Option<f64>,

    /// Smallest width tried when shrinking to the budget
    #[arg(long, value_name = "PX")]
    min_width: Option<u32>,

    /// Output width in pixels
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long, value_name = "PX")]
    height: Option<u32>,

    /// Scale factor between 0 and 10; overrides --width/--height
    #[arg(long)]
    scale: Option<f64>,

    /// Orientation code 1-8
    #[arg(long, value_name = "CODE")]
    orientation: Option<i64>,

    /// Print a base64 data URL instead of raw bytes
    #[arg(long)]
    data_url: bool,
}

impl Cli {
    fn config(&self) -> CompressConfig {
        CompressConfig {
            quality: self.quality,
            mime: self.mime.clone(),
            size: self.size,
            min_width: self.min_width,
            width: self.width,
            height: self.height,
            scale: self.scale,
            orientation: self.orientation,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let defaults = CompressionDefaults::from_env()?;
    let input = read_input(&cli.input)?;

    let transformer = CompressTransformer::new(defaults);
    let result = transformer.transform(input, cli.config()).await?;

    tracing::info!(
        bytes = result.len(),
        mime = %result.mime,
        unchanged = result.from_original,
        "Done"
    );

    if cli.data_url {
        let mut text = result.to_data_url();
        if cli.output.is_none() {
            text.push('\n');
        }
        write_output(cli.output.as_deref(), text.as_bytes())
    } else {
        write_output(cli.output.as_deref(), &result.data)
    }
}

fn report(err: &AppError) {
    eprintln!("imgshrink: {}", err);
    let action = err.suggested_action().unwrap_or("");
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(code = err.error_code(), "{}", err.detailed_message()),
        LogLevel::Warn => {
            tracing::warn!(code = err.error_code(), action, "{}", err.detailed_message())
        }
        LogLevel::Error => {
            tracing::error!(code = err.error_code(), action, "{}", err.detailed_message())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = match err.downcast_ref::<AppError>() {
            Some(app_err) => {
                report(app_err);
                app_err.exit_code()
            }
            None => {
                eprintln!("imgshrink: {:#}", err);
                tracing::debug!("{:?}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
