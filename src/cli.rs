use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::ImageFormat;
use ticketscan::config::{
    DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW, DEFAULT_EPSILON_RATIO,
};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Gaussian kernel size applied before edge detection (odd)
    #[arg(long = "blur-kernel", global = true, default_value_t = DEFAULT_BLUR_KERNEL_SIZE, value_parser = parse_kernel_size)]
    pub blur_kernel: u32,
    /// Lower edge detector threshold
    #[arg(long = "canny-low", global = true, default_value_t = DEFAULT_CANNY_LOW)]
    pub canny_low: f32,
    /// Upper edge detector threshold
    #[arg(long = "canny-high", global = true, default_value_t = DEFAULT_CANNY_HIGH)]
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    #[arg(long = "epsilon-ratio", global = true, default_value_t = DEFAULT_EPSILON_RATIO, value_parser = parse_epsilon_ratio)]
    pub epsilon_ratio: f64,
    /// Log verbosity used when RUST_LOG is not set
    #[arg(long = "log-level", global = true, value_enum, env = "TICKETSCAN_LOG", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the ticket and save the cropped region
    Crop(CropCommand),
    /// Print the detected boundary without writing an image
    Detect(DetectCommand),
    /// Export the intermediate edge map as a PNG
    Edges(EdgesCommand),
}

#[derive(Args, Debug)]
pub struct CropCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>-ticket.<ext>`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output encoding (defaults to the input's format)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormatArg>,
    /// JPEG quality (1-100)
    #[arg(long = "jpeg-quality", default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: u8,
}

#[derive(Args, Debug)]
pub struct DetectCommand {
    /// Input image path
    pub input: PathBuf,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EdgesCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>-edges.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Encodings available for the cropped ticket.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormatArg {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl From<OutputFormatArg> for ImageFormat {
    /// Convert OutputFormatArg to image::ImageFormat.
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Jpeg => ImageFormat::Jpeg,
            OutputFormatArg::Png => ImageFormat::Png,
            OutputFormatArg::Gif => ImageFormat::Gif,
            OutputFormatArg::Bmp => ImageFormat::Bmp,
            OutputFormatArg::Tiff => ImageFormat::Tiff,
            OutputFormatArg::Webp => ImageFormat::WebP,
        }
    }
}

/// Log verbosity levels.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn parse_kernel_size(value: &str) -> Result<u32, String> {
    let size = value
        .parse::<u32>()
        .map_err(|_| format!("kernel size must be a positive integer, got `{value}`"))?;
    if size == 0 || size % 2 == 0 {
        return Err(format!("kernel size must be odd, got {size}"));
    }
    Ok(size)
}

fn parse_epsilon_ratio(value: &str) -> Result<f64, String> {
    let ratio = value
        .parse::<f64>()
        .map_err(|_| format!("epsilon ratio must be numeric, got `{value}`"))?;
    if ratio > 0.0 && ratio < 1.0 {
        Ok(ratio)
    } else {
        Err(format!("epsilon ratio {value} is out of range; expected 0.0 < ratio < 1.0"))
    }
}
