use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use ticketscan::loader::{decode_image, validate_upload};
use ticketscan::{DetectionResult, DetectionSettings, DocumentScanner, LoadedImage};

use crate::cli::GlobalOptions;

/// The convenience function to build a DocumentScanner from the global options.
pub fn build_scanner(global: &GlobalOptions) -> DocumentScanner {
    let settings = DetectionSettings::default()
        .with_blur_kernel_size(global.blur_kernel)
        .with_canny_thresholds(global.canny_low, global.canny_high)
        .with_epsilon_ratio(global.epsilon_ratio);
    DocumentScanner::new().with_detection_settings(settings)
}

/// Read an input file through the upload gate and decode it.
pub fn load_input(path: &Path) -> DetectionResult<LoadedImage> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_upload(&filename, None)?;
    let bytes = fs::read(path)?;
    decode_image(&bytes)
}

/// Preferred file extension for an output format, falling back to JPEG for read-only formats.
pub fn extension_for(format: ImageFormat) -> &'static str {
    let format = if format.writing_enabled() {
        format
    } else {
        ImageFormat::Jpeg
    };
    format.extensions_str().first().copied().unwrap_or("jpg")
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}
