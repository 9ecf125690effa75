use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

use crate::{DetectionError, DetectionResult};

/// File suffixes accepted by the upload gate, lowercased and including the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 7] =
    [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"];

/// A decoded image together with the container it was sniffed from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Extract the lowercased suffix of `filename`, including the leading dot.
///
/// Returns an empty string when the name has no suffix.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Pre-filter an upload by its declared name and content type.
///
/// This only looks at metadata; [`decode_image`] trusts the bytes alone.
pub fn validate_upload(filename: &str, content_type: Option<&str>) -> DetectionResult<()> {
    if let Some(content_type) = content_type {
        if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(DetectionError::UnsupportedContentType {
                content_type: content_type.to_string(),
            });
        }
    }

    let extension = file_extension(filename);
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(DetectionError::UnsupportedFormat { extension });
    }
    Ok(())
}

/// Decode raw bytes into an image, sniffing the container from the content.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_image(bytes: &[u8]) -> DetectionResult<LoadedImage> {
    if bytes.is_empty() {
        return Err(DetectionError::EmptyPayload);
    }

    let format = image::guess_format(bytes).map_err(DetectionError::Decode)?;
    let image =
        image::load_from_memory_with_format(bytes, format).map_err(DetectionError::Decode)?;

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DetectionError::EmptyImage { width, height });
    }

    debug!(?format, width, height, color = ?image.color(), "Image decoded");
    Ok(LoadedImage { image, format })
}
