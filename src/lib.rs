//! Locate a photographed paper ticket and crop it out of the picture.
//!
//! The pipeline runs four stages in order: decode the upload, build a
//! blurred edge map, pick the largest contour that simplifies to four
//! vertices, and crop that quadrilateral's axis-aligned bounding box from
//! the original image.

pub mod config;
pub mod contour;
pub mod detect;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod loader;
pub mod preprocess;

pub use config::{DetectionSettings, OutputSettings};
pub use detect::{BoundaryMatch, Quadrilateral};
pub use error::{DetectionError, DetectionResult, ErrorCategory};
pub use extract::BoundingBox;
pub use loader::{LoadedImage, SUPPORTED_EXTENSIONS};
pub use preprocess::EdgeMap;

use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tracing::{info, instrument};

use crate::detect::find_boundary;
use crate::extract::{crop_to_quad, encode_image};
use crate::loader::{decode_image, validate_upload};
use crate::preprocess::edge_map;

/// Detect and crop a ticket with default settings.
///
/// `filename` is only used for the extension gate; decoding trusts the bytes.
pub fn detect_and_crop_document(bytes: &[u8], filename: &str) -> DetectionResult<CroppedDocument> {
    DocumentScanner::new().scan_upload(bytes, filename, None)
}

/// Entry point for configuring and running ticket detection.
///
/// Holds settings only, so one instance can be built at start-up and shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct DocumentScanner {
    detection: DetectionSettings,
    output: OutputSettings,
}

impl DocumentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the detection settings.
    pub fn with_detection_settings(mut self, settings: DetectionSettings) -> Self {
        self.detection = settings;
        self
    }

    /// Replace the output settings.
    pub fn with_output_settings(mut self, settings: OutputSettings) -> Self {
        self.output = settings;
        self
    }

    /// Set the Gaussian kernel size used before edge detection.
    pub fn with_blur_kernel_size(mut self, size: u32) -> Self {
        self.detection.blur_kernel_size = size;
        self
    }

    /// Set the edge detector thresholds.
    pub fn with_canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.detection = self.detection.with_canny_thresholds(low, high);
        self
    }

    /// Set the polygon approximation tolerance relative to contour perimeter.
    pub fn with_epsilon_ratio(mut self, ratio: f64) -> Self {
        self.detection.epsilon_ratio = ratio;
        self
    }

    /// Force the encoding of cropped output; `None` keeps the input's format.
    pub fn with_output_format(mut self, format: Option<ImageFormat>) -> Self {
        self.output.format = format;
        self
    }

    /// Run the upload gate, then the full pipeline.
    pub fn scan_upload(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: Option<&str>,
    ) -> DetectionResult<CroppedDocument> {
        validate_upload(filename, content_type)?;
        self.scan_bytes(bytes)
    }

    /// Run the pipeline on raw bytes without looking at any metadata.
    pub fn scan_bytes(&self, bytes: &[u8]) -> DetectionResult<CroppedDocument> {
        let LoadedImage { image, format } = decode_image(bytes)?;
        self.crop(image, format)
    }

    /// Read a file and run it through [`DocumentScanner::scan_upload`].
    pub fn scan_path(&self, path: impl AsRef<Path>) -> DetectionResult<CroppedDocument> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(path)?;
        self.scan_upload(&bytes, &filename, None)
    }

    /// Compute the edge map the detector works on.
    pub fn edges(&self, image: &DynamicImage) -> DetectionResult<EdgeMap> {
        edge_map(image, &self.detection)
    }

    /// Find the ticket boundary without cropping.
    pub fn locate(&self, image: &DynamicImage) -> DetectionResult<BoundaryMatch> {
        let edges = self.edges(image)?;
        find_boundary(edges, self.detection.epsilon_ratio)
    }

    /// Locate the ticket in `image` and crop it out.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn crop(
        &self,
        image: DynamicImage,
        source_format: ImageFormat,
    ) -> DetectionResult<CroppedDocument> {
        let boundary = self.locate(&image)?;
        let (cropped, bounding_box) = crop_to_quad(image, &boundary.quad)?;
        info!(
            x = bounding_box.x,
            y = bounding_box.y,
            width = bounding_box.width,
            height = bounding_box.height,
            "Ticket detected"
        );
        Ok(CroppedDocument {
            image: cropped,
            bounding_box,
            boundary,
            source_format,
            output: self.output.clone(),
        })
    }
}

/// The cropped ticket together with where it was found.
#[derive(Debug, Clone)]
pub struct CroppedDocument {
    image: DynamicImage,
    bounding_box: BoundingBox,
    boundary: BoundaryMatch,
    source_format: ImageFormat,
    output: OutputSettings,
}

impl CroppedDocument {
    /// Get a reference to the cropped image.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The crop rectangle in source image coordinates.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// The quadrilateral the crop was computed from.
    pub fn quad(&self) -> &Quadrilateral {
        &self.boundary.quad
    }

    /// Detection diagnostics.
    pub fn boundary(&self) -> &BoundaryMatch {
        &self.boundary
    }

    /// The container the input was decoded from.
    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    /// The container [`CroppedDocument::encode`] will use.
    pub fn output_format(&self) -> ImageFormat {
        self.output.format.unwrap_or(self.source_format)
    }

    /// Encode the crop with the configured output format.
    ///
    /// Returns the bytes and the format actually written, which is JPEG when
    /// the requested format has no encoder.
    pub fn encode(&self) -> DetectionResult<(Vec<u8>, ImageFormat)> {
        self.encode_as(self.output_format())
    }

    /// Encode the crop as `format`.
    pub fn encode_as(&self, format: ImageFormat) -> DetectionResult<(Vec<u8>, ImageFormat)> {
        encode_image(&self.image, format, self.output.jpeg_quality)
    }

    /// Save the crop, choosing the format from the path's extension when it has one.
    pub fn save(&self, path: impl AsRef<Path>) -> DetectionResult<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).unwrap_or_else(|_| self.output_format());
        let (bytes, _) = self.encode_as(format)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn ticket_photo() -> DynamicImage {
        let mut img = RgbImage::from_pixel(160, 120, Rgb([30, 40, 50]));
        for y in 30..90 {
            for x in 20..140 {
                img.put_pixel(x, y, Rgb([240, 240, 230]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn scanner_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<DocumentScanner>();
    }

    #[test]
    fn crop_reports_box_and_diagnostics() {
        let doc = DocumentScanner::new()
            .crop(ticket_photo(), ImageFormat::Png)
            .unwrap();
        let bbox = doc.bounding_box();
        assert!((bbox.width as i64 - 120).abs() <= 5, "{bbox:?}");
        assert!((bbox.height as i64 - 60).abs() <= 5, "{bbox:?}");
        assert_eq!(doc.image().width(), bbox.width);
        assert!(doc.boundary().contour_area > 0.0);
        assert_eq!(doc.output_format(), ImageFormat::Png);
    }

    #[test]
    fn output_format_override_wins() {
        let doc = DocumentScanner::new()
            .with_output_format(Some(ImageFormat::Bmp))
            .crop(ticket_photo(), ImageFormat::Png)
            .unwrap();
        let (bytes, format) = doc.encode().unwrap();
        assert_eq!(format, ImageFormat::Bmp);
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Bmp);
    }

    #[test]
    fn gate_runs_before_decoding() {
        let err = DocumentScanner::new()
            .scan_upload(b"not an image", "ticket.pdf", None)
            .unwrap_err();
        assert!(matches!(err, DetectionError::UnsupportedFormat { .. }));
    }
}
