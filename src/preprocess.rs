use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use tracing::{debug, instrument};

use crate::config::DetectionSettings;
use crate::{DetectionError, DetectionResult};

/// Binary edge image (every pixel is 0 or 255) with the dimensions of its source.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    edges: GrayImage,
}

impl EdgeMap {
    /// Wrap an existing mask, treating every non-zero pixel as an edge.
    pub fn from_mask(mut mask: GrayImage) -> Self {
        for px in mask.pixels_mut() {
            if px[0] != 0 {
                *px = Luma([255]);
            }
        }
        Self { edges: mask }
    }

    /// Get a reference to the edge image.
    pub fn image(&self) -> &GrayImage {
        &self.edges
    }

    /// Dimensions of the source image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.edges.dimensions()
    }

    /// Number of pixels marked as edges.
    pub fn edge_pixel_count(&self) -> usize {
        self.edges.pixels().filter(|p| p[0] != 0).count()
    }

    /// Save the edge image as a grayscale file.
    pub fn save(&self, path: impl AsRef<Path>) -> DetectionResult<()> {
        self.edges.save(path).map_err(DetectionError::Encode)
    }
}

/// Convert to single-channel grayscale with ITU-R BT.601 luma weights
/// (`0.299 R + 0.587 G + 0.114 B`, rounded to nearest).
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (rgb_px, out_px) in rgb.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = rgb_px.0;
        let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        *out_px = Luma([((weighted + 500) / 1000) as u8]);
    }
    gray
}

/// Normalised 1-D Gaussian weights for a kernel of `size` taps.
///
/// Sigma follows the automatic rule `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
/// Even sizes round up to the next odd size.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

/// Smooth a grayscale image with a square Gaussian kernel of side `size`.
pub fn blur(gray: &GrayImage, size: u32) -> GrayImage {
    let kernel = gaussian_kernel(size);
    separable_filter_equal(gray, &kernel)
}

/// Dual-threshold gradient edge detection. Output pixels are 0 or 255.
pub fn detect_edges(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(gray, low, high)
}

/// Run grayscale conversion, blur, and edge detection on `image`.
///
/// The caller's image is only read; the result is a freshly allocated edge map.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn edge_map(image: &DynamicImage, settings: &DetectionSettings) -> DetectionResult<EdgeMap> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DetectionError::EmptyImage { width, height });
    }

    let gray = to_grayscale(image);
    let kernel_size = settings.effective_kernel_size();
    let blurred = blur(&gray, kernel_size);
    drop(gray);

    let (low, high) = settings.ordered_thresholds();
    let edges = EdgeMap {
        edges: detect_edges(&blurred, low, high),
    };
    debug!(
        kernel_size,
        low,
        high,
        edge_pixels = edges.edge_pixel_count(),
        "Edge map computed"
    );
    Ok(edges)
}
