use image::ImageFormat;

/// Default Gaussian kernel size used before edge detection.
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;
/// Default lower hysteresis threshold of the edge detector.
pub const DEFAULT_CANNY_LOW: f32 = 75.0;
/// Default upper hysteresis threshold of the edge detector.
pub const DEFAULT_CANNY_HIGH: f32 = 200.0;
/// Default polygon approximation tolerance as a fraction of the contour perimeter.
pub const DEFAULT_EPSILON_RATIO: f64 = 0.02;

/// Options for preprocessing and boundary detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    /// Side length of the square Gaussian kernel. Even values round up to the next odd size.
    pub blur_kernel_size: u32,
    /// Lower edge detector threshold.
    pub canny_low: f32,
    /// Upper edge detector threshold.
    pub canny_high: f32,
    /// Approximation tolerance relative to each contour's perimeter.
    pub epsilon_ratio: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
        }
    }
}

impl DetectionSettings {
    /// Set the Gaussian kernel size.
    pub fn with_blur_kernel_size(mut self, size: u32) -> Self {
        self.blur_kernel_size = size;
        self
    }

    /// Set both edge detector thresholds.
    pub fn with_canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    /// Set the approximation tolerance ratio.
    pub fn with_epsilon_ratio(mut self, ratio: f64) -> Self {
        self.epsilon_ratio = ratio;
        self
    }

    /// The kernel size actually used: odd and at least 1.
    pub fn effective_kernel_size(&self) -> u32 {
        self.blur_kernel_size.max(1) | 1
    }

    /// Thresholds ordered as `(low, high)`.
    pub fn ordered_thresholds(&self) -> (f32, f32) {
        if self.canny_high < self.canny_low {
            (self.canny_high, self.canny_low)
        } else {
            (self.canny_low, self.canny_high)
        }
    }
}

/// Options for encoding the cropped ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Output container; `None` keeps the format the input was decoded from.
    pub format: Option<ImageFormat>,
    /// Quality used when the output is JPEG (1-100).
    pub jpeg_quality: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: None,
            jpeg_quality: 90,
        }
    }
}

impl OutputSettings {
    /// Force a specific output format.
    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}
