use thiserror::Error;

use crate::loader::SUPPORTED_EXTENSIONS;

/// Result type alias for operations that may fail with [`DetectionError`].
pub type DetectionResult<T> = std::result::Result<T, DetectionError>;

/// Error types that can occur while locating and cropping a ticket.
///
/// Every variant is terminal for the request that produced it. Use
/// [`DetectionError::category`] to map an error onto a transport-level status.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The upload's file suffix is not one of the supported image formats.
    #[error(
        "Invalid file format `{extension}`. Supported formats: {}",
        SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedFormat { extension: String },
    /// The upload's declared content type is not an image type.
    #[error("Invalid content type `{content_type}`; expected an image/* upload")]
    UnsupportedContentType { content_type: String },
    /// The upload contained no bytes at all.
    #[error("Image payload is empty")]
    EmptyPayload,
    /// The bytes could not be interpreted as an image of a supported format.
    #[error("Image decoding failed: {0}")]
    Decode(#[source] image::ImageError),
    /// The decoded image has no pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    /// No contour approximated to a four-vertex polygon.
    #[error("No document boundary found among {contours} contours")]
    DocumentNotDetected { contours: usize },
    /// The crop region collapsed to zero width or height after clipping.
    #[error(
        "Crop region at ({x}, {y}) of size {width}x{height} is empty inside a {image_width}x{image_height} image"
    )]
    InvalidRegion {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    },
    /// Encoding the cropped image failed.
    #[error("Image encoding failed: {0}")]
    Encode(#[source] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`DetectionError`] for callers that need to
/// report it over a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input was not a usable image.
    BadInput,
    /// The image decoded fine but holds no recognisable ticket.
    NoDocument,
    /// Something went wrong that the caller could not have caused.
    Internal,
}

impl ErrorCategory {
    /// Conventional HTTP status code for the category.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCategory::BadInput => 400,
            ErrorCategory::NoDocument => 422,
            ErrorCategory::Internal => 500,
        }
    }
}

impl DetectionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DetectionError::UnsupportedFormat { .. }
            | DetectionError::UnsupportedContentType { .. }
            | DetectionError::EmptyPayload
            | DetectionError::Decode(_)
            | DetectionError::EmptyImage { .. } => ErrorCategory::BadInput,
            DetectionError::DocumentNotDetected { .. } => ErrorCategory::NoDocument,
            DetectionError::InvalidRegion { .. }
            | DetectionError::Encode(_)
            | DetectionError::Io(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod category {
        use super::*;

        #[test]
        fn decode_class_is_bad_input() {
            let errors = [
                DetectionError::UnsupportedFormat {
                    extension: ".pdf".into(),
                },
                DetectionError::UnsupportedContentType {
                    content_type: "text/plain".into(),
                },
                DetectionError::EmptyPayload,
                DetectionError::EmptyImage {
                    width: 0,
                    height: 4,
                },
            ];
            for err in errors {
                assert_eq!(err.category(), ErrorCategory::BadInput);
                assert_eq!(err.category().status_code(), 400);
            }
        }

        #[test]
        fn missing_document_is_unprocessable() {
            let err = DetectionError::DocumentNotDetected { contours: 3 };
            assert_eq!(err.category(), ErrorCategory::NoDocument);
            assert_eq!(err.category().status_code(), 422);
        }

        #[test]
        fn degenerate_region_is_internal() {
            let err = DetectionError::InvalidRegion {
                x: 10,
                y: 10,
                width: 0,
                height: 5,
                image_width: 20,
                image_height: 20,
            };
            assert_eq!(err.category(), ErrorCategory::Internal);
            assert_eq!(err.category().status_code(), 500);
        }
    }

    #[test]
    fn unsupported_format_lists_every_extension() {
        let err = DetectionError::UnsupportedFormat {
            extension: ".pdf".into(),
        };
        let message = err.to_string();
        for ext in SUPPORTED_EXTENSIONS {
            assert!(message.contains(ext), "missing {ext} in `{message}`");
        }
    }
}
