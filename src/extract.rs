use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use imageproc::point::Point;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::detect::Quadrilateral;
use crate::geometry::Extent;
use crate::{DetectionError, DetectionResult};

/// Axis-aligned crop rectangle, non-empty and inside its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Tight box around `points`, clipped to an `image_width` x `image_height` image.
    pub fn around(
        points: &[Point<i32>],
        image_width: u32,
        image_height: u32,
    ) -> DetectionResult<Self> {
        let extent = Extent::enclosing(points).ok_or(DetectionError::InvalidRegion {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            image_width,
            image_height,
        })?;
        Self::clipped(extent, image_width, image_height)
    }

    /// Clamp `extent` into the image. Fails when nothing of it remains.
    pub fn clipped(extent: Extent, image_width: u32, image_height: u32) -> DetectionResult<Self> {
        let (w, h) = (i64::from(image_width), i64::from(image_height));
        let x0 = extent.min_x.clamp(0, w);
        let x1 = extent.max_x.clamp(0, w);
        let y0 = extent.min_y.clamp(0, h);
        let y1 = extent.max_y.clamp(0, h);

        if x1 <= x0 || y1 <= y0 {
            return Err(DetectionError::InvalidRegion {
                x: extent.min_x,
                y: extent.min_y,
                width: extent.max_x - extent.min_x,
                height: extent.max_y - extent.min_y,
                image_width,
                image_height,
            });
        }

        // All four values lie in 0..=u32::MAX after clamping to the image.
        Ok(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Crop the bounding box of `quad` out of `image`.
///
/// The box is axis aligned, so a ticket photographed at an angle keeps its skew.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn crop_to_quad(
    image: DynamicImage,
    quad: &Quadrilateral,
) -> DetectionResult<(DynamicImage, BoundingBox)> {
    let bbox = BoundingBox::around(quad.vertices(), image.width(), image.height())?;
    let cropped = image.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
    debug!(?bbox, "Ticket region cropped");
    Ok((cropped, bbox))
}

/// Encode an image into `format`, converting pixel layouts the encoder cannot take.
///
/// Formats without a writer fall back to JPEG.
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> DetectionResult<(Vec<u8>, ImageFormat)> {
    let format = if format.writing_enabled() {
        format
    } else {
        ImageFormat::Jpeg
    };

    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let rgb = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            rgb.write_with_encoder(encoder)
                .map_err(DetectionError::Encode)?;
        }
        ImageFormat::Gif => {
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut buffer, format)
                .map_err(DetectionError::Encode)?;
        }
        _ => {
            to_8bit(image)
                .write_to(&mut buffer, format)
                .map_err(DetectionError::Encode)?;
        }
    }
    Ok((buffer.into_inner(), format))
}

fn to_8bit(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => image.clone(),
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
