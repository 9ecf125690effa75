use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use imageproc::point::Point;
use ticketscan::extract::crop_to_quad;
use ticketscan::{
    DetectionError, DocumentScanner, ErrorCategory, Quadrilateral, SUPPORTED_EXTENSIONS,
    detect_and_crop_document,
};

const BACKGROUND: Rgb<u8> = Rgb([25, 30, 35]);
const PAPER: Rgb<u8> = Rgb([245, 245, 240]);

fn photo_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    for &(x0, y0, x1, y1) in rects {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, PAPER);
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut buf, format),
        _ => image.write_to(&mut buf, format),
    }
    .unwrap();
    buf.into_inner()
}

fn close_to(actual: u32, expected: u32) -> bool {
    (actual as i64 - expected as i64).abs() <= 5
}

#[test]
fn blank_image_has_no_document() {
    let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 90, PAPER));
    let err = detect_and_crop_document(&encode(&blank, ImageFormat::Png), "blank.png").unwrap_err();
    assert!(matches!(err, DetectionError::DocumentNotDetected { .. }), "{err:?}");
    assert_eq!(err.category(), ErrorCategory::NoDocument);
    assert_eq!(err.category().status_code(), 422);
}

#[test]
fn corrupt_bytes_fail_to_decode() {
    let truncated_jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];
    let err = detect_and_crop_document(&truncated_jpeg, "ticket.jpg").unwrap_err();
    assert!(matches!(err, DetectionError::Decode(_)), "{err:?}");

    let err = detect_and_crop_document(b"definitely not pixels", "ticket.png").unwrap_err();
    assert!(matches!(err, DetectionError::Decode(_)), "{err:?}");
    assert_eq!(err.category().status_code(), 400);
}

#[test]
fn empty_payload_is_rejected() {
    let err = detect_and_crop_document(&[], "ticket.png").unwrap_err();
    assert!(matches!(err, DetectionError::EmptyPayload));
}

#[test]
fn unsupported_extension_is_rejected_before_decoding() {
    let photo = photo_with_rects(300, 200, &[(50, 50, 250, 150)]);
    let err = detect_and_crop_document(&encode(&photo, ImageFormat::Png), "ticket.pdf").unwrap_err();
    assert!(matches!(err, DetectionError::UnsupportedFormat { ref extension } if extension == ".pdf"));
}

#[test]
fn synthetic_ticket_is_cropped_to_its_rectangle() {
    let photo = photo_with_rects(300, 200, &[(50, 50, 250, 150)]);
    let document = detect_and_crop_document(&encode(&photo, ImageFormat::Png), "ticket.png").unwrap();

    let bbox = document.bounding_box();
    assert!(close_to(bbox.x, 50), "{bbox:?}");
    assert!(close_to(bbox.y, 50), "{bbox:?}");
    assert!(close_to(bbox.right(), 250), "{bbox:?}");
    assert!(close_to(bbox.bottom(), 150), "{bbox:?}");

    let (w, h) = document.image().dimensions();
    assert!(close_to(w, 200) && close_to(h, 100), "{w}x{h}");
    assert_eq!((w, h), (bbox.width, bbox.height));
    assert_eq!(document.source_format(), ImageFormat::Png);
}

#[test]
fn detection_is_deterministic() {
    let bytes = encode(&photo_with_rects(300, 200, &[(40, 30, 260, 170)]), ImageFormat::Png);
    let scanner = DocumentScanner::new();
    let first = scanner.scan_bytes(&bytes).unwrap();
    let second = scanner.scan_bytes(&bytes).unwrap();

    assert_eq!(first.bounding_box(), second.bounding_box());
    assert_eq!(first.quad(), second.quad());
    assert_eq!(first.image().as_bytes(), second.image().as_bytes());
}

#[test]
fn larger_rectangle_wins_regardless_of_position() {
    let scanner = DocumentScanner::new();
    let cases = [
        // small on the left, large on the right
        ([(20, 20, 100, 80), (150, 60, 370, 260)], (150, 60, 220, 200)),
        // mirrored layout
        ([(30, 60, 250, 260), (300, 20, 380, 80)], (30, 60, 220, 200)),
    ];

    for (rects, (x, y, width, height)) in cases {
        let document = scanner
            .crop(photo_with_rects(400, 300, &rects), ImageFormat::Png)
            .unwrap();
        let bbox = document.bounding_box();
        assert!(close_to(bbox.x, x) && close_to(bbox.y, y), "{bbox:?}");
        assert!(close_to(bbox.width, width) && close_to(bbox.height, height), "{bbox:?}");
    }
}

#[test]
fn quad_outside_the_image_is_clipped() {
    let photo = photo_with_rects(100, 80, &[]);
    let quad = Quadrilateral::new([
        Point::new(-20, -10),
        Point::new(130, -10),
        Point::new(130, 60),
        Point::new(-20, 60),
    ]);
    let (cropped, bbox) = crop_to_quad(photo, &quad).unwrap();
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0, 0, 100, 60));
    assert_eq!(cropped.dimensions(), (100, 60));
}

#[test]
fn quad_entirely_outside_is_an_invalid_region() {
    let photo = photo_with_rects(100, 80, &[]);
    let quad = Quadrilateral::new([
        Point::new(150, 100),
        Point::new(200, 100),
        Point::new(200, 140),
        Point::new(150, 140),
    ]);
    let err = crop_to_quad(photo, &quad).unwrap_err();
    assert!(matches!(err, DetectionError::InvalidRegion { .. }), "{err:?}");
    assert_eq!(err.category(), ErrorCategory::Internal);
}

#[test]
fn every_supported_extension_decodes() {
    let photo = photo_with_rects(300, 200, &[(50, 50, 250, 150)]);
    for extension in SUPPORTED_EXTENSIONS {
        let format = ImageFormat::from_extension(extension.trim_start_matches('.')).unwrap();
        let bytes = encode(&photo, format);
        let filename = format!("ticket{}", extension.to_uppercase());

        let document = DocumentScanner::new()
            .scan_upload(&bytes, &filename, Some("image/any"))
            .unwrap_or_else(|err| panic!("{extension}: {err}"));
        assert_eq!(document.source_format(), format, "{extension}");

        let bbox = document.bounding_box();
        assert!(close_to(bbox.width, 200) && close_to(bbox.height, 100), "{extension}: {bbox:?}");
    }
}

#[test]
fn crop_keeps_source_pixels() {
    let photo = photo_with_rects(300, 200, &[(50, 50, 250, 150)]);
    let document = DocumentScanner::new().crop(photo.clone(), ImageFormat::Png).unwrap();
    let bbox = document.bounding_box();
    let expected = photo.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
    assert_eq!(document.image().as_bytes(), expected.as_bytes());
}

#[test]
fn save_and_scan_path_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ticket.png");
    photo_with_rects(300, 200, &[(50, 50, 250, 150)]).save(&input).unwrap();

    let document = DocumentScanner::new().scan_path(&input).unwrap();
    let output = dir.path().join("ticket-crop.jpg");
    document.save(&output).unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Jpeg);
    let reloaded = image::load_from_memory(&written).unwrap();
    assert_eq!(reloaded.dimensions(), document.image().dimensions());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DocumentScanner::new()
        .scan_path(dir.path().join("absent.png"))
        .unwrap_err();
    assert!(matches!(err, DetectionError::Io(_)));
}
