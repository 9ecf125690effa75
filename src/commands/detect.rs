use std::path::Path;

use serde::Serialize;
use ticketscan::{BoundaryMatch, BoundingBox, DetectionResult};

use crate::cli::{DetectCommand, GlobalOptions};

use super::utils::{build_scanner, load_input};

#[derive(Serialize)]
struct DetectReport<'a> {
    input: &'a Path,
    image_width: u32,
    image_height: u32,
    bounding_box: BoundingBox,
    #[serde(flatten)]
    boundary: &'a BoundaryMatch,
}

/// The main function to run the detect command.
pub fn run(global: &GlobalOptions, cmd: DetectCommand) -> DetectionResult<()> {
    let scanner = build_scanner(global);
    let loaded = load_input(&cmd.input)?;
    let (image_width, image_height) = (loaded.image.width(), loaded.image.height());
    let document = scanner.crop(loaded.image, loaded.format)?;

    let report = DetectReport {
        input: &cmd.input,
        image_width,
        image_height,
        bounding_box: document.bounding_box(),
        boundary: document.boundary(),
    };

    if cmd.json {
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{json}");
        return Ok(());
    }

    let bbox = report.bounding_box;
    println!("{} ({}x{})", cmd.input.display(), image_width, image_height);
    for (x, y) in report.boundary.quad.corners() {
        println!("  corner ({x}, {y})");
    }
    println!(
        "  box x={} y={} width={} height={}",
        bbox.x, bbox.y, bbox.width, bbox.height
    );
    println!(
        "  contour area {:.1}, matched after {} of {} contours",
        report.boundary.contour_area,
        report.boundary.contours_examined,
        report.boundary.contours_found
    );

    Ok(())
}
