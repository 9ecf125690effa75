use ticketscan::{DetectionResult, OutputSettings};

use crate::cli::{CropCommand, GlobalOptions};

use super::utils::{build_scanner, derive_variant_path, extension_for};

/// The main function to run the crop command.
pub fn run(global: &GlobalOptions, cmd: CropCommand) -> DetectionResult<()> {
    let output_settings = OutputSettings::default()
        .with_format(cmd.format.map(Into::into))
        .with_jpeg_quality(cmd.jpeg_quality);
    let scanner = build_scanner(global).with_output_settings(output_settings);

    let document = scanner.scan_path(&cmd.input)?;
    let output_path = cmd.output.clone().unwrap_or_else(|| {
        derive_variant_path(&cmd.input, "ticket", extension_for(document.output_format()))
    });

    document.save(&output_path)?;
    let bbox = document.bounding_box();
    println!(
        "Ticket {}x{} at ({}, {}) saved to {}",
        bbox.width,
        bbox.height,
        bbox.x,
        bbox.y,
        output_path.display()
    );

    Ok(())
}
