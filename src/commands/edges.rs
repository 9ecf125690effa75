use ticketscan::DetectionResult;

use crate::cli::{EdgesCommand, GlobalOptions};

use super::utils::{build_scanner, derive_variant_path, load_input};

/// The main function to run the edges command.
pub fn run(global: &GlobalOptions, cmd: EdgesCommand) -> DetectionResult<()> {
    let scanner = build_scanner(global);
    let loaded = load_input(&cmd.input)?;
    let edges = scanner.edges(&loaded.image)?;
    drop(loaded);

    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "edges", "png"));
    edges.save(&output_path)?;
    println!(
        "Edge map ({} edge pixels) saved to {}",
        edges.edge_pixel_count(),
        output_path.display()
    );

    Ok(())
}
