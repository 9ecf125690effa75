mod crop;
mod detect;
mod edges;
mod utils;

use crate::cli::{Cli, Commands, GlobalOptions};
use ticketscan::DetectionResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> DetectionResult<()> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> DetectionResult<()> {
    match command {
        Commands::Crop(cmd) => crop::run(global, cmd),
        Commands::Detect(cmd) => detect::run(global, cmd),
        Commands::Edges(cmd) => edges::run(global, cmd),
    }
}
