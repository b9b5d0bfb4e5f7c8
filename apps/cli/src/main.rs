//! tabby CLI: assemble structured records from tabby sheet directories.
//!
//! Loads a TSV sheet together with its context, override, sidecar, and
//! imported sibling sheets, and prints the assembled record as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
