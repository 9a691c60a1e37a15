//! chanarchiver CLI: list or archive channels with no recent activity.

use anyhow::Result;
use chanarchiver::engine::arg_parser::Cli;
use chanarchiver::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let ok = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
