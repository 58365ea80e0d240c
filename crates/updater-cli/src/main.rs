use clap::Parser;
use std::process::ExitCode;

mod cli;
mod logging;

fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let args = cli::Cli::parse();
    cli::run(args)
}
