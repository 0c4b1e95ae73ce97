mod cli;
mod commands;
mod config;
mod context;
mod logging;
mod pipeline;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Step};
use context::Context;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let steps = Step::resolve(&cli.steps);
    let mut ctx = Context::new(&cli)?;

    pipeline::run(&mut ctx, &steps)
}
