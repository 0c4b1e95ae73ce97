use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::derive::blueprints::extract_blueprints;
use evefsd::RunStats;

/// Build the forward and reverse bill-of-materials maps
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    extract_blueprints(&ctx.workspace, &mut stats)
        .context("Failed to build blueprint materials (run the types step first)")?;
    Ok(stats)
}
