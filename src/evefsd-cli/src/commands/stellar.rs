use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::derive::stellar::extract_stellar;
use evefsd::RunStats;

pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    extract_stellar(&ctx.workspace, &mut stats).context("Failed to resolve stellar names")?;
    Ok(stats)
}
