use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::RunStats;

/// Remove every link the pipeline created, keeping generated JSON
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    evefsd::cleanup::remove_links(&ctx.workspace, &mut stats).context("Cleanup failed")?;
    Ok(stats)
}
