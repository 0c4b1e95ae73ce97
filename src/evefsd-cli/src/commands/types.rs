use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::derive::types::extract_type_names;
use evefsd::RunStats;

/// Build the type name, published subset and group tables
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    extract_type_names(&ctx.workspace, &mut stats).context("Failed to extract type names")?;
    Ok(stats)
}
