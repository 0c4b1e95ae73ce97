use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::{scan_manifest, PythonPickleConverter, Router, RunStats};

/// Scan the resource index and route every entry into the working tree
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    let install = ctx.installation()?;

    ctx.workspace
        .ensure_directories()
        .context("Failed to create working tree")?;

    let mut manifest = ctx.workspace.manifest();
    if !manifest.exists() {
        tracing::debug!("{} not linked, reading the installation copy", manifest.display());
        manifest = install.manifest();
    }

    let pickles =
        PythonPickleConverter::new(ctx.config.python()).with_working_dir(ctx.workspace.root());
    let router = Router::new(&ctx.workspace, &pickles, ctx.options.route());

    scan_manifest(&manifest, install.resource_root(), &router, &mut stats)
        .with_context(|| format!("Failed to scan {}", manifest.display()))?;

    Ok(stats)
}
