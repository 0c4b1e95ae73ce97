use crate::context::Context;
use anyhow::{bail, Context as _, Result};
use evefsd::{symlink, RunStats};

/// Validate the installation, lay out the working tree and link the
/// manifest and loader directory into it
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();

    let install = ctx.installation()?;
    tracing::info!(
        "Using installation {} (server {})",
        install.resource_root().display(),
        install.server()
    );

    ctx.workspace.ensure_directories().with_context(|| {
        format!("Failed to create working tree under {}", ctx.workspace.root().display())
    })?;

    let links = [
        (install.manifest(), ctx.workspace.manifest()),
        (install.loaders(), ctx.workspace.loaders()),
    ];
    for (source, target) in &links {
        if !symlink::link(source, target) {
            bail!("Failed to link {} -> {}", target.display(), source.display());
        }
        stats.increment_one("linksCreated");
    }

    ctx.config.mark_setup(&install);
    ctx.save_config()?;

    tracing::info!(status = "ok", "Setup complete");
    Ok(stats)
}
