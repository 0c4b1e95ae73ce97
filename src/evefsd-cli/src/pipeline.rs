//! Sequencing of pipeline steps

use crate::cli::Step;
use crate::commands;
use crate::context::Context;
use anyhow::{Context as _, Result};
use evefsd::RunStats;

fn run_step(ctx: &mut Context, step: Step) -> Result<Option<RunStats>> {
    let stats = match step {
        Step::Setup if ctx.options.skip_setup => {
            tracing::info!("Skipping setup (--skip-setup)");
            return Ok(None);
        }
        Step::Setup => commands::setup::run(ctx)?,
        Step::Index => commands::index::run(ctx)?,
        Step::Fsdbinary => commands::fsdbinary::run(ctx)?,
        Step::Types => commands::types::run(ctx)?,
        Step::Blueprints => commands::blueprints::run(ctx)?,
        Step::Stellar => commands::stellar::run(ctx)?,
        Step::Cleanup => commands::cleanup::run(ctx)?,
        Step::All => return Ok(None),
    };
    Ok(Some(stats))
}

/// Run `steps` in order, stopping at the first failure
pub fn run(ctx: &mut Context, steps: &[Step]) -> Result<()> {
    let started = std::time::Instant::now();

    for &step in steps {
        tracing::info!("=== {} ===", step);

        let stats = run_step(ctx, step).with_context(|| format!("Step '{}' failed", step))?;

        if let Some(stats) = stats {
            tracing::info!(status = "ok", "{} finished: {}", step, stats.summary().render());
        }
    }

    tracing::info!(
        status = "ok",
        "Pipeline finished in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context;
    use std::fs;

    #[test]
    fn test_skip_setup_runs_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context(temp_dir.path(), None);
        ctx.options.skip_setup = true;

        run(&mut ctx, &[Step::Setup]).unwrap();
        assert!(!temp_dir.path().join("config.json").exists());
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context(temp_dir.path(), None);
        ctx.workspace.ensure_directories().unwrap();

        // No types.json: the types step fails and blueprints never runs
        fs::write(ctx.workspace.json().join("blueprints.json"), "{}").unwrap();
        let err = run(&mut ctx, &[Step::Types, Step::Blueprints]).unwrap_err();
        assert!(format!("{:#}", err).contains("types"));
        assert!(!ctx.workspace.extracted().join("blueprint_bom.json").exists());
    }

    #[test]
    fn test_derived_steps_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context(temp_dir.path(), None);
        ctx.workspace.ensure_directories().unwrap();

        let json = ctx.workspace.json();
        fs::write(
            json.join("types.json"),
            r#"{"34": {"typeNameID": "Tritanium", "groupID": 18, "published": 1},
                "500001": {"typeNameID": "Widget Blueprint", "groupID": 105, "published": 1},
                "600001": {"typeNameID": "Widget", "groupID": 200, "published": 0}}"#,
        )
        .unwrap();
        fs::write(
            json.join("blueprints.json"),
            r#"{"500001": {"activities": {"manufacturing": {
                "time": 600,
                "materials": [{"typeID": 34, "quantity": 10}],
                "products": [{"typeID": 600001, "quantity": 1}]}}}}"#,
        )
        .unwrap();

        run(&mut ctx, &[Step::Types, Step::Blueprints]).unwrap();

        let extracted = ctx.workspace.extracted();
        let usage: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(extracted.join("material_usage.json")).unwrap())
                .unwrap();
        assert_eq!(usage["34"]["name"], "Tritanium");
        assert_eq!(usage["34"]["usedIn"][0]["quantityRequired"], 10);
        assert_eq!(usage["34"]["usedIn"][0]["blueprintName"], "Widget Blueprint");
    }
}
