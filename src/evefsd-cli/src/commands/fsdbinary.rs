use crate::context::Context;
use anyhow::{bail, Context as _, Result};
use evefsd::derive::load_json;
use evefsd::decode::LOADER_PATTERN;
use evefsd::{BinaryDecoder, ProcessDecoder, PythonLoaderDecoder, RunStats};
use std::fs;
use std::path::Path;

/// The loaders resolve `*NameID` fields through this table
const LOCALIZATION_PICKLE: &str = "localization_fsd_en-us.pickle";

fn count_with_extension(dir: &Path, extension: &str) -> Result<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == extension) {
            count += 1;
        }
    }
    Ok(count)
}

/// Run the external decoder over `data/fsdbinary/`, writing `data/json/`
pub fn run(ctx: &mut Context) -> Result<RunStats> {
    let mut stats = RunStats::new();
    let workspace = &ctx.workspace;

    let inputs = count_with_extension(&workspace.fsdbinary(), "fsdbinary")?;
    if inputs == 0 {
        bail!(
            "No fsdbinary files in {} (run the index step first)",
            workspace.fsdbinary().display()
        );
    }
    stats.set("fsdbinaryInputs", inputs);

    let localization = workspace.pickle().join(LOCALIZATION_PICKLE);
    if !localization.exists() {
        bail!("Localization table missing: {}", localization.display());
    }

    let decoder: Box<dyn BinaryDecoder> = match &ctx.config.decoder_command {
        Some(argv) => Box::new(
            ProcessDecoder::from_argv(argv).context("decoderCommand in config.json is empty")?,
        ),
        None => {
            let loaders = count_with_extension(&workspace.loaders(), "pyd")?;
            if loaders == 0 {
                tracing::warn!("No loader modules match {}", LOADER_PATTERN);
            }
            stats.set("loaderModules", loaders);
            Box::new(PythonLoaderDecoder::new(ctx.config.python()))
        }
    };
    decoder.decode(workspace)?;

    stats.set("jsonFiles", count_with_extension(&workspace.json(), "json")?);

    let types = workspace.json().join("types.json");
    if types.is_file() {
        let entries = load_json(&types)?
            .as_object()
            .map_or(0, |records| records.len() as u64);
        stats.set("typeEntries", entries);
    } else {
        tracing::warn!("Decoder did not produce {}", types.display());
    }

    tracing::info!(status = "ok", "Decoded {} fsdbinary files", inputs);
    Ok(stats)
}
