//! Resource index scanning
//!
//! The manifest lists every resource the client knows about, one per line.
//! Scanning reads it once, top to bottom, and hands each entry whose source
//! file exists to an [`EntryHandler`].

mod entry;
mod reader;

pub use entry::{sanitize_logical_path, IndexEntry};
pub use reader::ManifestReader;

use crate::error::{PipelineError, Result};
use crate::stats::RunStats;
use std::path::Path;

/// Progress is logged every this many processed entries
pub const PROGRESS_INTERVAL: u64 = 1000;

pub const TOTAL_PROCESSED: &str = "totalProcessed";
pub const HANDLER_ERRORS: &str = "handlerErrors";

/// Per-entry action taken during a scan
pub trait EntryHandler {
    fn handle(&self, entry: &IndexEntry, source: &Path, stats: &mut RunStats) -> Result<()>;

    /// Called every [`PROGRESS_INTERVAL`] processed entries
    fn progress(&self, _processed: u64) {}
}

/// Scan `manifest`, resolving physical paths under `resource_root`.
///
/// Missing inputs are fatal. A failing handler is logged and counted, and
/// the scan moves on to the next line.
pub fn scan_manifest(
    manifest: &Path,
    resource_root: &Path,
    handler: &dyn EntryHandler,
    stats: &mut RunStats,
) -> Result<()> {
    if !manifest.is_file() {
        return Err(PipelineError::MissingInput(manifest.to_path_buf()));
    }
    if !resource_root.is_dir() {
        return Err(PipelineError::MissingInput(resource_root.to_path_buf()));
    }

    tracing::info!("Scanning {}", manifest.display());

    for entry in ManifestReader::open(manifest)? {
        let entry = entry?;
        let source = entry.source_path(resource_root);

        if !source.exists() {
            tracing::debug!("Source missing for {}: {}", entry.full_name(), source.display());
            continue;
        }

        if let Err(e) = handler.handle(&entry, &source, stats) {
            tracing::warn!("Failed to handle {}: {}", entry.full_name(), e);
            stats.increment_one(HANDLER_ERRORS);
        }

        stats.increment_one(TOTAL_PROCESSED);
        let processed = stats.get(TOTAL_PROCESSED);
        if processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(target: "evefsd::progress", processed, "Processed {} entries", processed);
            handler.progress(processed);
        }
    }

    Ok(())
}
