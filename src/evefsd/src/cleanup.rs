//! Removal of links created by setup and indexing
//!
//! Only symlinks are removed. Converted JSON and derived datasets stay.

use crate::error::Result;
use crate::stats::RunStats;
use crate::symlink;
use crate::workspace::Workspace;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const SYMLINKS_REMOVED: &str = "symlinksRemoved";
pub const CLEANUP_ERRORS: &str = "cleanupErrors";

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn remove(path: &Path, stats: &mut RunStats) {
    match symlink::remove_link(path) {
        Ok(()) => stats.increment_one(SYMLINKS_REMOVED),
        Err(e) => {
            tracing::warn!("Could not remove {}: {}", path.display(), e);
            stats.increment_one(CLEANUP_ERRORS);
        }
    }
}

/// Delete every symlink in the link directories, the manifest and loader
/// links, then prune empty directories left under `raw/`.
pub fn remove_links(workspace: &Workspace, stats: &mut RunStats) -> Result<()> {
    for dir in workspace.link_directories() {
        if !dir.is_dir() {
            continue;
        }
        let links: Vec<_> = WalkDir::new(&dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path_is_symlink())
            .map(|e| e.into_path())
            .collect();

        for link in links {
            remove(&link, stats);
        }
    }

    for link in [workspace.manifest(), workspace.loaders()] {
        if is_symlink(&link) {
            remove(&link, stats);
        }
    }

    prune_empty_dirs(&workspace.raw(), &workspace.schema())?;
    Ok(())
}

/// Remove empty directories below `root`, keeping `root` and `keep`
fn prune_empty_dirs(root: &Path, keep: &Path) -> Result<()> {
    if !root.is_dir() {
        return Ok(());
    }

    // Deepest first so parents empty out before they are checked
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let path = entry.path();
        if path == keep {
            continue;
        }
        if fs::read_dir(path)?.next().is_none() {
            fs::remove_dir(path)?;
        }
    }

    Ok(())
}
