//! Single manifest line decoding
//!
//! Line grammar:
//!
//! ```text
//! <logicalPath><fileNameStem>.<fileType>,<physicalRelativePath>[,<ignored>...]
//! ```
//!
//! `logicalPath` runs up to and including the last `/` or `\` before the
//! file name. The stem is everything between that separator and the final
//! `.`; the type is what follows the final `.` up to the first comma. The
//! physical path runs from the first comma to the next comma or line end.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

const RES_PREFIX: &str = "res:";

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<dir>[^,]*[/\\])?(?P<stem>[^,/\\]+)\.(?P<ty>[^.,/\\]+),(?P<phys>[^,]*)")
            .unwrap()
    })
}

/// One decoded manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Logical directory exactly as written, trailing separator included
    pub logical_directory: String,
    pub file_name: String,
    pub file_type: String,
    pub physical_relative_path: String,
}

impl IndexEntry {
    /// Decode a manifest line, `None` when it does not match the grammar
    pub fn parse(line: &str) -> Option<Self> {
        let caps = line_pattern().captures(line)?;

        let physical = caps.name("phys")?.as_str().trim();
        if physical.is_empty() {
            return None;
        }

        Some(IndexEntry {
            logical_directory: caps
                .name("dir")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            file_name: caps.name("stem")?.as_str().to_string(),
            file_type: caps.name("ty")?.as_str().to_string(),
            physical_relative_path: physical.to_string(),
        })
    }

    /// Source file location under `resource_root`. Root, `.` and `..`
    /// components are dropped so the result never leaves `resource_root`.
    pub fn source_path(&self, resource_root: &Path) -> PathBuf {
        let relative: PathBuf = self
            .physical_relative_path
            .split(['/', '\\'])
            .flat_map(|part| Path::new(part).components())
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        resource_root.join(relative)
    }

    /// `<stem>.<type>`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.file_name, self.file_type)
    }
}

/// Turn a logical directory into a relative, filesystem-safe path.
///
/// Strips `res:`, maps `:` and `\` to `_`, trims leading underscores and
/// slashes, and drops empty, `.` and `..` components.
pub fn sanitize_logical_path(logical: &str) -> PathBuf {
    let stripped = logical.strip_prefix(RES_PREFIX).unwrap_or(logical);
    let replaced = stripped.replace([':', '\\'], "_");
    let trimmed = replaced.trim_start_matches(['_', '/']);

    Path::new(trimmed)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
