//! Working tree layout
//!
//! Everything the pipeline writes lives under `<root>/data/` in a fixed set
//! of subdirectories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";
pub const MANIFEST_LINK: &str = "resfileindex.txt";
pub const LOADERS_LINK: &str = "bin64";

/// Fixed working tree rooted at a user-chosen directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn raw(&self) -> PathBuf {
        self.data().join("raw")
    }

    pub fn schema(&self) -> PathBuf {
        self.raw().join("schema")
    }

    pub fn pickle(&self) -> PathBuf {
        self.data().join("pickle")
    }

    pub fn json(&self) -> PathBuf {
        self.data().join("json")
    }

    pub fn static_files(&self) -> PathBuf {
        self.data().join("static")
    }

    pub fn sqlite(&self) -> PathBuf {
        self.data().join("sqlite")
    }

    pub fn fsdbinary(&self) -> PathBuf {
        self.data().join("fsdbinary")
    }

    pub fn extracted(&self) -> PathBuf {
        self.data().join("extracted")
    }

    /// Manifest as linked into the working tree by setup
    pub fn manifest(&self) -> PathBuf {
        self.data().join(MANIFEST_LINK)
    }

    /// Loader directory link the external decoder resolves relative to the root
    pub fn loaders(&self) -> PathBuf {
        self.root.join(LOADERS_LINK)
    }

    /// Directories holding symlinks created by the index step
    pub fn link_directories(&self) -> Vec<PathBuf> {
        vec![
            self.raw(),
            self.pickle(),
            self.static_files(),
            self.sqlite(),
            self.fsdbinary(),
        ]
    }

    /// Create every fixed directory. `raw/<logical>` subdirectories are
    /// created on demand by the router.
    pub fn ensure_directories(&self) -> io::Result<()> {
        for dir in [
            self.raw(),
            self.schema(),
            self.pickle(),
            self.json(),
            self.static_files(),
            self.sqlite(),
            self.fsdbinary(),
            self.extracted(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let ws = Workspace::new("/work");
        assert_eq!(ws.fsdbinary(), PathBuf::from("/work/data/fsdbinary"));
        assert_eq!(ws.schema(), PathBuf::from("/work/data/raw/schema"));
        assert_eq!(ws.manifest(), PathBuf::from("/work/data/resfileindex.txt"));
        assert_eq!(ws.loaders(), PathBuf::from("/work/bin64"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(temp_dir.path());
        ws.ensure_directories().unwrap();

        for dir in ["raw", "raw/schema", "pickle", "json", "static", "sqlite", "fsdbinary", "extracted"] {
            assert!(temp_dir.path().join("data").join(dir).is_dir(), "{} missing", dir);
        }

        // Second call is a no-op
        ws.ensure_directories().unwrap();
    }
}
