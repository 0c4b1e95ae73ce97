//! Game installation discovery and validation.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "stillness";
pub const INDEX_FILE: &str = "resfileindex.txt";
pub const LOADERS_DIR: &str = "bin64";

/// A validated installation directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    root: PathBuf,
    server: String,
}

#[derive(Debug, Clone, Copy)]
enum MarkerKind {
    File,
    Directory,
}

impl Installation {
    /// Validate `path` against the marker paths for `server`.
    ///
    /// The root is canonicalized so links created from it stay valid
    /// regardless of the working directory.
    pub fn resolve(path: &Path, server: &str) -> Result<Self> {
        if !path.is_dir() {
            return Err(PipelineError::InvalidInstallation {
                path: path.to_path_buf(),
                missing: "installation directory".to_string(),
            });
        }

        for (marker, kind) in Self::markers(server) {
            let candidate = path.join(&marker);
            let present = match kind {
                MarkerKind::File => candidate.is_file(),
                MarkerKind::Directory => candidate.is_dir(),
            };
            if !present {
                return Err(PipelineError::InvalidInstallation {
                    path: path.to_path_buf(),
                    missing: marker.display().to_string(),
                });
            }
        }

        Ok(Installation {
            root: path.canonicalize()?,
            server: server.to_string(),
        })
    }

    fn markers(server: &str) -> [(PathBuf, MarkerKind); 2] {
        [
            (Path::new(server).join(INDEX_FILE), MarkerKind::File),
            (Path::new(server).join(LOADERS_DIR), MarkerKind::Directory),
        ]
    }

    /// Root against which manifest physical paths resolve
    pub fn resource_root(&self) -> &Path {
        &self.root
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(&self.server).join(INDEX_FILE)
    }

    pub fn loaders(&self) -> PathBuf {
        self.root.join(&self.server).join(LOADERS_DIR)
    }
}
