//! File type classification
//!
//! Maps a manifest entry to its destination in the working tree. This is a
//! pure function of the entry and the workspace layout; acting on the result
//! is the router's job.

use crate::index::{sanitize_logical_path, IndexEntry};
use crate::workspace::Workspace;
use std::fmt;
use std::path::PathBuf;

/// Known manifest file types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Pickle,
    Static,
    FsdBinary,
    Schema,
    Other(String),
}

impl From<&str> for FileType {
    fn from(tag: &str) -> Self {
        match tag {
            "pickle" => FileType::Pickle,
            "static" => FileType::Static,
            "fsdbinary" => FileType::FsdBinary,
            "schema" => FileType::Schema,
            other => FileType::Other(other.to_string()),
        }
    }
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Pickle => "pickle",
            FileType::Static => "static",
            FileType::FsdBinary => "fsdbinary",
            FileType::Schema => "schema",
            FileType::Other(tag) => tag,
        }
    }

    /// Counter incremented when a link of this type is created
    pub fn linked_counter(&self) -> &'static str {
        match self {
            FileType::Pickle => "pickleLinked",
            FileType::Static => "staticLinked",
            FileType::FsdBinary => "fsdbinaryLinked",
            FileType::Schema => "schemaLinked",
            FileType::Other(_) => "rawLinked",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an entry goes and what else happens to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub file_type: FileType,
    pub directory: PathBuf,
    pub file_name: String,
    /// Static files get a signature probe for SQLite databases
    pub probe_sqlite: bool,
    /// Directory is not one of the fixed ones and must be created on demand
    pub create_directory: bool,
}

impl Classification {
    pub fn target(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Decide the destination for an entry
pub fn classify(entry: &IndexEntry, workspace: &Workspace) -> Classification {
    let file_type = FileType::from(entry.file_type.as_str());
    let name = &entry.file_name;

    let (directory, file_name, probe_sqlite, create_directory) = match &file_type {
        FileType::Pickle => (workspace.pickle(), format!("{}.pickle", name), false, false),
        FileType::Static => (workspace.static_files(), format!("{}.static", name), true, false),
        FileType::FsdBinary => (workspace.fsdbinary(), format!("{}.fsdbinary", name), false, false),
        FileType::Schema => (workspace.schema(), format!("{}.schema", name), false, true),
        FileType::Other(tag) => (
            workspace
                .raw()
                .join(sanitize_logical_path(&entry.logical_directory)),
            format!("{}.{}", name, tag),
            false,
            true,
        ),
    };

    Classification {
        file_type,
        directory,
        file_name,
        probe_sqlite,
        create_directory,
    }
}
