//! Format converters
//!
//! - `pickle` - serialized Python objects to JSON, through an interpreter
//! - `sqlite` - signature probe and table export for SQLite databases

pub mod pickle;
pub mod sqlite;

use crate::error::Result;
use serde_json::Value;
use std::path::Path;

pub use pickle::{unwrap_envelope, PythonPickleConverter};
pub use sqlite::{export_tables, is_sqlite, list_tables, table_to_json, SQLITE_MAGIC};

/// Converts a serialized object file into a JSON value
pub trait ObjectConverter {
    fn convert(&self, source: &Path) -> Result<Value>;
}
