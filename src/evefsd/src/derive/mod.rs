//! Derived datasets
//!
//! Each builder is a pure function from already-decoded JSON documents to a
//! serializable result. The `extract_*` wrappers read their inputs from the
//! workspace, write their outputs to `data/extracted/`, and fail when a
//! required input is missing.
//!
//! - `types` - type name tables and group membership
//! - `blueprints` - manufacturing bill of materials, forward and reverse
//! - `stellar` - region, constellation and solar system names

pub mod blueprints;
pub mod stellar;
pub mod types;

use crate::error::{PipelineError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub use blueprints::{build_blueprint_index, extract_blueprints, BlueprintIndex};
pub use stellar::{build_cartography, extract_stellar, StellarCartography, StellarKind};
pub use types::{build_type_tables, extract_type_names, TypeTables};

/// ID → display name
pub type NameTable = BTreeMap<u64, String>;

/// Read and parse a required JSON document
pub fn load_json(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write `value` as pretty JSON, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Top-level object of a document, or a `Malformed` error naming it
pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| PipelineError::Malformed {
        what: what.to_string(),
        reason: "expected a JSON object".to_string(),
    })
}

/// Numeric ID from an object key
pub(crate) fn parse_id(key: &str) -> Option<u64> {
    key.trim().parse().ok()
}

/// Numeric ID from a JSON number or numeric string
pub(crate) fn value_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_id(s),
        _ => None,
    }
}

/// Name table as written by the type-name builder
pub fn name_table(value: &Value) -> Result<NameTable> {
    Ok(as_object(value, "name table")?
        .iter()
        .filter_map(|(key, name)| Some((parse_id(key)?, name.as_str()?.to_string())))
        .collect())
}
