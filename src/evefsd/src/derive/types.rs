//! Type name lookup tables

use super::{as_object, load_json, parse_id, save_json, NameTable};
use crate::error::Result;
use crate::stats::RunStats;
use crate::workspace::Workspace;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const TYPES_INPUT: &str = "types.json";
pub const TYPE_NAMES_FILE: &str = "type_names.json";
pub const PUBLISHED_NAMES_FILE: &str = "type_names_published.json";
pub const GROUPS_FILE: &str = "types_by_group.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    #[serde(rename = "typeID")]
    pub type_id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct TypeTables {
    /// Every type with a non-empty name
    pub names: NameTable,
    /// Named types whose `published` flag is exactly `1`
    pub published: NameTable,
    /// Every type with a `groupID`, named or not
    pub groups: BTreeMap<u64, Vec<GroupMember>>,
}

/// Display name of a type record.
///
/// The decoder resolves `typeNameID` to its English string; older dumps
/// carry a `name` that is either a string or a per-language object.
fn type_name(record: &Value) -> Option<String> {
    let name = record
        .get("typeNameID")
        .and_then(Value::as_str)
        .or_else(|| match record.get("name")? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(langs) => langs.get("en").and_then(Value::as_str),
            _ => None,
        })?
        .trim();

    (!name.is_empty()).then(|| name.to_string())
}

pub fn build_type_tables(types: &Value, stats: &mut RunStats) -> Result<TypeTables> {
    let records = as_object(types, TYPES_INPUT)?;
    let mut tables = TypeTables::default();

    for (key, record) in records {
        let Some(type_id) = parse_id(key) else {
            continue;
        };
        stats.increment_one("totalTypes");

        let name = type_name(record);

        if let Some(name) = &name {
            tables.names.insert(type_id, name.clone());
            if record.get("published").and_then(Value::as_u64) == Some(1) {
                tables.published.insert(type_id, name.clone());
            }
        }

        match record.get("groupID").and_then(Value::as_u64) {
            Some(group_id) => tables.groups.entry(group_id).or_default().push(GroupMember {
                type_id,
                name,
            }),
            None => stats.increment_one("ungroupedTypes"),
        }
    }

    stats.set("namedTypes", tables.names.len() as u64);
    stats.set("publishedTypes", tables.published.len() as u64);
    stats.set("groups", tables.groups.len() as u64);

    Ok(tables)
}

/// Build the type tables from `json/types.json` and write them to `extracted/`
pub fn extract_type_names(workspace: &Workspace, stats: &mut RunStats) -> Result<TypeTables> {
    let types = load_json(&workspace.json().join(TYPES_INPUT))?;
    let tables = build_type_tables(&types, stats)?;

    let out = workspace.extracted();
    save_json(&out.join(TYPE_NAMES_FILE), &tables.names)?;
    save_json(&out.join(PUBLISHED_NAMES_FILE), &tables.published)?;
    save_json(&out.join(GROUPS_FILE), &tables.groups)?;

    tracing::info!(
        status = "ok",
        "Wrote {} type names ({} published) in {} groups",
        tables.names.len(),
        tables.published.len(),
        tables.groups.len()
    );

    Ok(tables)
}
