//! Blueprint bill of materials
//!
//! Only the manufacturing activity is indexed. Blueprints without one are
//! counted and left out of both maps.

use super::types::TYPE_NAMES_FILE;
use super::{as_object, load_json, name_table, parse_id, save_json, value_id, NameTable};
use crate::error::Result;
use crate::stats::RunStats;
use crate::workspace::Workspace;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const BLUEPRINTS_INPUT: &str = "blueprints.json";
pub const BOM_FILE: &str = "blueprint_bom.json";
pub const MATERIAL_USAGE_FILE: &str = "material_usage.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialLine {
    #[serde(rename = "typeID")]
    pub type_id: u64,
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillOfMaterials {
    #[serde(rename = "blueprintTypeID")]
    pub blueprint_type_id: u64,
    pub blueprint_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_time: Option<u64>,
    pub materials: Vec<MaterialLine>,
    pub products: Vec<MaterialLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(rename = "blueprintTypeID")]
    pub blueprint_type_id: u64,
    pub blueprint_name: String,
    pub quantity_required: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    #[serde(rename = "typeID")]
    pub type_id: u64,
    pub name: String,
    pub used_in: Vec<Usage>,
}

#[derive(Debug, Default)]
pub struct BlueprintIndex {
    /// Blueprint → what it consumes and produces
    pub forward: BTreeMap<u64, BillOfMaterials>,
    /// Material → blueprints consuming it
    pub reverse: BTreeMap<u64, MaterialUsage>,
}

fn type_label(names: &NameTable, type_id: u64) -> String {
    names
        .get(&type_id)
        .cloned()
        .unwrap_or_else(|| format!("Type {}", type_id))
}

fn blueprint_label(names: &NameTable, type_id: u64) -> String {
    names
        .get(&type_id)
        .cloned()
        .unwrap_or_else(|| format!("Blueprint {}", type_id))
}

fn material_lines(activity: &Value, key: &str, names: &NameTable) -> Vec<MaterialLine> {
    activity
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let type_id = item.get("typeID").and_then(value_id)?;
                    Some(MaterialLine {
                        type_id,
                        name: type_label(names, type_id),
                        quantity: item.get("quantity").and_then(Value::as_u64).unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn build_blueprint_index(
    blueprints: &Value,
    names: &NameTable,
    stats: &mut RunStats,
) -> Result<BlueprintIndex> {
    let records = as_object(blueprints, BLUEPRINTS_INPUT)?;
    let mut index = BlueprintIndex::default();

    for (key, record) in records {
        let Some(blueprint_id) = parse_id(key) else {
            continue;
        };
        stats.increment_one("totalBlueprints");

        let Some(manufacturing) = record
            .get("activities")
            .and_then(|a| a.get("manufacturing"))
            .filter(|m| m.is_object())
        else {
            stats.increment_one("skippedBlueprints");
            continue;
        };
        stats.increment_one("manufacturingBlueprints");

        let bom = BillOfMaterials {
            blueprint_type_id: blueprint_id,
            blueprint_name: blueprint_label(names, blueprint_id),
            manufacturing_time: manufacturing.get("time").and_then(Value::as_u64),
            materials: material_lines(manufacturing, "materials", names),
            products: material_lines(manufacturing, "products", names),
        };

        for material in &bom.materials {
            index
                .reverse
                .entry(material.type_id)
                .or_insert_with(|| MaterialUsage {
                    type_id: material.type_id,
                    name: material.name.clone(),
                    used_in: Vec::new(),
                })
                .used_in
                .push(Usage {
                    blueprint_type_id: blueprint_id,
                    blueprint_name: bom.blueprint_name.clone(),
                    quantity_required: material.quantity,
                });
        }

        index.forward.insert(blueprint_id, bom);
    }

    stats.set("materialsIndexed", index.reverse.len() as u64);
    Ok(index)
}

/// Build the BOM maps from `json/blueprints.json` and the type name table
pub fn extract_blueprints(workspace: &Workspace, stats: &mut RunStats) -> Result<BlueprintIndex> {
    let blueprints = load_json(&workspace.json().join(BLUEPRINTS_INPUT))?;
    let names = name_table(&load_json(&workspace.extracted().join(TYPE_NAMES_FILE))?)?;

    let index = build_blueprint_index(&blueprints, &names, stats)?;

    let out = workspace.extracted();
    save_json(&out.join(BOM_FILE), &index.forward)?;
    save_json(&out.join(MATERIAL_USAGE_FILE), &index.reverse)?;

    tracing::info!(
        status = "ok",
        "Indexed {} manufacturing blueprints using {} materials",
        index.forward.len(),
        index.reverse.len()
    );

    Ok(index)
}
