//! Stellar cartography names
//!
//! Names are resolved in three stages:
//!
//! 1. collect region, constellation and solar system IDs from the star map
//! 2. map each ID to a localization message ID through its label
//!    (`solar_system_<id>`, `constellation_<id>`, `region_<id>`)
//! 3. look the message ID up in the English string table
//!
//! IDs that fall out of the chain get a `<Kind>_<id>` placeholder.

use super::{as_object, load_json, parse_id, save_json, value_id, NameTable};
use crate::convert::unwrap_envelope;
use crate::error::Result;
use crate::stats::RunStats;
use crate::workspace::Workspace;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

pub const STARMAP_INPUT: &str = "starmapcache.json";
pub const LABELS_INPUT: &str = "localization_fsd_main.json";
pub const STRINGS_INPUT: &str = "localization_fsd_en-us.json";
pub const NAMES_FILE: &str = "stellar_names.json";
pub const CARTOGRAPHY_FILE: &str = "stellar_cartography.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StellarKind {
    System,
    Constellation,
    Region,
}

impl StellarKind {
    pub const ALL: [StellarKind; 3] = [
        StellarKind::System,
        StellarKind::Constellation,
        StellarKind::Region,
    ];

    /// Key holding records of this kind in the star map
    fn map_key(self) -> &'static str {
        match self {
            StellarKind::System => "solarSystems",
            StellarKind::Constellation => "constellations",
            StellarKind::Region => "regions",
        }
    }

    /// Field referencing a single ID of this kind
    fn id_field(self) -> &'static str {
        match self {
            StellarKind::System => "solarSystemID",
            StellarKind::Constellation => "constellationID",
            StellarKind::Region => "regionID",
        }
    }

    /// Field referencing a list of IDs of this kind
    fn ids_field(self) -> &'static str {
        match self {
            StellarKind::System => "solarSystemIDs",
            StellarKind::Constellation => "constellationIDs",
            StellarKind::Region => "regionIDs",
        }
    }

    fn label_prefix(self) -> &'static str {
        match self {
            StellarKind::System => "solar_system_",
            StellarKind::Constellation => "constellation_",
            StellarKind::Region => "region_",
        }
    }

    /// Localization folder the labels of this kind live under
    fn category_path(self) -> &'static str {
        match self {
            StellarKind::System => "Map/SolarSystems",
            StellarKind::Constellation => "Map/Constellations",
            StellarKind::Region => "Map/Regions",
        }
    }

    fn fallback_prefix(self) -> &'static str {
        match self {
            StellarKind::System => "System",
            StellarKind::Constellation => "Constellation",
            StellarKind::Region => "Region",
        }
    }

    /// Plural used in output keys and file names
    pub fn plural(self) -> &'static str {
        match self {
            StellarKind::System => "systems",
            StellarKind::Constellation => "constellations",
            StellarKind::Region => "regions",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            StellarKind::System => "system",
            StellarKind::Constellation => "constellation",
            StellarKind::Region => "region",
        }
    }

    pub fn names_file(self) -> String {
        format!("{}_names.json", self.singular())
    }

    pub fn comprehensive_file(self) -> String {
        format!("{}_comprehensive.json", self.plural())
    }

    pub fn fallback_name(self, id: u64) -> String {
        format!("{}_{}", self.fallback_prefix(), id)
    }

    fn from_map_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.map_key() == key)
    }

    fn from_id_field(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id_field() == key)
    }

    fn from_ids_field(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.ids_field() == key)
    }
}

/// Every ID seen in the star map, with the first record found for it
#[derive(Debug, Default)]
pub struct StarCatalog {
    entries: BTreeMap<StellarKind, BTreeMap<u64, Map<String, Value>>>,
}

impl StarCatalog {
    fn reference(&mut self, kind: StellarKind, id: u64) {
        self.entries.entry(kind).or_default().entry(id).or_default();
    }

    fn record(&mut self, kind: StellarKind, id: u64, record: &Value) {
        let slot = self.entries.entry(kind).or_default().entry(id).or_default();
        let Some(fields) = record.as_object() else {
            return;
        };
        if !slot.is_empty() {
            return;
        }
        for (key, value) in fields {
            // Nested child maps are catalogued on their own
            if StellarKind::from_map_key(key).is_none() {
                slot.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn ids(&self, kind: StellarKind) -> impl Iterator<Item = u64> + '_ {
        self.entries
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.keys().copied())
    }

    pub fn contains(&self, kind: StellarKind, id: u64) -> bool {
        self.entries
            .get(&kind)
            .is_some_and(|ids| ids.contains_key(&id))
    }

    pub fn len(&self, kind: StellarKind) -> usize {
        self.entries.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, kind: StellarKind) -> bool {
        self.len(kind) == 0
    }

    fn fields(&self, kind: StellarKind, id: u64) -> Option<&Map<String, Value>> {
        self.entries.get(&kind)?.get(&id)
    }
}

fn reference_ids(value: &Value, kind: StellarKind, catalog: &mut StarCatalog) {
    match value {
        Value::Array(items) => {
            for id in items.iter().filter_map(value_id) {
                catalog.reference(kind, id);
            }
        }
        other => {
            if let Some(id) = value_id(other) {
                catalog.reference(kind, id);
            }
        }
    }
}

fn walk(value: &Value, catalog: &mut StarCatalog) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if let Some(kind) = StellarKind::from_map_key(key) {
                    match child {
                        Value::Object(records) => {
                            for (id, record) in records {
                                if let Some(id) = parse_id(id) {
                                    catalog.record(kind, id, record);
                                }
                            }
                        }
                        other => reference_ids(other, kind, catalog),
                    }
                } else if let Some(kind) = StellarKind::from_id_field(key) {
                    reference_ids(child, kind, catalog);
                } else if let Some(kind) = StellarKind::from_ids_field(key) {
                    reference_ids(child, kind, catalog);
                }
                walk(child, catalog);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, catalog);
            }
        }
        _ => {}
    }
}

/// Stage 1: every region, constellation and system ID in the star map
pub fn collect_ids(starmap: &Value) -> StarCatalog {
    let mut catalog = StarCatalog::default();
    walk(starmap, &mut catalog);
    catalog
}

/// Stage 2: `(kind, id)` → message ID, for IDs present in the catalog.
/// The first matching label wins.
pub fn resolve_message_ids(
    labels: &Value,
    catalog: &StarCatalog,
) -> Result<HashMap<(StellarKind, u64), u64>> {
    let labels = labels.get("labels").filter(|l| l.is_object()).unwrap_or(labels);
    let entries = as_object(labels, LABELS_INPUT)?;
    let mut resolved = HashMap::new();

    for (message_key, entry) in entries {
        let Some(message_id) = parse_id(message_key) else {
            continue;
        };
        let Some(label) = entry.get("label").and_then(Value::as_str) else {
            continue;
        };
        let path = entry
            .get("FullPath")
            .or_else(|| entry.get("fullPath"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        for kind in StellarKind::ALL {
            let Some(id) = label.strip_prefix(kind.label_prefix()).and_then(parse_id) else {
                continue;
            };
            if !path.starts_with(&kind.category_path().to_ascii_lowercase()) {
                continue;
            }
            if catalog.contains(kind, id) {
                resolved.entry((kind, id)).or_insert(message_id);
            }
        }
    }

    Ok(resolved)
}

/// Stage 3: first element of the string table entry, when present and non-null
fn lookup_string(strings: &Map<String, Value>, message_id: u64) -> Option<String> {
    match strings.get(&message_id.to_string())? {
        Value::Array(items) => match items.first()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct KindSummary {
    pub total: usize,
    pub resolved: usize,
    pub fallback: usize,
}

#[derive(Debug, Default)]
pub struct StellarCartography {
    pub names: BTreeMap<StellarKind, NameTable>,
    pub comprehensive: BTreeMap<StellarKind, BTreeMap<u64, Map<String, Value>>>,
    pub summary: BTreeMap<StellarKind, KindSummary>,
}

impl StellarCartography {
    pub fn name(&self, kind: StellarKind, id: u64) -> Option<&str> {
        self.names.get(&kind)?.get(&id).map(String::as_str)
    }

    /// All three name tables keyed by kind plural
    pub fn combined_names(&self) -> Value {
        let mut out = Map::new();
        for kind in StellarKind::ALL {
            out.insert(
                kind.plural().to_string(),
                json!(self.names.get(&kind).cloned().unwrap_or_default()),
            );
        }
        Value::Object(out)
    }

    /// Summary counts plus every comprehensive table
    pub fn grand_document(&self) -> Value {
        let mut summary = Map::new();
        let mut out = Map::new();
        for kind in StellarKind::ALL {
            summary.insert(
                kind.plural().to_string(),
                json!(self.summary.get(&kind).copied().unwrap_or_default()),
            );
            out.insert(
                kind.plural().to_string(),
                json!(self.comprehensive.get(&kind).cloned().unwrap_or_default()),
            );
        }
        summary.insert("generatedAt".to_string(), json!(Utc::now().to_rfc3339()));
        out.insert("summary".to_string(), Value::Object(summary));
        Value::Object(out)
    }
}

pub fn build_cartography(
    starmap: &Value,
    labels: &Value,
    strings: &Value,
    stats: &mut RunStats,
) -> Result<StellarCartography> {
    let catalog = collect_ids(starmap);
    let message_ids = resolve_message_ids(labels, &catalog)?;
    let strings = as_object(strings, STRINGS_INPUT)?;

    let mut out = StellarCartography::default();

    for kind in StellarKind::ALL {
        let mut names = NameTable::new();
        let mut comprehensive = BTreeMap::new();
        let mut summary = KindSummary::default();

        for id in catalog.ids(kind) {
            let resolved = message_ids
                .get(&(kind, id))
                .and_then(|message_id| lookup_string(strings, *message_id));

            summary.total += 1;
            let name = match resolved {
                Some(name) => {
                    summary.resolved += 1;
                    name
                }
                None => {
                    summary.fallback += 1;
                    kind.fallback_name(id)
                }
            };

            let mut fields = catalog.fields(kind, id).cloned().unwrap_or_default();
            fields.insert("name".to_string(), Value::String(name.clone()));
            comprehensive.insert(id, fields);
            names.insert(id, name);
        }

        stats.set(&format!("{}Found", kind.plural()), summary.total as u64);
        stats.set(&format!("{}Resolved", kind.plural()), summary.resolved as u64);
        stats.set(&format!("{}Fallback", kind.plural()), summary.fallback as u64);

        out.names.insert(kind, names);
        out.comprehensive.insert(kind, comprehensive);
        out.summary.insert(kind, summary);
    }

    Ok(out)
}

/// Resolve stellar names from the star map and localization tables and
/// write every label and comprehensive file to `extracted/`
pub fn extract_stellar(workspace: &Workspace, stats: &mut RunStats) -> Result<StellarCartography> {
    let json_dir = workspace.json();
    let starmap = unwrap_envelope(load_json(&json_dir.join(STARMAP_INPUT))?);
    let labels = unwrap_envelope(load_json(&json_dir.join(LABELS_INPUT))?);
    let strings = unwrap_envelope(load_json(&json_dir.join(STRINGS_INPUT))?);

    let cartography = build_cartography(&starmap, &labels, &strings, stats)?;

    let out = workspace.extracted();
    for kind in StellarKind::ALL {
        let names = cartography.names.get(&kind).cloned().unwrap_or_default();
        save_json(&out.join(kind.names_file()), &names)?;

        let comprehensive = cartography
            .comprehensive
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        save_json(&out.join(kind.comprehensive_file()), &comprehensive)?;
    }
    save_json(&out.join(NAMES_FILE), &cartography.combined_names())?;
    save_json(&out.join(CARTOGRAPHY_FILE), &cartography.grand_document())?;

    for kind in StellarKind::ALL {
        let summary = cartography.summary.get(&kind).copied().unwrap_or_default();
        tracing::info!(
            status = "ok",
            "{}: {} found, {} named, {} placeholders",
            kind.plural(),
            summary.total,
            summary.resolved,
            summary.fallback
        );
    }

    Ok(cartography)
}
