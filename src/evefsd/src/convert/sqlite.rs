//! SQLite detection and table export

use crate::error::Result;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Header every SQLite 3 database file starts with
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Check the first 16 bytes of `path` against [`SQLITE_MAGIC`].
/// Files shorter than the header never match.
pub fn is_sqlite(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// User tables in `path`, sorted by name
pub fn list_tables(path: &Path) -> Result<Vec<String>> {
    let conn = open(path)?;
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Every row of `table` as a JSON object keyed by column name
pub fn table_to_json(path: &Path, table: &str) -> Result<Vec<Value>> {
    let conn = open(path)?;
    let sql = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut out = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            object.insert(column.clone(), value_to_json(row.get_ref(i)?));
        }
        out.push(Value::Object(object));
    }

    Ok(out)
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}

/// Export every table of `path` to `<output_dir>/<table>.json`.
/// Returns the number of tables written.
pub fn export_tables(path: &Path, output_dir: &Path) -> Result<usize> {
    let tables = list_tables(path)?;
    fs::create_dir_all(output_dir)?;

    for table in &tables {
        let rows = table_to_json(path, table)?;
        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(output_dir.join(format!("{}.json", table)), json)?;
    }

    Ok(tables.len())
}
