//! Acting on classifications: links, probes and conversions

use crate::classify::{classify, FileType};
use crate::convert::{self, ObjectConverter};
use crate::error::Result;
use crate::index::{EntryHandler, IndexEntry};
use crate::stats::RunStats;
use crate::symlink;
use crate::workspace::Workspace;
use std::fs;
use std::path::Path;

pub const SYMLINK_ERRORS: &str = "symlinkErrors";
pub const PROBE_ERRORS: &str = "probeErrors";
pub const SQLITE_LINKED: &str = "sqliteLinked";
pub const PICKLE_CONVERTED: &str = "pickleConverted";
pub const PICKLE_FAILED: &str = "pickleFailed";
pub const PICKLE_SKIPPED: &str = "pickleSkipped";
pub const SQLITE_TABLES_EXPORTED: &str = "sqliteTablesExported";
pub const SQLITE_EXPORT_FAILED: &str = "sqliteExportFailed";

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteOptions {
    /// Reconvert pickles whose JSON already exists
    pub force: bool,
    /// Export the tables of every detected SQLite database
    pub deep: bool,
}

/// Index entry handler that links each entry into the workspace
pub struct Router<'a> {
    workspace: &'a Workspace,
    pickles: &'a dyn ObjectConverter,
    options: RouteOptions,
}

impl<'a> Router<'a> {
    pub fn new(
        workspace: &'a Workspace,
        pickles: &'a dyn ObjectConverter,
        options: RouteOptions,
    ) -> Self {
        Router {
            workspace,
            pickles,
            options,
        }
    }

    fn convert_pickle(&self, entry: &IndexEntry, source: &Path, stats: &mut RunStats) {
        let output = self
            .workspace
            .json()
            .join(format!("{}.json", entry.file_name));

        if output.exists() && !self.options.force {
            tracing::debug!("Skipping {}, already converted", entry.full_name());
            stats.increment_one(PICKLE_SKIPPED);
            return;
        }

        let written = self.pickles.convert(source).and_then(|value| {
            let json = serde_json::to_string_pretty(&value)?;
            fs::write(&output, json)?;
            Ok(())
        });

        match written {
            Ok(()) => {
                tracing::debug!("Converted {} to {}", entry.full_name(), output.display());
                stats.increment_one(PICKLE_CONVERTED);
            }
            Err(e) => {
                tracing::warn!("Could not convert {}: {}", entry.full_name(), e);
                stats.increment_one(PICKLE_FAILED);
            }
        }
    }

    fn probe_static(&self, entry: &IndexEntry, source: &Path, stats: &mut RunStats) {
        match convert::is_sqlite(source) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                tracing::warn!("Could not probe {}: {}", entry.full_name(), e);
                stats.increment_one(PROBE_ERRORS);
                return;
            }
        }

        let target = self
            .workspace
            .sqlite()
            .join(format!("{}.sqlite", entry.file_name));
        if symlink::link(source, &target) {
            stats.increment_one(SQLITE_LINKED);
        } else {
            stats.increment_one(SYMLINK_ERRORS);
        }

        if self.options.deep {
            let output = self.workspace.json().join(&entry.file_name);
            match convert::export_tables(source, &output) {
                Ok(tables) => stats.increment(SQLITE_TABLES_EXPORTED, tables as u64),
                Err(e) => {
                    tracing::warn!("Could not export tables of {}: {}", entry.full_name(), e);
                    stats.increment_one(SQLITE_EXPORT_FAILED);
                }
            }
        }
    }
}

impl EntryHandler for Router<'_> {
    fn handle(&self, entry: &IndexEntry, source: &Path, stats: &mut RunStats) -> Result<()> {
        let classification = classify(entry, self.workspace);

        if classification.create_directory {
            fs::create_dir_all(&classification.directory)?;
        }

        if !symlink::link(source, &classification.target()) {
            stats.increment_one(SYMLINK_ERRORS);
            return Ok(());
        }
        stats.increment_one(classification.file_type.linked_counter());

        match classification.file_type {
            FileType::Pickle => self.convert_pickle(entry, source, stats),
            FileType::Static if classification.probe_sqlite => {
                self.probe_static(entry, source, stats)
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::index::{scan_manifest, TOTAL_PROCESSED};
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::path::PathBuf;

    /// Reads the source as JSON instead of unpickling it
    #[derive(Default)]
    struct JsonPickles {
        calls: Cell<usize>,
    }

    impl ObjectConverter for JsonPickles {
        fn convert(&self, source: &Path) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            let data = fs::read(source)?;
            serde_json::from_slice(&data).map_err(|e| PipelineError::Conversion {
                path: source.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }

    struct Fixture {
        _temp: tempfile::TempDir,
        workspace: Workspace,
        game: PathBuf,
        manifest: PathBuf,
    }

    fn fixture(manifest: &str, sources: &[(&str, &[u8])]) -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(temp.path().join("work"));
        workspace.ensure_directories().unwrap();

        let game = temp.path().join("game");
        fs::create_dir_all(&game).unwrap();
        for (path, content) in sources {
            let full = game.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }

        let manifest_path = temp.path().join("resfileindex.txt");
        fs::write(&manifest_path, manifest).unwrap();

        Fixture {
            _temp: temp,
            workspace,
            game,
            manifest: manifest_path,
        }
    }

    fn run(fx: &Fixture, pickles: &dyn ObjectConverter, options: RouteOptions) -> RunStats {
        let router = Router::new(&fx.workspace, pickles, options);
        let mut stats = RunStats::new();
        scan_manifest(&fx.manifest, &fx.game, &router, &mut stats).unwrap();
        stats
    }

    fn sqlite_bytes() -> Vec<u8> {
        let mut bytes = b"SQLite format 3\0".to_vec();
        bytes.extend_from_slice(&[0u8; 84]);
        bytes
    }

    #[test]
    fn test_fsdbinary_entry() {
        let fx = fixture(
            "res:fsd/types.fsdbinary,stillness/ResFiles/ab/cd1234\n",
            &[("stillness/ResFiles/ab/cd1234", b"binary")],
        );
        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        let link = fx.workspace.fsdbinary().join("types.fsdbinary");
        assert_eq!(
            fs::read_link(&link).unwrap(),
            fx.game.join("stillness/ResFiles/ab/cd1234")
        );
        assert_eq!(stats.get(TOTAL_PROCESSED), 1);
        assert_eq!(stats.get("fsdbinaryLinked"), 1);
    }

    #[test]
    fn test_static_sqlite_gets_two_links() {
        let db = sqlite_bytes();
        let fx = fixture(
            "res:/staticdata/mapdata.static,ab/db01\n",
            &[("ab/db01", db.as_slice())],
        );
        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        assert!(fs::read_link(fx.workspace.static_files().join("mapdata.static")).is_ok());
        assert!(fs::read_link(fx.workspace.sqlite().join("mapdata.sqlite")).is_ok());
        assert_eq!(stats.get("staticLinked"), 1);
        assert_eq!(stats.get(SQLITE_LINKED), 1);
    }

    #[test]
    fn test_static_non_sqlite_never_linked_as_sqlite() {
        let fx = fixture(
            "res:/staticdata/looks_like.sqlite.static,ab/01\n",
            &[("ab/01", b"plain static payload that is long enough")],
        );
        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        assert_eq!(stats.get("staticLinked"), 1);
        assert_eq!(stats.get(SQLITE_LINKED), 0);
        assert_eq!(fs::read_dir(fx.workspace.sqlite()).unwrap().count(), 0);
    }

    #[test]
    fn test_sqlite_header_detected_regardless_of_type_for_static_only() {
        let db = sqlite_bytes();
        let fx = fixture(
            "res:/misc/data.bin,ab/01\n",
            &[("ab/01", db.as_slice())],
        );
        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        assert_eq!(stats.get("rawLinked"), 1);
        assert_eq!(stats.get(SQLITE_LINKED), 0);
        assert!(fs::read_link(fx.workspace.raw().join("misc/data.bin")).is_ok());
    }

    #[test]
    fn test_pickle_converted_and_skipped_on_rerun() {
        let fx = fixture(
            "res:/staticdata/typenames.pickle,ab/01\n",
            &[("ab/01", br#"{"34": "Tritanium"}"#)],
        );
        let pickles = JsonPickles::default();

        let first = run(&fx, &pickles, RouteOptions::default());
        assert_eq!(first.get("pickleLinked"), 1);
        assert_eq!(first.get(PICKLE_CONVERTED), 1);

        let written: Value = serde_json::from_str(
            &fs::read_to_string(fx.workspace.json().join("typenames.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written, json!({"34": "Tritanium"}));

        let second = run(&fx, &pickles, RouteOptions::default());
        assert_eq!(second.get(PICKLE_SKIPPED), 1);
        assert_eq!(pickles.calls.get(), 1);

        let forced = run(
            &fx,
            &pickles,
            RouteOptions {
                force: true,
                ..Default::default()
            },
        );
        assert_eq!(forced.get(PICKLE_CONVERTED), 1);
        assert_eq!(pickles.calls.get(), 2);
    }

    #[test]
    fn test_pickle_failure_counted_not_fatal() {
        let fx = fixture(
            "res:/a/broken.pickle,ab/01\nres:fsd/types.fsdbinary,ab/02\n",
            &[("ab/01", b"\x80\x04not json"), ("ab/02", b"bin")],
        );
        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        assert_eq!(stats.get("pickleLinked"), 1);
        assert_eq!(stats.get(PICKLE_FAILED), 1);
        assert_eq!(stats.get("fsdbinaryLinked"), 1);
        assert_eq!(stats.get(TOTAL_PROCESSED), 2);
    }

    #[test]
    fn test_schema_and_raw_directories_created() {
        let fx = fixture(
            "res:/staticdata/types.schema,ab/01\nres:/ui/texture/icons/7_64_1.png,ab/02\n",
            &[("ab/01", b"schema"), ("ab/02", b"png")],
        );
        fs::remove_dir(fx.workspace.schema()).unwrap();

        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());

        assert!(fs::read_link(fx.workspace.schema().join("types.schema")).is_ok());
        assert!(fs::read_link(fx.workspace.raw().join("ui/texture/icons/7_64_1.png")).is_ok());
        assert_eq!(stats.get("schemaLinked"), 1);
        assert_eq!(stats.get("rawLinked"), 1);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let fx = fixture(
            "res:fsd/types.fsdbinary,ab/01\nres:/ui/a.png,ab/02\n",
            &[("ab/01", b"bin"), ("ab/02", b"png")],
        );
        run(&fx, &JsonPickles::default(), RouteOptions::default());
        let first = fs::read_link(fx.workspace.fsdbinary().join("types.fsdbinary")).unwrap();

        let stats = run(&fx, &JsonPickles::default(), RouteOptions::default());
        let second = fs::read_link(fx.workspace.fsdbinary().join("types.fsdbinary")).unwrap();

        assert_eq!(first, second);
        assert_eq!(stats.get(SYMLINK_ERRORS), 0);
        assert_eq!(fs::read_dir(fx.workspace.fsdbinary()).unwrap().count(), 1);
        assert_eq!(fs::read_dir(fx.workspace.raw().join("ui")).unwrap().count(), 1);
    }

    #[test]
    fn test_deep_exports_sqlite_tables() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("src.db");
        {
            let conn = rusqlite::Connection::open(&db_path).unwrap();
            conn.execute_batch(
                "CREATE TABLE items (id INTEGER, label TEXT); INSERT INTO items VALUES (1, 'a');",
            )
            .unwrap();
        }
        let db = fs::read(&db_path).unwrap();
        let fx = fixture(
            "res:/staticdata/items.static,ab/01\n",
            &[("ab/01", db.as_slice())],
        );

        let stats = run(
            &fx,
            &JsonPickles::default(),
            RouteOptions {
                deep: true,
                ..Default::default()
            },
        );

        assert_eq!(stats.get(SQLITE_LINKED), 1);
        assert_eq!(stats.get(SQLITE_TABLES_EXPORTED), 1);
        let rows: Vec<Value> = serde_json::from_str(
            &fs::read_to_string(fx.workspace.json().join("items").join("items.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(rows, vec![json!({"id": 1, "label": "a"})]);
    }
}
