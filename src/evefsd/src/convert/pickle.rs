//! Pickle to JSON conversion
//!
//! Pickles are only readable by a Python interpreter, so the conversion runs
//! a short program that loads the file and writes JSON to stdout. Pickles
//! may reference the game's own modules, so `bin64` relative to the working
//! directory is put on the module path first.

use super::ObjectConverter;
use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_PYTHON: &str = "python3";

const PROGRAM: &str = r#"
import json, pickle, sys

sys.path.insert(0, "bin64")

def fallback(o):
    if isinstance(o, (set, frozenset)):
        return sorted(o, key=repr)
    if isinstance(o, (bytes, bytearray)):
        return o.hex()
    return repr(o)

with open(sys.argv[1], "rb") as f:
    data = pickle.load(f)
json.dump(data, sys.stdout, default=fallback)
"#;

/// Converter backed by an external Python interpreter
#[derive(Debug, Clone)]
pub struct PythonPickleConverter {
    interpreter: PathBuf,
    working_dir: Option<PathBuf>,
}

impl PythonPickleConverter {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        PythonPickleConverter {
            interpreter: interpreter.into(),
            working_dir: None,
        }
    }

    /// Run the interpreter in `dir`, normally the workspace root holding
    /// the `bin64` link
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl Default for PythonPickleConverter {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl ObjectConverter for PythonPickleConverter {
    fn convert(&self, source: &Path) -> Result<Value> {
        let command = self.interpreter.display().to_string();
        let mut process = Command::new(&self.interpreter);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }
        let output = process
            .arg("-c")
            .arg(PROGRAM)
            .arg(source)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| PipelineError::ProcessFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PipelineError::Conversion {
                path: source.to_path_buf(),
                reason: format!("{} exited with {}", command, output.status),
            });
        }

        let value: Value = serde_json::from_slice(&output.stdout)?;
        Ok(unwrap_envelope(value))
    }
}

/// Strip a `[version, dict]` wrapper, leaving other values untouched.
///
/// The version slot may be a number or a string (localization pickles carry
/// the language code there).
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Array(mut items)
            if items.len() == 2
                && (items[0].is_number() || items[0].is_string())
                && items[1].is_object() =>
        {
            items.swap_remove(1)
        }
        other => other,
    }
}
