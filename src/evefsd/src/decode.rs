//! External decoding of `fsdbinary` files
//!
//! The binary format is only readable by the game's own loader modules, so
//! decoding runs in an external process with the workspace root as its
//! working directory. It reports success through its exit status; output
//! lands in `data/json/`.

use crate::convert::pickle::DEFAULT_PYTHON;
use crate::error::{PipelineError, Result};
use crate::workspace::Workspace;
use std::path::PathBuf;
use std::process::Command;

/// Loader modules the decoder imports, relative to the workspace root
pub const LOADER_PATTERN: &str = "bin64/*Loader.pyd";

/// Imports every `bin64/<Name>Loader.pyd`, loads
/// `data/fsdbinary/<name>.fsdbinary` with it and writes
/// `data/json/<name>.json`. Integer fields whose key ends in `NameID`
/// (except `dungeonNameID`) become their English string; vector types
/// become null. A loader that fails is reported and skipped.
const LOADER_PROGRAM: &str = r#"
import glob, importlib, json, os, pickle, sys

sys.path.insert(0, "bin64")
os.makedirs("data/json", exist_ok=True)

UNRESOLVED_NAME_KEYS = {"dungeonNameID"}

def is_name_key(key):
    return (isinstance(key, str)
            and key.lower().endswith("nameid")
            and key not in UNRESOLVED_NAME_KEYS)

def decode(key, value, strings):
    kind = type(value)
    module, name = kind.__module__, kind.__name__
    if module == "cfsd" and name == "dict":
        return {k: decode(k, v, strings) for k, v in value.items()}
    if module.endswith("Loader"):
        return {a: decode(a, getattr(value, a), strings)
                for a in dir(value) if not a.startswith("__")}
    if module == "cfsd" and name == "list":
        return [decode(None, v, strings) for v in value]
    if isinstance(value, tuple):
        return [decode(None, v, strings) for v in value]
    if name.endswith("_vector"):
        return None
    if isinstance(value, int) or name == "long":
        if is_name_key(key):
            entry = strings.get(value)
            return entry[0] if entry else value
        return value
    if isinstance(value, (float, str)):
        return value
    raise ValueError("unsupported value of type %s.%s" % (module, name))

with open("data/pickle/localization_fsd_en-us.pickle", "rb") as f:
    strings = pickle.load(f)[1]
print("Loaded %d localization strings" % len(strings), flush=True)

for path in sorted(glob.glob("bin64/*Loader.pyd")):
    module_name = os.path.splitext(os.path.basename(path))[0]
    stem = module_name.replace("Loader", "").lower()
    try:
        data = importlib.import_module(module_name).load("data/fsdbinary/%s.fsdbinary" % stem)
        text = json.dumps(decode(None, data, strings), indent=4)
        with open("data/json/%s.json" % stem, "w") as out:
            out.write(text)
        print("Decoded %s.fsdbinary" % stem, flush=True)
    except Exception as e:
        print("Skipping %s: %s" % (module_name, e), file=sys.stderr, flush=True)
"#;

/// Something able to turn the linked `fsdbinary` files into JSON
pub trait BinaryDecoder {
    fn decode(&self, workspace: &Workspace) -> Result<()>;
}

fn run_in_workspace(mut command: Command, workspace: &Workspace, command_line: String) -> Result<()> {
    tracing::info!("Running decoder: {}", command_line);

    let status = command
        .current_dir(workspace.root())
        .status()
        .map_err(|e| PipelineError::ProcessFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(PipelineError::ProcessFailed {
            command: command_line,
            reason: status.to_string(),
        });
    }

    Ok(())
}

/// Decoder built into the crate: the loader program run by a Python
/// interpreter
#[derive(Debug, Clone)]
pub struct PythonLoaderDecoder {
    interpreter: PathBuf,
}

impl PythonLoaderDecoder {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        PythonLoaderDecoder {
            interpreter: interpreter.into(),
        }
    }

    pub fn command_line(&self) -> String {
        format!("{} -c <loader program>", self.interpreter.display())
    }
}

impl Default for PythonLoaderDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl BinaryDecoder for PythonLoaderDecoder {
    fn decode(&self, workspace: &Workspace) -> Result<()> {
        let mut command = Command::new(&self.interpreter);
        command.arg("-c").arg(LOADER_PROGRAM);
        run_in_workspace(command, workspace, self.command_line())
    }
}

/// User-supplied decoder run as `program args...`
#[derive(Debug, Clone)]
pub struct ProcessDecoder {
    program: String,
    args: Vec<String>,
}

impl ProcessDecoder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        ProcessDecoder {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argv, `None` when it is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BinaryDecoder for ProcessDecoder {
    fn decode(&self, workspace: &Workspace) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        run_in_workspace(command, workspace, self.command_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::process::Stdio;

    fn python3_available() -> bool {
        Command::new("python3")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn python3(cwd: &Path, program: &str) {
        let status = Command::new("python3")
            .arg("-c")
            .arg(program)
            .current_dir(cwd)
            .status()
            .unwrap();
        assert!(status.success());
    }

    /// Working tree with a localization table, one fsdbinary input, a
    /// stand-in `cfsd` module and a `typesLoader` that yields one record
    fn loader_workspace(root: &Path) -> Workspace {
        let ws = Workspace::new(root);
        ws.ensure_directories().unwrap();
        fs::write(ws.fsdbinary().join("types.fsdbinary"), b"fsd").unwrap();
        python3(
            root,
            "import pickle\n\
             with open('data/pickle/localization_fsd_en-us.pickle', 'wb') as f:\n\
             \x20   pickle.dump(('en-us', {1: ['Tritanium', None, None], 2: ['Hidden Site', None, None]}), f)\n",
        );

        let bin64 = root.join("bin64");
        fs::create_dir_all(&bin64).unwrap();
        fs::write(
            bin64.join("cfsd.py"),
            "import builtins\n\
             class dict(builtins.dict):\n    pass\n\
             class list(builtins.list):\n    pass\n\
             class float_vector:\n    pass\n",
        )
        .unwrap();
        fs::write(
            bin64.join("typesLoader.py"),
            "import cfsd\n\
             class Record:\n\
             \x20   def __init__(self, **fields):\n\
             \x20       self.__dict__.update(fields)\n\
             def load(path):\n\
             \x20   open(path, 'rb').read()\n\
             \x20   return cfsd.dict({34: Record(typeNameID=1, groupID=18, dungeonNameID=2,\n\
             \x20       descriptionNameID=99, position=cfsd.float_vector(), tags=cfsd.list([3, 4]))})\n",
        )
        .unwrap();
        // Import finds the .py module; the .pyd names the loader
        fs::write(bin64.join("typesLoader.pyd"), b"").unwrap();
        fs::write(bin64.join("brokenLoader.pyd"), b"").unwrap();
        ws
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["python3".to_string(), "decode.py".to_string()];
        let decoder = ProcessDecoder::from_argv(&argv).unwrap();
        assert_eq!(decoder.command_line(), "python3 decode.py");

        assert!(ProcessDecoder::from_argv(&[]).is_none());
    }

    #[test]
    fn test_spawn_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(temp_dir.path());
        let decoder = ProcessDecoder::new("evefsd-no-such-decoder", vec![]);

        assert!(matches!(
            decoder.decode(&ws),
            Err(PipelineError::ProcessFailed { .. })
        ));

        let loader = PythonLoaderDecoder::new("evefsd-no-such-python");
        assert!(matches!(
            loader.decode(&ws),
            Err(PipelineError::ProcessFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(temp_dir.path());

        let ok = ProcessDecoder::new("sh", vec!["-c".into(), "mkdir -p data/json".into()]);
        ok.decode(&ws).unwrap();
        assert!(temp_dir.path().join("data/json").is_dir());

        let failing = ProcessDecoder::new("sh", vec!["-c".into(), "exit 3".into()]);
        let err = failing.decode(&ws).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit status: 3"), "{}", message);
        assert!(!message.contains("exit status exit status"), "{}", message);
    }

    #[test]
    fn test_loader_program_contract() {
        assert!(LOADER_PROGRAM.contains(r#"sys.path.insert(0, "bin64")"#));
        assert!(LOADER_PROGRAM.contains(LOADER_PATTERN));
        assert!(LOADER_PROGRAM.contains("data/pickle/localization_fsd_en-us.pickle"));
        assert_eq!(
            PythonLoaderDecoder::default().command_line(),
            "python3 -c <loader program>"
        );
    }

    #[test]
    fn test_loader_decodes_records() {
        if !python3_available() {
            eprintln!("python3 not found, skipping");
            return;
        }
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = loader_workspace(temp_dir.path());

        PythonLoaderDecoder::default().decode(&ws).unwrap();

        let types: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(ws.json().join("types.json")).unwrap())
                .unwrap();
        let record = &types["34"];
        assert_eq!(record["typeNameID"], "Tritanium");
        assert_eq!(record["dungeonNameID"], 2);
        assert_eq!(record["descriptionNameID"], 99);
        assert_eq!(record["groupID"], 18);
        assert!(record["position"].is_null());
        assert_eq!(record["tags"], serde_json::json!([3, 4]));

        // The loader that cannot be imported is skipped without failing the run
        assert!(!ws.json().join("broken.json").exists());
    }

    #[test]
    fn test_loader_requires_localization() {
        if !python3_available() {
            eprintln!("python3 not found, skipping");
            return;
        }
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = loader_workspace(temp_dir.path());
        fs::remove_file(ws.pickle().join("localization_fsd_en-us.pickle")).unwrap();

        assert!(matches!(
            PythonLoaderDecoder::default().decode(&ws),
            Err(PipelineError::ProcessFailed { .. })
        ));
    }
}
