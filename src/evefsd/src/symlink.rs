//! Idempotent symlink creation
//!
//! A link target is always cleared before it is (re)created, so running a
//! step twice leaves exactly one link per target pointing at the latest
//! source.

use std::fs;
use std::io;
use std::path::Path;

/// Create `target` as a symlink to `source`, replacing whatever is there.
///
/// Failures are logged and reported as `false`; they never propagate. The
/// target's parent directory must already exist.
pub fn link(source: &Path, target: &Path) -> bool {
    match try_link(source, target) {
        Ok(()) => true,
        Err(e) => {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.display().to_string());
            tracing::error!("Failed to link {}: {}", name, e);
            false
        }
    }
}

/// Fallible core of [`link`]
pub fn try_link(source: &Path, target: &Path) -> io::Result<()> {
    remove_existing(target)?;
    create(source, target)
}

/// Remove a file, symlink or broken symlink at `path`. Real directories are
/// left alone and reported as an error.
fn remove_existing(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} is a directory", path.display()),
        ));
    }

    remove_link(path)
}

/// Remove a symlink without following it
pub fn remove_link(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        // Directory symlinks on Windows need remove_dir
        if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
            return fs::remove_dir(path);
        }
    }
    fs::remove_file(path)
}

#[cfg(unix)]
fn create(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_link_creates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("target.bin");
        fs::write(&source, b"data").unwrap();

        assert!(link(&source, &target));
        assert_eq!(fs::read_link(&target).unwrap(), source);
        assert_eq!(fs::read(&target).unwrap(), b"data");
    }

    #[test]
    fn test_link_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("target.bin");
        fs::write(&source, b"data").unwrap();

        assert!(link(&source, &target));
        assert!(link(&source, &target));

        assert_eq!(fs::read_link(&target).unwrap(), source);
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_link_replaces_regular_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("target.bin");
        fs::write(&source, b"new").unwrap();
        fs::write(&target, b"stale").unwrap();

        assert!(link(&source, &target));
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_link_replaces_broken_symlink() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("target.bin");
        fs::write(&source, b"data").unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), &target).unwrap();

        assert!(link(&source, &target));
        assert_eq!(fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn test_link_missing_parent_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        fs::write(&source, b"data").unwrap();

        let target = temp_dir.path().join("missing").join("target.bin");
        assert!(!link(&source, &target));
    }

    #[test]
    fn test_link_refuses_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("dir");
        fs::write(&source, b"data").unwrap();
        fs::create_dir(&target).unwrap();

        assert!(!link(&source, &target));
        assert!(target.is_dir());
    }
}
