//! Write-then-rename file replacement.
//!
//! Bytes go to `{path}.tmp`, are flushed with `sync_all()`, and the temp file
//! is renamed over `path`. A crash mid-write leaves the previous save intact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replace the file at `path` with `data`.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("map_descriptions_atomic_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = test_dir("creates");
        let path = dir.join("save.bin");

        atomic_write(&path, b"hello").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!tmp_path_for(&path).exists(), "temp file should be renamed away");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_replaces_previous_contents() {
        let dir = test_dir("replaces");
        let path = dir.join("save.bin");

        atomic_write(&path, b"a much longer first version").unwrap();
        atomic_write(&path, b"v2").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"v2");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = test_dir("parents");
        let path = dir.join("slot").join("nested").join("save.bin");

        atomic_write(&path, b"deep").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"deep");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path_for(Path::new("saves/a.bin")),
            PathBuf::from("saves/a.bin.tmp")
        );
    }
}
