//! Atomic file replacement
//!
//! Every durable artifact (snapshots, checkpoints, TOML config) is written
//! to a sibling `<name>.tmp` file and renamed over the destination, so a
//! reader never observes a truncated file.

use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sibling temp path used while replacing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `contents` via temp file + rename.
///
/// Parent directories are created when missing. On failure the temp file is
/// removed and the previous contents of `path` are left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if path.file_name().is_none() {
        return Err(Error::InvalidInput(format!(
            "Not a file path: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path_for(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed replacing {}: {}", path.display(), e),
        )));
    }

    Ok(())
}
