//! Filesystem primitives used by the organizer.
//!
//! - `ensure_dir`: create a directory (and parents); existing directories are fine.
//! - `move_file`: rename, falling back to copy + delete across filesystems.

use std::fs;
use std::io;
use std::path::Path;

/// Creates `path` and any missing parents. No-op if it already exists as a directory.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)
}

/// Moves a file from `from` to `to`.
///
/// Tries an atomic rename first. When the two paths live on different
/// filesystems the file is copied and the source removed afterwards. An
/// existing file at `to` is handled however the platform's rename handles it.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "rename crosses devices, copying instead"
            );
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        // Leave a single copy behind rather than two.
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
