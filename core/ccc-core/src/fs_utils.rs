//! Small filesystem helpers shared by the registry and the detectors.

use fs_err as fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Lists a directory's entries sorted by file name.
///
/// The OS gives no ordering guarantee; sorting keeps "first session file"
/// stable across platforms.
pub(crate) fn read_dir_sorted(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Like [`read_dir_sorted`], but a missing directory yields no entries.
pub(crate) fn read_dir_if_exists(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    match read_dir_sorted(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

pub(crate) fn is_dir_entry(entry: &fs::DirEntry) -> bool {
    entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
}

/// Total bytes of all regular files below `path`.
pub(crate) fn dir_size(path: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(io::Error::from)?.len();
        }
    }
    Ok(total)
}

pub(crate) fn is_dir_empty(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}
