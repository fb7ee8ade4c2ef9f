use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// The filesystem operations relocation is built on.
pub trait Relocator {
    /// Moves `source` to `destination`, replacing it if present.
    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

pub struct FsRelocator;

impl Relocator for FsRelocator {
    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            // rename cannot cross filesystems, fall back to copy + remove
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "cross-device move, copying"
                );
                fs::copy(source, destination)?;
                fs::remove_file(source)
            }
            Err(e) => Err(e),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Returns the entry of `extensions` that `file_name` ends with, ignoring case.
///
/// Extensions are written with their leading dot, e.g. `.srt`.
pub fn matching_extension<'a>(file_name: &str, extensions: &'a [String]) -> Option<&'a str> {
    let lower = file_name.to_lowercase();
    extensions
        .iter()
        .find(|ext| lower.ends_with(&ext.to_lowercase()))
        .map(String::as_str)
}

/// Lists files under `dir` accepted by `keep`, sorted by path.
///
/// Only `dir` itself being unreadable is an error. Unreadable entries below it
/// are logged and skipped. Symlinked directories are not descended into;
/// symlinked files are listed.
pub fn collect_files(
    dir: &Path,
    recurse: bool,
    keep: &dyn Fn(&Path) -> bool,
) -> io::Result<Vec<PathBuf>> {
    fs::read_dir(dir)?;

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .max_depth(if recurse { usize::MAX } else { 1 });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    path = ?e.path().unwrap_or(dir),
                    error = %e,
                    "skipping unreadable entry"
                );
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
