use crate::domain::models::LibraryCache;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where the index for `library_name` lives inside `cache_dir`.
pub fn cache_path(cache_dir: &Path, library_name: &str) -> PathBuf {
    cache_dir.join(format!("cache_{}.json", sanitize_filename(library_name)))
}

/// Loads a previously written index, `None` if there is none or it is unreadable.
pub fn load(cache_dir: &Path, library_name: &str) -> Option<LibraryCache> {
    let path = cache_path(cache_dir, library_name);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable library cache");
            None
        }
    }
}

/// Replaces the stored index for the cache's library wholesale.
pub fn save(cache_dir: &Path, cache: &LibraryCache) -> Result<PathBuf> {
    let path = cache_path(cache_dir, &cache.library_name);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory {parent:?}"))?;
    }

    let content = serde_json::to_string_pretty(cache)?;
    fs::write(&path, content).with_context(|| format!("Failed to write cache {path:?}"))?;
    Ok(path)
}

fn sanitize_filename(name: &str) -> String {
    // Remove or replace invalid filename characters
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
