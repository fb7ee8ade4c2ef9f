use anyhow::Result;
use std::path::Path;

use super::VideoSource;
use crate::domain::models::{LibraryCache, VideoRecord};

/// Serves candidates from a previously written library index.
pub struct CachedLibrary {
    library_name: String,
    videos: Vec<VideoRecord>,
}

impl CachedLibrary {
    pub fn new(library_name: &str, library_path: &Path, cache: &LibraryCache) -> Self {
        Self {
            library_name: library_name.to_string(),
            videos: cache.videos(library_path),
        }
    }
}

impl VideoSource for CachedLibrary {
    fn library_name(&self) -> &str {
        &self.library_name
    }

    fn videos(&self) -> Result<&[VideoRecord]> {
        Ok(&self.videos)
    }
}
