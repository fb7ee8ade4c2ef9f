use anyhow::Result;
use once_cell::unsync::OnceCell;
use std::path::PathBuf;

use super::VideoSource;
use crate::domain::models::VideoRecord;
use crate::workflows::indexer;

/// Walks the library directory the first time its videos are needed.
pub struct LiveLibrary {
    library_name: String,
    library_path: PathBuf,
    video_extensions: Vec<String>,
    videos: OnceCell<Vec<VideoRecord>>,
}

impl LiveLibrary {
    pub fn new(library_name: &str, library_path: PathBuf, video_extensions: Vec<String>) -> Self {
        Self {
            library_name: library_name.to_string(),
            library_path,
            video_extensions,
            videos: OnceCell::new(),
        }
    }
}

impl VideoSource for LiveLibrary {
    fn library_name(&self) -> &str {
        &self.library_name
    }

    fn videos(&self) -> Result<&[VideoRecord]> {
        self.videos
            .get_or_try_init(|| indexer::collect_videos(&self.library_path, &self.video_extensions))
            .map(Vec::as_slice)
    }
}
