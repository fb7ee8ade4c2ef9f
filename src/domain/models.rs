use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::parser;

/// What a filename says about the episode it belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaIdentity {
    pub show_name: String,
    pub clean_show_name: String,
    pub season: u32,
    pub episode: u32,
    pub year: Option<u32>,
    pub suffix: String,
    pub source_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub identity: MediaIdentity,
    pub full_path: PathBuf,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRecord {
    pub identity: MediaIdentity,
    pub full_path: PathBuf,
    pub extension: String,
}

impl VideoRecord {
    pub fn from_path(path: &Path) -> Option<Self> {
        let (identity, extension) = identify(path)?;
        Some(Self {
            identity,
            full_path: path.to_path_buf(),
            extension,
        })
    }

    /// File name without its extension, e.g. `Show - S01E01 - Pilot`.
    pub fn stem(&self) -> &str {
        file_stem(&self.full_path)
    }

    pub fn file_name(&self) -> String {
        file_name(&self.full_path)
    }
}

impl SubtitleRecord {
    pub fn from_path(path: &Path) -> Option<Self> {
        let (identity, extension) = identify(path)?;
        Some(Self {
            identity,
            full_path: path.to_path_buf(),
            extension,
        })
    }
}

fn identify(path: &Path) -> Option<(MediaIdentity, String)> {
    let name = path.file_name()?.to_str()?;
    let identity = parser::parse(name)?;
    let extension = name[parser::strip_extension(name).len()..].to_string();
    Some((identity, extension))
}

fn file_stem(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(parser::strip_extension)
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The winning candidate for one subtitle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub video: VideoRecord,
    pub score: u32,
    pub library_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LibraryCache {
    pub library_name: String,
    pub last_update: i64,
    pub version: String,
    pub shows: Vec<ShowEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShowEntry {
    pub show_name: String,
    pub seasons: Vec<SeasonEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SeasonEntry {
    pub season_number: u32,
    pub episodes: Vec<EpisodeEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    pub episode_number: u32,
    pub video_file: String, // relative to the library root
    pub subtitles: Vec<SubtitleEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub subtitle_file: String,
    pub language: String,
}

impl LibraryCache {
    pub const VERSION: &'static str = "1.0";

    pub fn episode_count(&self) -> usize {
        self.shows
            .iter()
            .flat_map(|show| &show.seasons)
            .map(|season| season.episodes.len())
            .sum()
    }

    #[cfg(test)]
    pub fn get_episode(&self, show_name: &str, season: u32, episode: u32) -> Option<&EpisodeEntry> {
        self.shows
            .iter()
            .find(|show| show.show_name == show_name)?
            .seasons
            .iter()
            .find(|s| s.season_number == season)?
            .episodes
            .iter()
            .find(|e| e.episode_number == episode)
    }

    /// Rebuilds video records from the indexed relative paths.
    ///
    /// Entries whose file name no longer parses are dropped.
    pub fn videos(&self, library_root: &Path) -> Vec<VideoRecord> {
        self.shows
            .iter()
            .flat_map(|show| &show.seasons)
            .flat_map(|season| &season.episodes)
            .filter_map(|episode| VideoRecord::from_path(&library_root.join(&episode.video_file)))
            .collect()
    }
}
