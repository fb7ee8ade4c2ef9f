//! Directory tree → [`LibraryCache`].

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::models::{
    EpisodeEntry, LibraryCache, SeasonEntry, ShowEntry, SubtitleEntry, VideoRecord,
};
use crate::infra::fs::{collect_files, file_name_str, matching_extension};

const LANGUAGE_SEPARATORS: [char; 4] = ['.', '_', '-', ' '];

/// Every parseable video under `media_dir`, in path order.
pub fn collect_videos(media_dir: &Path, video_extensions: &[String]) -> Result<Vec<VideoRecord>> {
    let paths = collect_files(media_dir, true, &|path: &Path| {
        file_name_str(path)
            .and_then(|name| matching_extension(name, video_extensions))
            .is_some()
    })
    .with_context(|| format!("Failed to scan media directory {media_dir:?}"))?;

    let videos: Vec<VideoRecord> = paths
        .iter()
        .filter_map(|path| {
            let video = VideoRecord::from_path(path);
            if video.is_none() {
                debug!(path = %path.display(), "skipping unparseable video");
            }
            video
        })
        .collect();

    debug!(
        media_dir = %media_dir.display(),
        found = paths.len(),
        parsed = videos.len(),
        "collected videos"
    );
    Ok(videos)
}

/// A library's name when none is given: the basename of its directory.
pub fn default_library_name(media_dir: &Path) -> Option<String> {
    let resolved = fs::canonicalize(media_dir).ok()?;
    file_name_str(&resolved).map(str::to_string)
}

/// Builds a fresh snapshot of the library.
///
/// Shows are keyed by clean show name; when two videos land on the same
/// show/season/episode, the one later in path order replaces the earlier.
pub fn scan_library(
    library_name: &str,
    media_dir: &Path,
    video_extensions: &[String],
    subtitle_extensions: &[String],
) -> Result<LibraryCache> {
    let videos = collect_videos(media_dir, video_extensions)?;

    let mut shows: BTreeMap<String, BTreeMap<u32, BTreeMap<u32, EpisodeEntry>>> = BTreeMap::new();
    for video in &videos {
        let video_file = video
            .full_path
            .strip_prefix(media_dir)
            .unwrap_or(&video.full_path)
            .to_string_lossy()
            .into_owned();
        let entry = EpisodeEntry {
            episode_number: video.identity.episode,
            video_file,
            subtitles: find_subtitles(video, subtitle_extensions)?,
        };

        shows
            .entry(video.identity.clean_show_name.clone())
            .or_default()
            .entry(video.identity.season)
            .or_default()
            .insert(video.identity.episode, entry);
    }

    let cache = LibraryCache {
        library_name: library_name.to_string(),
        last_update: chrono::Utc::now().timestamp(),
        version: LibraryCache::VERSION.to_string(),
        shows: shows
            .into_iter()
            .map(|(show_name, seasons)| ShowEntry {
                show_name,
                seasons: seasons
                    .into_iter()
                    .map(|(season_number, episodes)| SeasonEntry {
                        season_number,
                        episodes: episodes.into_values().collect(),
                    })
                    .collect(),
            })
            .collect(),
    };

    info!(
        library = library_name,
        shows = cache.shows.len(),
        episodes = cache.episode_count(),
        "library scanned"
    );
    Ok(cache)
}

/// Subtitles next to `video` whose name starts with the video's stem.
fn find_subtitles(video: &VideoRecord, subtitle_extensions: &[String]) -> Result<Vec<SubtitleEntry>> {
    let Some(video_dir) = video.full_path.parent() else {
        return Ok(Vec::new());
    };
    let video_stem = video.stem();

    let candidates = collect_files(video_dir, false, &|path: &Path| {
        file_name_str(path)
            .map(|name| name.starts_with(video_stem))
            .unwrap_or(false)
    })
    .with_context(|| format!("Failed to list {video_dir:?}"))?;

    let subtitles = candidates
        .iter()
        .filter_map(|path| {
            let name = file_name_str(path)?;
            let ext = matching_extension(name, subtitle_extensions)?;
            let end = name.len().checked_sub(ext.len())?;
            let language = name.get(video_stem.len()..end)?;
            let language = language
                .strip_prefix(|c: char| LANGUAGE_SEPARATORS.contains(&c))
                .unwrap_or(language);
            Some(SubtitleEntry {
                subtitle_file: name.to_string(),
                language: language.to_string(),
            })
        })
        .collect();

    Ok(subtitles)
}
