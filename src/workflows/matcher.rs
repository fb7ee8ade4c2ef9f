use tracing::{debug, info, warn};

use super::sources::VideoSource;
use crate::domain::models::{MatchResult, MediaIdentity, SubtitleRecord, VideoRecord};
use crate::domain::scorer::{self, BestMatch};

/// Best candidate for `subtitle` among `videos`, with its score.
///
/// Ties keep the candidate that comes first in `videos`.
pub fn best_in_library<'a>(
    subtitle: &MediaIdentity,
    videos: &'a [VideoRecord],
    threshold: u32,
) -> Option<(&'a VideoRecord, u32)> {
    let mut best = BestMatch::new(threshold);

    for video in videos {
        let Some(score) = scorer::score(subtitle, &video.identity) else {
            continue;
        };
        debug!(
            subtitle = %subtitle.clean_show_name,
            video = %video.identity.clean_show_name,
            score,
            "candidate scored"
        );
        best.offer(video, score);
    }

    best.into_inner()
}

/// Consults `libraries` in order and returns the first library's best match.
///
/// Later libraries are not searched once one has produced a match, even if
/// they hold a higher-scoring candidate. A library that fails to load is
/// skipped.
pub fn match_subtitle(
    subtitle: &SubtitleRecord,
    libraries: &[Box<dyn VideoSource>],
    threshold: u32,
) -> Option<MatchResult> {
    let identity = &subtitle.identity;
    debug!(
        subtitle = %identity.source_filename,
        show = %identity.show_name,
        "matching S{:02}E{:02}",
        identity.season,
        identity.episode
    );

    for library in libraries {
        let videos = match library.videos() {
            Ok(videos) => videos,
            Err(e) => {
                warn!(library = library.library_name(), error = %e, "skipping library");
                continue;
            }
        };

        if let Some((video, score)) = best_in_library(identity, videos, threshold) {
            info!(
                subtitle = %identity.source_filename,
                video = %video.file_name(),
                library = library.library_name(),
                score,
                "matched"
            );
            return Some(MatchResult {
                video: video.clone(),
                score,
                library_name: library.library_name().to_string(),
            });
        }
    }

    info!(subtitle = %identity.source_filename, "no matching video found");
    None
}

/// Fallback that trusts season and episode alone.
///
/// The first library holding the episode wins; inside it the best name score
/// is preferred, but no threshold applies.
pub fn match_ignoring_show_name(
    subtitle: &SubtitleRecord,
    libraries: &[Box<dyn VideoSource>],
) -> Option<MatchResult> {
    let identity = &subtitle.identity;

    for library in libraries {
        let Ok(videos) = library.videos() else {
            continue;
        };

        let best = videos
            .iter()
            .filter_map(|video| Some((video, scorer::score(identity, &video.identity)?)))
            .fold(None::<(&VideoRecord, u32)>, |best, (video, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((video, score)),
            });

        if let Some((video, score)) = best {
            info!(
                subtitle = %identity.source_filename,
                video = %video.file_name(),
                library = library.library_name(),
                score,
                "matched on season and episode only"
            );
            return Some(MatchResult {
                video: video.clone(),
                score,
                library_name: library.library_name().to_string(),
            });
        }
    }

    None
}
