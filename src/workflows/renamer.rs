use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::models::{SubtitleRecord, VideoRecord};
use crate::error::RelocationError;
use crate::infra::fs::Relocator;

/// How the part between the video name and the subtitle extension is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixPolicy {
    /// `<video>.<tag><ext>`, or `<video><ext>` when the tag is empty.
    Language(String),
    /// `<video><subtitle suffix><ext>`, keeping whatever followed the
    /// episode token in the subtitle's own name.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementStatus {
    Moved,
    Overwritten,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub status: PlacementStatus,
    pub destination: PathBuf,
}

pub fn generate_filename(subtitle: &SubtitleRecord, video: &VideoRecord, policy: &SuffixPolicy) -> String {
    let suffix = match policy {
        SuffixPolicy::Language(tag) if tag.is_empty() => String::new(),
        SuffixPolicy::Language(tag) => format!(".{tag}"),
        SuffixPolicy::Preserve => subtitle.identity.suffix.clone(),
    };
    format!("{}{}{}", video.stem(), suffix, subtitle.extension)
}

/// Destination is always the matched video's directory.
pub fn destination_path(subtitle: &SubtitleRecord, video: &VideoRecord, policy: &SuffixPolicy) -> PathBuf {
    let directory = video.full_path.parent().unwrap_or(Path::new("."));
    directory.join(generate_filename(subtitle, video, policy))
}

/// Decides where `subtitle` goes and what will happen there, touching nothing.
pub fn plan(
    subtitle: &SubtitleRecord,
    video: &VideoRecord,
    policy: &SuffixPolicy,
    overwrite: bool,
) -> Placement {
    let destination = destination_path(subtitle, video, policy);
    let status = if !destination.exists() {
        PlacementStatus::Moved
    } else if overwrite && !is_same_file(&subtitle.full_path, &destination) {
        PlacementStatus::Overwritten
    } else {
        PlacementStatus::Skipped
    };

    Placement {
        status,
        destination,
    }
}

/// Moves `subtitle` beside `video`.
///
/// An existing destination is replaced when `overwrite` is set; otherwise the
/// source subtitle is deleted and the destination left alone.
pub fn plan_and_execute(
    subtitle: &SubtitleRecord,
    video: &VideoRecord,
    policy: &SuffixPolicy,
    overwrite: bool,
    relocator: &dyn Relocator,
) -> Result<Placement, RelocationError> {
    let source = subtitle.full_path.as_path();
    let placement = plan(subtitle, video, policy, overwrite);
    let destination = &placement.destination;

    match placement.status {
        PlacementStatus::Moved | PlacementStatus::Overwritten => {
            info!(destination = %destination.display(), status = ?placement.status, "moving subtitle");
            relocator
                .move_file(source, destination)
                .map_err(|e| RelocationError::move_failed(source.to_path_buf(), destination.clone(), e))?;
        }
        PlacementStatus::Skipped if is_same_file(source, destination) => {
            info!(destination = %destination.display(), "subtitle is already named correctly");
        }
        PlacementStatus::Skipped => {
            info!(destination = %destination.display(), "destination exists, discarding subtitle");
            relocator.remove_file(source).map_err(|e| {
                RelocationError::remove_failed(source.to_path_buf(), destination.clone(), e)
            })?;
        }
    }

    Ok(placement)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
