use anyhow::Result;

use crate::domain::models::VideoRecord;

/// Where the candidate videos of one library come from.
pub trait VideoSource {
    fn library_name(&self) -> &str;

    /// Candidate videos in a stable order, loaded at most once.
    fn videos(&self) -> Result<&[VideoRecord]>;
}

pub mod cached;
pub mod live;
