use rapidfuzz::distance::indel;

use super::models::MediaIdentity;

pub const DEFAULT_THRESHOLD: u32 = 80;
pub const YEAR_BONUS: u32 = 10;

/// Scores `b` as a candidate for `a`.
///
/// Season and episode are a hard gate: `None` unless both are equal. The
/// score is the show-name ratio (0-100) plus [`YEAR_BONUS`] when both sides
/// carry the same year, so it can exceed 100.
pub fn score(a: &MediaIdentity, b: &MediaIdentity) -> Option<u32> {
    if a.season != b.season || a.episode != b.episode {
        return None;
    }

    let mut score = name_ratio(&a.clean_show_name, &b.clean_show_name);
    if let (Some(year_a), Some(year_b)) = (a.year, b.year) {
        if year_a == year_b {
            score += YEAR_BONUS;
        }
    }
    Some(score)
}

/// Case-insensitive Indel similarity on a 0-100 scale; 0 if either is empty.
pub fn name_ratio(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let similarity = indel::normalized_similarity(a.chars(), b.chars());
    (similarity * 100.0).round() as u32
}

/// Running best candidate.
///
/// A candidate replaces the incumbent only with a strictly higher score that
/// also clears the threshold, so equal scores keep the earliest one offered.
#[derive(Debug)]
pub struct BestMatch<T> {
    threshold: u32,
    best: Option<(T, u32)>,
}

impl<T> BestMatch<T> {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            best: None,
        }
    }

    pub fn best_score(&self) -> u32 {
        self.best.as_ref().map(|(_, score)| *score).unwrap_or(0)
    }

    /// Returns whether the candidate became the new best.
    pub fn offer(&mut self, candidate: T, score: u32) -> bool {
        if score > self.best_score() && score >= self.threshold {
            self.best = Some((candidate, score));
            true
        } else {
            false
        }
    }

    pub fn into_inner(self) -> Option<(T, u32)> {
        self.best
    }
}
