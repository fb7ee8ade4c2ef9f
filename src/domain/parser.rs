//! Filename → [`MediaIdentity`].
//!
//! Patterns are tried strictly in table order and the first one that
//! matches wins, so more specific layouts must be listed before looser ones.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::models::MediaIdentity;

struct EpisodePattern {
    label: &'static str,
    regex: Regex,
}

// Every pattern exposes the same `show`, `season` and `episode` groups.
static PATTERNS: Lazy<Vec<EpisodePattern>> = Lazy::new(|| {
    [
        // Show.Name.S01E02
        (
            "SxxExx",
            r"(?i)(?P<show>.+?)[. ]S(?P<season>[0-9]{1,2})E(?P<episode>[0-9]{1,2})",
        ),
        // Show.Name.1x02
        (
            "NxNN",
            r"(?i)(?P<show>.+?)[. ](?P<season>[0-9]{1,2})x(?P<episode>[0-9]{1,2})",
        ),
        // Show.Name.Season1Episode02, Show Name Season 1 Episode 2
        (
            "SeasonEpisode",
            r"(?i)(?P<show>.+?)[. ]Season[._ -]?(?P<season>[0-9]{1,2})[._ -]?Episode[._ -]?(?P<episode>[0-9]{1,2})",
        ),
        // Show.Name.S01.E02
        (
            "Sxx.Exx",
            r"(?i)(?P<show>.+?)[. ]S(?P<season>[0-9]{1,2})\.E(?P<episode>[0-9]{1,2})",
        ),
        // Show_Name_S01E02_Extra
        (
            "SxxExx-delimited",
            r"(?i)(?P<show>.+?)[_ -]S(?P<season>[0-9]{1,2})E(?P<episode>[0-9]{1,2})[_ -]",
        ),
    ]
    .into_iter()
    .map(|(label, pattern)| EpisodePattern {
        label,
        regex: Regex::new(pattern).expect("episode pattern must compile"),
    })
    .collect()
});

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Extracts show, season, episode, year and suffix from a bare filename.
///
/// Returns `None` when no pattern matches; callers skip such files.
pub fn parse(filename: &str) -> Option<MediaIdentity> {
    let name = strip_extension(filename);

    for pattern in PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(name) else {
            continue;
        };
        let (Ok(season), Ok(episode)) = (caps["season"].parse::<u32>(), caps["episode"].parse::<u32>())
        else {
            continue;
        };
        if episode == 0 {
            debug!(filename, pattern = pattern.label, "ignoring episode 0");
            continue;
        }

        let token_end = caps.get(0).map(|m| m.end()).unwrap_or(name.len());
        let show_name = caps["show"]
            .replace(|c: char| c == '.' || c == '_', " ")
            .trim()
            .to_string();
        let (clean_show_name, year) = clean_show_name(&show_name);

        debug!(
            filename,
            pattern = pattern.label,
            show = %show_name,
            season,
            episode,
            "pattern matched"
        );

        return Some(MediaIdentity {
            show_name,
            clean_show_name,
            season,
            episode,
            year,
            suffix: name[token_end..].to_string(),
            source_filename: filename.to_string(),
        });
    }

    debug!(filename, "no episode pattern matched");
    None
}

/// Drops the last `.ext`, leaving dot-files untouched.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// Punctuation to spaces, first standalone 4-digit run taken as the year.
fn clean_show_name(show_name: &str) -> (String, Option<u32>) {
    let cleaned = NON_WORD.replace_all(show_name, " ");
    let year_token = DIGIT_RUN
        .find_iter(&cleaned)
        .find(|m| m.as_str().len() == 4);

    let (without_year, year) = match year_token {
        Some(m) => (
            format!("{}{}", &cleaned[..m.start()], &cleaned[m.end()..]),
            m.as_str().parse().ok(),
        ),
        None => (cleaned.to_string(), None),
    };

    let collapsed = WHITESPACE.replace_all(&without_year, " ");
    (collapsed.trim().to_string(), year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sxxexx() {
        let id = parse("Breaking.Bad.S01E01.Pilot.en.srt").unwrap();
        assert_eq!(id.show_name, "Breaking Bad");
        assert_eq!(id.clean_show_name, "Breaking Bad");
        assert_eq!(id.season, 1);
        assert_eq!(id.episode, 1);
        assert_eq!(id.year, None);
        assert_eq!(id.suffix, ".Pilot.en");
        assert_eq!(id.source_filename, "Breaking.Bad.S01E01.Pilot.en.srt");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let id = parse("the.office.s09e23.finale.mkv").unwrap();
        assert_eq!(id.show_name, "the office");
        assert_eq!((id.season, id.episode), (9, 23));
    }

    #[test]
    fn test_parse_nxnn() {
        let id = parse("Doctor Who 7x05 The Angels.avi").unwrap();
        assert_eq!(id.show_name, "Doctor Who");
        assert_eq!((id.season, id.episode), (7, 5));
        assert_eq!(id.suffix, " The Angels");
    }

    #[test]
    fn test_parse_season_episode_words() {
        let id = parse("Friends.Season1Episode02.mkv").unwrap();
        assert_eq!(id.show_name, "Friends");
        assert_eq!((id.season, id.episode), (1, 2));

        let id = parse("Friends Season 3 Episode 12.mkv").unwrap();
        assert_eq!((id.season, id.episode), (3, 12));
    }

    #[test]
    fn test_parse_dotted_season_episode() {
        let id = parse("Lost.S02.E07.HDTV.srt").unwrap();
        assert_eq!(id.show_name, "Lost");
        assert_eq!((id.season, id.episode), (2, 7));
        assert_eq!(id.suffix, ".HDTV");
    }

    #[test]
    fn test_parse_underscore_delimited() {
        let id = parse("Dark_S01E03_WEB.ass").unwrap();
        assert_eq!(id.show_name, "Dark");
        assert_eq!((id.season, id.episode), (1, 3));
        assert_eq!(id.suffix, "WEB");
    }

    #[test]
    fn test_earlier_pattern_wins() {
        // Both the SxxExx and NxNN layouts are present; SxxExx is listed first.
        let id = parse("Show.1x02.S03E04.mkv").unwrap();
        assert_eq!(id.show_name, "Show 1x02");
        assert_eq!((id.season, id.episode), (3, 4));
    }

    #[test]
    fn test_parse_year_and_punctuation() {
        let id = parse("Slow Horses (2022) - S04E06 - Hello Goodbye (1080p).mkv").unwrap();
        assert_eq!(id.show_name, "Slow Horses (2022) -");
        assert_eq!(id.clean_show_name, "Slow Horses");
        assert_eq!(id.year, Some(2022));
        assert_eq!(id.suffix, " - Hello Goodbye (1080p)");
    }

    #[test]
    fn test_year_requires_exactly_four_digits() {
        let id = parse("Show.12345.S01E01.mkv").unwrap();
        assert_eq!(id.year, None);
        assert_eq!(id.clean_show_name, "Show 12345");
    }

    #[test]
    fn test_clean_name_without_year_is_trimmed() {
        let id = parse("Breaking Bad - S01E01 - Pilot (2008) 1080p.mkv").unwrap();
        assert_eq!(id.show_name, "Breaking Bad -");
        assert_eq!(id.clean_show_name, "Breaking Bad");
        assert_eq!(id.year, None);
    }

    #[test]
    fn test_parse_failure() {
        assert!(parse("random_notes.txt").is_none());
        assert!(parse("S01E01.srt").is_none());
        assert!(parse("Show.S01E00.srt").is_none());
    }

    #[test]
    fn test_round_trip_synthesized_names() {
        for season in [0u32, 1, 9, 10, 99] {
            for episode in [1u32, 5, 12, 99] {
                let filename = format!("Some.Show.S{season:02}E{episode:02}.WEB-DL.en.srt");
                let id = parse(&filename).unwrap();
                assert_eq!(id.season, season);
                assert_eq!(id.episode, episode);
                assert!(!id.show_name.is_empty());
                assert_eq!(parse(&id.source_filename), Some(id));
            }
        }
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("a.b.srt"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }
}
