//! Batch processing: inputs in, one [`Report`] per subtitle out.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::matcher;
use super::renamer::{self, PlacementStatus, SuffixPolicy};
use super::sources::VideoSource;
use crate::domain::models::SubtitleRecord;
use crate::infra::extract::PackExtractor;
use crate::infra::fs::{collect_files, file_name_str, matching_extension, Relocator};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub suffix_policy: SuffixPolicy,
    pub overwrite: bool,
    pub threshold: u32,
    /// Fall back to season/episode alone when no name clears the threshold.
    pub ignore_show_name: bool,
    /// Plan every placement but move and delete nothing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Moved,
    Overwritten,
    Skipped,
    Failed,
    NoMatch,
    Unparsed,
}

impl From<PlacementStatus> for Status {
    fn from(status: PlacementStatus) -> Self {
        match status {
            PlacementStatus::Moved => Status::Moved,
            PlacementStatus::Overwritten => Status::Overwritten,
            PlacementStatus::Skipped => Status::Skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub status: Status,
    pub subtitle_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_video: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl Report {
    fn new(status: Status, subtitle_file: &str) -> Self {
        Self {
            status,
            subtitle_file: subtitle_file.to_string(),
            matched_video: None,
            destination: None,
            match_score: None,
            library_name: None,
            error: None,
            dry_run: false,
        }
    }

    fn failed(subtitle_file: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(Status::Failed, subtitle_file)
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(f, "(dry run) ")?;
        }
        write!(f, "[{:?}] {}", self.status, self.subtitle_file)?;
        if let Some(destination) = &self.destination {
            write!(f, " -> {}", destination.display())?;
        }
        if let (Some(score), Some(library)) = (self.match_score, &self.library_name) {
            write!(f, " (score {score}, library {library})")?;
        }
        if let Some(error) = &self.error {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}

pub struct Pipeline<'a> {
    pub libraries: &'a [Box<dyn VideoSource>],
    pub extractor: &'a dyn PackExtractor,
    pub relocator: &'a dyn Relocator,
    pub subtitle_extensions: &'a [String],
    pub pack_extensions: &'a [String],
    /// Packs are unpacked into fresh directories under here.
    pub temp_dir: &'a Path,
    pub options: ProcessOptions,
}

impl Pipeline<'_> {
    /// Processes every input in order. Failures are recorded and never stop the batch.
    pub fn run(&self, inputs: &[PathBuf]) -> Vec<Report> {
        let mut reports = Vec::new();

        for input in inputs {
            if input.is_dir() {
                self.process_directory(input, &mut reports);
            } else if input.is_file() {
                if !self.process_file(input, &mut reports) {
                    warn!(path = %input.display(), "not a subtitle or subtitle pack, skipping");
                }
            } else {
                let name = file_name_str(input).unwrap_or_default();
                reports.push(Report::failed(name, format!("Input path does not exist: {input:?}")));
            }
        }

        reports
    }

    fn process_directory(&self, dir: &Path, reports: &mut Vec<Report>) {
        let files = match collect_files(dir, true, &|path: &Path| self.is_processable(path)) {
            Ok(files) => files,
            Err(e) => {
                let name = file_name_str(dir).unwrap_or_default();
                reports.push(Report::failed(name, format!("Failed to read directory {dir:?}: {e}")));
                return;
            }
        };

        info!(dir = %dir.display(), count = files.len(), "found files to process");
        for file in files {
            self.process_file(&file, reports);
        }
    }

    fn is_processable(&self, path: &Path) -> bool {
        file_name_str(path).is_some_and(|name| {
            matching_extension(name, self.subtitle_extensions).is_some()
                || matching_extension(name, self.pack_extensions).is_some()
        })
    }

    /// Returns false when `path` is neither a subtitle nor a pack.
    fn process_file(&self, path: &Path, reports: &mut Vec<Report>) -> bool {
        let Some(name) = file_name_str(path) else {
            return false;
        };

        if matching_extension(name, self.subtitle_extensions).is_some() {
            reports.push(self.process_subtitle(path, name));
        } else if matching_extension(name, self.pack_extensions).is_some() {
            self.process_pack(path, name, reports);
        } else {
            return false;
        }
        true
    }

    fn process_pack(&self, pack: &Path, name: &str, reports: &mut Vec<Report>) {
        info!(pack = %pack.display(), "extracting subtitle pack");

        let extracted = fs::create_dir_all(self.temp_dir).and_then(|()| {
            tempfile::Builder::new()
                .prefix("pack-")
                .tempdir_in(self.temp_dir)
        });
        let target = match extracted {
            Ok(target) => target,
            Err(e) => {
                reports.push(Report::failed(
                    name,
                    format!("Failed to create extraction directory in {:?}: {e}", self.temp_dir),
                ));
                return;
            }
        };

        let files = match self
            .extractor
            .extract(pack, target.path(), self.subtitle_extensions)
        {
            Ok(files) => files,
            Err(e) => {
                warn!(pack = %pack.display(), error = %e, "extraction failed");
                reports.push(Report::failed(name, format!("{:#}", anyhow::Error::from(e))));
                return;
            }
        };

        for file in files {
            if let Some(file_name) = file_name_str(&file) {
                reports.push(self.process_subtitle(&file, file_name));
            }
        }
    }

    fn process_subtitle(&self, path: &Path, name: &str) -> Report {
        let Some(subtitle) = SubtitleRecord::from_path(path) else {
            info!(subtitle = name, "no season/episode in filename");
            return Report::new(Status::Unparsed, name);
        };

        let found = matcher::match_subtitle(&subtitle, self.libraries, self.options.threshold)
            .or_else(|| {
                self.options
                    .ignore_show_name
                    .then(|| matcher::match_ignoring_show_name(&subtitle, self.libraries))
                    .flatten()
            });
        let Some(found) = found else {
            return Report::new(Status::NoMatch, name);
        };

        let mut report = Report {
            matched_video: Some(found.video.full_path.clone()),
            match_score: Some(found.score),
            library_name: Some(found.library_name.clone()),
            dry_run: self.options.dry_run,
            ..Report::new(Status::Failed, name)
        };

        if self.options.dry_run {
            let placement = renamer::plan(
                &subtitle,
                &found.video,
                &self.options.suffix_policy,
                self.options.overwrite,
            );
            report.status = placement.status.into();
            report.destination = Some(placement.destination);
            return report;
        }

        match renamer::plan_and_execute(
            &subtitle,
            &found.video,
            &self.options.suffix_policy,
            self.options.overwrite,
            self.relocator,
        ) {
            Ok(placement) => {
                report.status = placement.status.into();
                report.destination = Some(placement.destination);
            }
            Err(e) => {
                warn!(subtitle = name, error = %e, "relocation failed");
                report.error = Some(format!("{:#}", anyhow::Error::from(e)));
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::infra::fs::FsRelocator;
    use crate::workflows::sources::live::LiveLibrary;
    use std::io;
    use tempfile::TempDir;

    /// Writes a fixed set of files into the target directory, or fails for `broken.zip`.
    struct FakeExtractor {
        files: Vec<&'static str>,
    }

    impl PackExtractor for FakeExtractor {
        fn extract(
            &self,
            pack: &Path,
            target_dir: &Path,
            allowed_extensions: &[String],
        ) -> Result<Vec<PathBuf>, ExtractionError> {
            if file_name_str(pack) == Some("broken.zip") {
                return Err(ExtractionError::ToolFailed {
                    tool: "unzip",
                    path: pack.to_path_buf(),
                    stderr: "bad archive".to_string(),
                });
            }
            for file in &self.files {
                fs::write(target_dir.join(file), "packed")?;
            }
            Ok(collect_files(target_dir, true, &|path: &Path| {
                file_name_str(path)
                    .and_then(|name| matching_extension(name, allowed_extensions))
                    .is_some()
            })?)
        }
    }

    struct ReadOnlyRelocator;

    impl Relocator for ReadOnlyRelocator {
        fn move_file(&self, _source: &Path, _destination: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    struct Fixture {
        temp_dir: TempDir,
        libraries: Vec<Box<dyn VideoSource>>,
        subtitle_extensions: Vec<String>,
        pack_extensions: Vec<String>,
        ignore_show_name: bool,
        dry_run: bool,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let tv = temp_dir.path().join("tv");
            fs::create_dir_all(tv.join("Breaking Bad")).unwrap();
            fs::create_dir_all(tv.join("Dark")).unwrap();
            fs::create_dir_all(temp_dir.path().join("incoming")).unwrap();
            fs::write(
                tv.join("Breaking Bad").join("Breaking Bad - S01E01 - Pilot (2008) 1080p.mkv"),
                "",
            )
            .unwrap();
            fs::write(tv.join("Dark").join("Dark.S01E01.mkv"), "").unwrap();

            let libraries: Vec<Box<dyn VideoSource>> = vec![Box::new(LiveLibrary::new(
                "tv",
                tv,
                vec![".mkv".to_string()],
            ))];

            Self {
                temp_dir,
                libraries,
                subtitle_extensions: vec![".srt".to_string(), ".ass".to_string()],
                pack_extensions: vec![".zip".to_string()],
                ignore_show_name: false,
                dry_run: false,
            }
        }

        fn incoming(&self, name: &str) -> PathBuf {
            let path = self.temp_dir.path().join("incoming").join(name);
            fs::write(&path, "subtitle").unwrap();
            path
        }

        fn tv(&self, relative: &str) -> PathBuf {
            self.temp_dir.path().join("tv").join(relative)
        }

        fn run(
            &self,
            inputs: &[PathBuf],
            extractor: &dyn PackExtractor,
            relocator: &dyn Relocator,
        ) -> Vec<Report> {
            let temp_dir = self.temp_dir.path().join("tmp");
            let pipeline = Pipeline {
                libraries: &self.libraries,
                extractor,
                relocator,
                subtitle_extensions: &self.subtitle_extensions,
                pack_extensions: &self.pack_extensions,
                temp_dir: &temp_dir,
                options: ProcessOptions {
                    suffix_policy: SuffixPolicy::Preserve,
                    overwrite: false,
                    threshold: 80,
                    ignore_show_name: self.ignore_show_name,
                    dry_run: self.dry_run,
                },
            };
            pipeline.run(inputs)
        }
    }

    fn no_packs() -> FakeExtractor {
        FakeExtractor { files: Vec::new() }
    }

    fn summary(reports: &[Report]) -> Vec<(Status, &str)> {
        reports
            .iter()
            .map(|r| (r.status, r.subtitle_file.as_str()))
            .collect()
    }

    #[test]
    fn test_directory_batch_reports_every_subtitle() {
        let f = Fixture::new();
        f.incoming("Breaking.Bad.S01E01.Pilot.en.srt");
        f.incoming("Dark.S09E09.srt");
        f.incoming("notes.srt");
        f.incoming("random_notes.txt");

        let reports = f.run(
            &[f.temp_dir.path().join("incoming")],
            &no_packs(),
            &FsRelocator,
        );

        assert_eq!(
            summary(&reports),
            vec![
                (Status::Moved, "Breaking.Bad.S01E01.Pilot.en.srt"),
                (Status::NoMatch, "Dark.S09E09.srt"),
                (Status::Unparsed, "notes.srt"),
            ]
        );

        let moved = &reports[0];
        assert_eq!(moved.match_score, Some(100));
        assert_eq!(moved.library_name.as_deref(), Some("tv"));
        let destination = f.tv("Breaking Bad/Breaking Bad - S01E01 - Pilot (2008) 1080p.Pilot.en.srt");
        assert_eq!(moved.destination.as_ref(), Some(&destination));
        assert!(destination.exists());
    }

    #[test]
    fn test_explicit_non_subtitle_input_has_no_entry() {
        let f = Fixture::new();
        let notes = f.incoming("random_notes.txt");

        let reports = f.run(&[notes.clone()], &no_packs(), &FsRelocator);

        assert!(reports.is_empty());
        assert!(notes.exists());
    }

    #[test]
    fn test_existing_destination_is_skipped() {
        let f = Fixture::new();
        let existing = f.tv("Dark/Dark.S01E01.de.srt");
        fs::write(&existing, "existing").unwrap();
        let subtitle = f.incoming("Dark.S01E01.de.srt");

        let reports = f.run(&[subtitle.clone()], &no_packs(), &FsRelocator);

        assert_eq!(summary(&reports), vec![(Status::Skipped, "Dark.S01E01.de.srt")]);
        assert!(!subtitle.exists());
        assert_eq!(fs::read_to_string(existing).unwrap(), "existing");
    }

    #[test]
    fn test_packs_are_extracted_and_failures_isolated() {
        let f = Fixture::new();
        let broken = f.incoming("broken.zip");
        let good = f.incoming("season1.zip");
        let extractor = FakeExtractor {
            files: vec!["Dark.S01E01.srt", "readme.txt"],
        };

        let reports = f.run(&[broken, good], &extractor, &FsRelocator);

        assert_eq!(
            summary(&reports),
            vec![
                (Status::Failed, "broken.zip"),
                (Status::Moved, "Dark.S01E01.srt"),
            ]
        );
        assert!(reports[0].error.as_deref().unwrap().contains("bad archive"));
        assert_eq!(fs::read_to_string(f.tv("Dark/Dark.S01E01.srt")).unwrap(), "packed");
    }

    #[test]
    fn test_relocation_failure_does_not_stop_batch() {
        let f = Fixture::new();
        let first = f.incoming("Dark.S01E01.srt");
        let second = f.incoming("Breaking.Bad.S01E01.srt");

        let reports = f.run(&[first.clone(), second], &no_packs(), &ReadOnlyRelocator);

        assert_eq!(
            summary(&reports),
            vec![
                (Status::Failed, "Dark.S01E01.srt"),
                (Status::Failed, "Breaking.Bad.S01E01.srt"),
            ]
        );
        let error = reports[0].error.as_deref().unwrap();
        assert!(error.contains(&first.display().to_string()));
        assert!(error.contains("Dark.S01E01.srt"));
        assert_eq!(reports[0].match_score, Some(100));
        assert!(first.exists());
    }

    #[test]
    fn test_missing_input_is_reported() {
        let f = Fixture::new();
        let reports = f.run(
            &[f.temp_dir.path().join("gone.srt")],
            &no_packs(),
            &FsRelocator,
        );
        assert_eq!(summary(&reports), vec![(Status::Failed, "gone.srt")]);
    }

    #[test]
    fn test_report_json_omits_empty_fields() {
        let report = Report::new(Status::NoMatch, "Dark.S09E09.srt");
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"status":"NoMatch","subtitle_file":"Dark.S09E09.srt"}"#
        );
        assert_eq!(report.to_string(), "[NoMatch] Dark.S09E09.srt");
    }

    #[test]
    fn test_dry_run_plans_without_touching_files() {
        let mut f = Fixture::new();
        f.dry_run = true;
        let existing = f.tv("Dark/Dark.S01E01.de.srt");
        fs::write(&existing, "existing").unwrap();
        let taken = f.incoming("Dark.S01E01.de.srt");
        let free = f.incoming("Breaking.Bad.S01E01.Pilot.en.srt");

        let reports = f.run(&[taken.clone(), free.clone()], &no_packs(), &ReadOnlyRelocator);

        assert_eq!(
            summary(&reports),
            vec![
                (Status::Skipped, "Dark.S01E01.de.srt"),
                (Status::Moved, "Breaking.Bad.S01E01.Pilot.en.srt"),
            ]
        );
        assert!(reports.iter().all(|r| r.dry_run && r.error.is_none()));
        let planned = f.tv("Breaking Bad/Breaking Bad - S01E01 - Pilot (2008) 1080p.Pilot.en.srt");
        assert_eq!(reports[1].destination.as_ref(), Some(&planned));
        assert!(!planned.exists());
        assert!(taken.exists());
        assert!(free.exists());
        assert_eq!(fs::read_to_string(existing).unwrap(), "existing");
        assert!(reports[0].to_string().starts_with("(dry run) [Skipped]"));
    }

    #[test]
    fn test_ignore_show_name_falls_back_to_episode() {
        let mut f = Fixture::new();
        let subtitle = f.incoming("Unknown.Show.S01E01.srt");

        let reports = f.run(&[subtitle.clone()], &no_packs(), &FsRelocator);
        assert_eq!(summary(&reports), vec![(Status::NoMatch, "Unknown.Show.S01E01.srt")]);
        assert!(subtitle.exists());

        f.ignore_show_name = true;
        let reports = f.run(&[subtitle.clone()], &no_packs(), &FsRelocator);
        assert_eq!(summary(&reports), vec![(Status::Moved, "Unknown.Show.S01E01.srt")]);
        assert!(reports[0].match_score.unwrap() < 80);
        assert_eq!(
            reports[0].matched_video.as_ref(),
            Some(&f.tv("Breaking Bad/Breaking Bad - S01E01 - Pilot (2008) 1080p.mkv"))
        );
        assert!(!subtitle.exists());
    }
}
