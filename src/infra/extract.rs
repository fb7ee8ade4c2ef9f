use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::ExtractionError;
use crate::infra::fs::{collect_files, file_name_str, matching_extension};

/// Unpacks a subtitle pack and reports the files worth processing.
pub trait PackExtractor {
    /// Extracts `pack` into `target_dir` and returns the extracted files whose
    /// extension is in `allowed_extensions`, sorted by path.
    fn extract(
        &self,
        pack: &Path,
        target_dir: &Path,
        allowed_extensions: &[String],
    ) -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Drives the system `unzip`, `unrar` and `7z` tools.
pub struct CommandExtractor;

impl PackExtractor for CommandExtractor {
    fn extract(
        &self,
        pack: &Path,
        target_dir: &Path,
        allowed_extensions: &[String],
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let ext = pack
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let (tool, mut command) = match ext.as_deref() {
            Some("zip") => {
                let mut cmd = Command::new("unzip");
                cmd.arg("-o").arg("-q").arg(pack).arg("-d").arg(target_dir);
                ("unzip", cmd)
            }
            Some("rar") => {
                let mut cmd = Command::new("unrar");
                // unrar treats the destination as a directory only with a trailing separator
                cmd.arg("x")
                    .arg("-o+")
                    .arg("-y")
                    .arg(pack)
                    .arg(format!("{}{}", target_dir.display(), std::path::MAIN_SEPARATOR));
                ("unrar", cmd)
            }
            Some("7z") => {
                let mut cmd = Command::new("7z");
                cmd.arg("x")
                    .arg("-y")
                    .arg(format!("-o{}", target_dir.display()))
                    .arg(pack);
                ("7z", cmd)
            }
            _ => {
                return Err(ExtractionError::UnsupportedFormat {
                    path: pack.to_path_buf(),
                })
            }
        };

        let output = command
            .output()
            .map_err(|source| ExtractionError::ToolUnavailable { tool, source })?;

        if !output.status.success() {
            return Err(ExtractionError::ToolFailed {
                tool,
                path: pack.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let files = collect_files(target_dir, true, &|path: &Path| {
            file_name_str(path)
                .and_then(|name| matching_extension(name, allowed_extensions))
                .is_some()
        })?;

        debug!(
            pack = %pack.display(),
            count = files.len(),
            "extracted subtitle pack"
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unsupported_pack_format() {
        let temp_dir = TempDir::new().unwrap();
        let result = CommandExtractor.extract(
            Path::new("/tmp/subs.tar.gz"),
            temp_dir.path(),
            &[".srt".to_string()],
        );
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedFormat { .. })
        ));
    }
}
