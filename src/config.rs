use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::scorer::DEFAULT_THRESHOLD;

const CONFIG_ENV: &str = "SUBTITLE_MATCHER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaLibrary {
    pub library_name: String,
    pub library_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub video_extensions: Vec<String>,
    pub subtitle_extensions: Vec<String>,
    pub subtitle_pack_extensions: Vec<String>,
    pub temp_dir: PathBuf,
    /// Defaults to a `cache` directory beside the config file.
    pub cache_dir: Option<PathBuf>,
    pub threshold: u32,
    pub media_libraries: Vec<MediaLibrary>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            video_extensions: to_strings(&[".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv"]),
            subtitle_extensions: to_strings(&[".srt", ".ass", ".ssa"]),
            subtitle_pack_extensions: to_strings(&[".zip", ".rar", ".7z"]),
            temp_dir: env::temp_dir().join("subtitle-matcher"),
            cache_dir: None,
            threshold: DEFAULT_THRESHOLD,
            media_libraries: Vec::new(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Config {
    /// Reads the config at `path`, writing the defaults there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {path:?}"))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {path:?}"))?;
            return Ok(config);
        }

        info!(path = %path.display(), "creating default config");
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config {path:?}"))?;
        Ok(())
    }

    pub fn add_library(&mut self, library_name: &str, library_path: &Path) -> Result<()> {
        if self.library(library_name).is_some() {
            bail!("Library with name '{library_name}' already exists");
        }
        self.media_libraries.push(MediaLibrary {
            library_name: library_name.to_string(),
            library_path: library_path.to_path_buf(),
        });
        Ok(())
    }

    pub fn remove_library(&mut self, library_name: &str) -> Result<()> {
        let before = self.media_libraries.len();
        self.media_libraries
            .retain(|lib| lib.library_name != library_name);
        if self.media_libraries.len() == before {
            bail!("Library '{library_name}' not found");
        }
        Ok(())
    }

    pub fn library(&self, library_name: &str) -> Option<&MediaLibrary> {
        self.media_libraries
            .iter()
            .find(|lib| lib.library_name == library_name)
    }

    pub fn cache_dir(&self, config_path: &Path) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .map(|dir| dir.join("cache"))
                .unwrap_or_else(|| PathBuf::from("cache"))
        })
    }
}

/// `--config`, then `$SUBTITLE_MATCHER_CONFIG`, then the user config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    get_config_dir_path().join("config.toml")
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("subtitle-matcher"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}
