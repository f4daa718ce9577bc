//! Storyboard configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Storyboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryboardConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl StoryboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1198,
            cors_origins: Vec::new(),
        }
    }
}

/// How a collection directory is swapped on replace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMode {
    /// Wipe the directory, then write items straight into it. A failed write
    /// leaves a partial collection behind.
    InPlace,
    /// Write items into a sibling staging directory and rename it over the
    /// target once every write succeeded.
    #[default]
    Staged,
}

/// Artifact storage configuration
///
/// Relative directories are resolved against `base_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for all collections
    pub base_dir: PathBuf,

    /// Scene text fragments
    pub fragments_dir: PathBuf,

    /// Source-language image prompts
    pub prompts_dir: PathBuf,

    /// Translated image prompts
    pub prompts_en_dir: PathBuf,

    /// Images written by the external generator
    pub images_dir: PathBuf,

    /// Audio written by the external TTS service
    pub audio_dir: PathBuf,

    /// Raw novel text ingested into the fragments collection
    pub raw_source: PathBuf,

    /// Suffix of numbered item files
    pub file_suffix: String,

    /// Public URL prefix under which images are served
    pub images_public_path: String,

    /// Directory swap strategy for replace and ingest
    pub replace_mode: ReplaceMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs_next::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storyboard");

        Self {
            base_dir: base,
            fragments_dir: PathBuf::from("fragments"),
            prompts_dir: PathBuf::from("prompts"),
            prompts_en_dir: PathBuf::from("prompts_en"),
            images_dir: PathBuf::from("images"),
            audio_dir: PathBuf::from("audio"),
            raw_source: PathBuf::from("novel.txt"),
            file_suffix: ".txt".to_string(),
            images_public_path: "/images".to_string(),
            replace_mode: ReplaceMode::default(),
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `base_dir` with every other setting at its default
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Resolve a configured path against `base_dir`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn fragments_path(&self) -> PathBuf {
        self.resolve(&self.fragments_dir)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.resolve(&self.prompts_dir)
    }

    pub fn prompts_en_path(&self) -> PathBuf {
        self.resolve(&self.prompts_en_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.resolve(&self.images_dir)
    }

    pub fn audio_path(&self) -> PathBuf {
        self.resolve(&self.audio_dir)
    }

    pub fn raw_source_path(&self) -> PathBuf {
        self.resolve(&self.raw_source)
    }
}
