//! Image gallery
//!
//! Images are written by the external generator under names the store does
//! not control. The gallery only lists them and turns each file into a public
//! reference with a cache-busting version query, so a regenerated image is
//! refetched by the browser.

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::store::parse_index;
use std::path::{Path, PathBuf};

/// Read-only view of the images directory
#[derive(Debug, Clone)]
pub struct ImageGallery {
    dir: PathBuf,
    public_path: String,
}

impl ImageGallery {
    pub fn new(dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_path: public_path.into(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.images_path(), storage.images_public_path.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Create the images directory so the generator and static server can use it
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::io_strict(&self.dir, e))
    }

    /// Image file names in scene order.
    ///
    /// Names carrying an index sort by it; the rest follow in name order.
    pub async fn file_names(&self) -> Result<Vec<String>> {
        let mut reader = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| Error::io(&self.dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::io(&self.dir, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::debug!(name = ?name, "Ignoring image with non UTF-8 name");
                }
            }
        }

        names.sort();
        names.sort_by_key(|name| match parse_index(name) {
            Some(index) => (0, index),
            None => (1, 0),
        });
        Ok(names)
    }

    /// Public image references versioned with the current time
    pub async fn list(&self) -> Result<Vec<String>> {
        self.list_versioned(chrono::Utc::now().timestamp()).await
    }

    /// Public image references versioned with `version`
    pub async fn list_versioned(&self, version: i64) -> Result<Vec<String>> {
        let names = self.file_names().await?;
        Ok(names
            .iter()
            .map(|name| self.reference(name, version))
            .collect())
    }

    /// `<public_path>/<name>?v=<version>`
    pub fn reference(&self, name: &str, version: i64) -> String {
        format!(
            "{}/{}?v={}",
            self.public_path.trim_end_matches('/'),
            name,
            version
        )
    }
}
