//! Numbered file store
//!
//! Persists an ordered sequence of payloads as one file per item inside a
//! single directory, each file named by its index:
//!
//! ```text
//! fragments/
//! ├── 1.txt
//! ├── 2.txt
//! └── 3.txt
//! ```
//!
//! Reads recover the order from the filenames alone: the first run of ASCII
//! digits in a name is its index. Names without digits are ignored, gaps
//! between indices are tolerated, and a file that cannot be read is logged
//! and skipped rather than failing the whole listing.

use crate::config::ReplaceMode;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A payload together with the index parsed from its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedItem {
    pub index: u64,
    pub payload: Vec<u8>,
}

/// Directory entry that passed the name filter, not yet read
#[derive(Debug)]
struct NumberedEntry {
    index: u64,
    name: String,
    path: PathBuf,
}

/// Extract the index embedded in a filename.
///
/// Returns the first run of ASCII digits parsed as `u64`, or `None` when the
/// name has no digits or the run does not fit.
pub fn parse_index(file_name: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("static pattern"));
    pattern.find(file_name)?.as_str().parse().ok()
}

/// Store for collections of numbered files
#[derive(Debug, Clone)]
pub struct NumberedFileStore {
    suffix: String,
    mode: ReplaceMode,
}

impl NumberedFileStore {
    pub fn new(suffix: impl Into<String>, mode: ReplaceMode) -> Self {
        Self {
            suffix: suffix.into(),
            mode,
        }
    }

    /// Filename for the item at `index`
    pub fn file_name(&self, index: u64) -> String {
        format!("{}{}", index, self.suffix)
    }

    /// Replace the whole contents of `dir` with `items`.
    ///
    /// Item `i` is written as `start_index + i`. Returns the number of items
    /// written. Any previous file in `dir` is gone afterwards, including
    /// nested directories.
    ///
    /// With [`ReplaceMode::InPlace`] a failure leaves `dir` partially written
    /// and the collection must be re-ingested. With [`ReplaceMode::Staged`]
    /// a failed write leaves the previous contents untouched.
    pub async fn replace_all<I, T>(&self, dir: &Path, items: I, start_index: u64) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let written = match self.mode {
            ReplaceMode::InPlace => self.replace_in_place(dir, items, start_index).await?,
            ReplaceMode::Staged => self.replace_staged(dir, items, start_index).await?,
        };

        tracing::debug!(
            dir = %dir.display(),
            count = written,
            start_index,
            mode = ?self.mode,
            "Replaced numbered collection"
        );
        Ok(written)
    }

    async fn replace_in_place<I, T>(&self, dir: &Path, items: I, start_index: u64) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        remove_dir_if_present(dir).await?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io_strict(dir, e))?;
        self.write_items(dir, items, start_index).await
    }

    async fn replace_staged<I, T>(&self, dir: &Path, items: I, start_index: u64) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let staging = staging_dir_for(dir)?;
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| Error::io_strict(&staging, e))?;

        let written = match self.write_items(&staging, items, start_index).await {
            Ok(written) => written,
            Err(e) => {
                discard_staging(&staging).await;
                return Err(e);
            }
        };

        swap_into_place(&staging, dir).await?;
        Ok(written)
    }

    async fn write_items<I, T>(&self, dir: &Path, items: I, start_index: u64) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut written = 0;
        for (position, item) in items.into_iter().enumerate() {
            let path = dir.join(self.file_name(start_index + position as u64));
            tokio::fs::write(&path, item.as_ref())
                .await
                .map_err(|e| Error::io_strict(&path, e))?;
            written += 1;
        }
        Ok(written)
    }

    /// Read the payloads of `dir` in ascending index order
    pub async fn read_ordered(&self, dir: &Path) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .read_indexed(dir)
            .await?
            .into_iter()
            .map(|item| item.payload)
            .collect())
    }

    /// Read the payloads of `dir` in ascending index order, keeping indices.
    ///
    /// A missing `dir` is [`Error::NotFound`]. Unreadable files are skipped
    /// with a warning, so the result may be shorter than the listing.
    pub async fn read_indexed(&self, dir: &Path) -> Result<Vec<IndexedItem>> {
        let entries = self.list_numbered(dir).await?;
        let listed = entries.len();

        let mut items = Vec::with_capacity(listed);
        for entry in entries {
            match tokio::fs::read(&entry.path).await {
                Ok(payload) => items.push(IndexedItem {
                    index: entry.index,
                    payload,
                }),
                Err(e) => {
                    tracing::warn!(
                        file = %entry.name,
                        dir = %dir.display(),
                        error = %e,
                        "Skipping unreadable item"
                    );
                }
            }
        }

        if items.len() < listed {
            tracing::warn!(
                dir = %dir.display(),
                listed,
                read = items.len(),
                "Partial read of numbered collection"
            );
        }
        Ok(items)
    }

    /// List entries of `dir` that carry an index, sorted ascending.
    ///
    /// Entries sharing an index keep name order.
    async fn list_numbered(&self, dir: &Path) -> Result<Vec<NumberedEntry>> {
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::io(dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| Error::io(dir, e))? {
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to stat directory entry"
                    );
                    continue;
                }
            };
            if file_type.is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.ends_with(&self.suffix) {
                continue;
            }
            let Some(index) = parse_index(&name) else {
                tracing::debug!(file = %name, "Ignoring file without index");
                continue;
            };

            entries.push(NumberedEntry {
                index,
                path: entry.path(),
                name,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.sort_by_key(|e| e.index);
        Ok(entries)
    }
}

/// Sibling directory used to build a collection before swapping it in
fn staging_dir_for(dir: &Path) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Internal(format!("Invalid collection dir: {}", dir.display())))?;
    let staging = format!(".{}.staging-{}", name, uuid::Uuid::new_v4().simple());
    Ok(match dir.parent() {
        Some(parent) => parent.join(staging),
        None => PathBuf::from(staging),
    })
}

async fn remove_dir_if_present(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io_strict(dir, e)),
    }
}

/// Replace `dir` with `staging`. The staging dir is gone afterwards either way.
async fn swap_into_place(staging: &Path, dir: &Path) -> Result<()> {
    if let Err(e) = remove_dir_if_present(dir).await {
        discard_staging(staging).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(staging, dir).await {
        tracing::error!(
            dir = %dir.display(),
            staging = %staging.display(),
            error = %e,
            "Failed to move staged collection into place; collection is now empty"
        );
        discard_staging(staging).await;
        return Err(Error::io_strict(dir, e));
    }
    Ok(())
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(staging).await {
        tracing::warn!(
            dir = %staging.display(),
            error = %e,
            "Failed to discard staging directory"
        );
    }
}
