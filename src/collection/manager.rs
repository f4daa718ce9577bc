//! Collection manager
//!
//! Binds a [`NumberedFileStore`] to one artifact directory. `replace` numbers
//! items from 0, `ingest` numbers them from 1; readers only rely on ascending
//! order, never on the first index.

use super::types::*;
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::store::NumberedFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One numbered text collection on disk
pub struct Collection {
    kind: CollectionKind,
    dir: PathBuf,
    store: NumberedFileStore,
    splitter: Arc<dyn Splitter>,
}

impl Collection {
    /// Create a collection at `dir` using the default [`LineSplitter`]
    pub fn new(kind: CollectionKind, dir: impl Into<PathBuf>, store: NumberedFileStore) -> Self {
        Self {
            kind,
            dir: dir.into(),
            store,
            splitter: Arc::new(LineSplitter),
        }
    }

    /// Create the collection for `kind` as laid out by the storage settings
    pub fn from_config(kind: CollectionKind, storage: &StorageConfig) -> Self {
        let store = NumberedFileStore::new(storage.file_suffix.clone(), storage.replace_mode);
        Self::new(kind, kind.dir(storage), store)
    }

    /// Replace the raw-source splitter used by `ingest`
    pub fn with_splitter(mut self, splitter: impl Splitter + 'static) -> Self {
        self.splitter = Arc::new(splitter);
        self
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace every item of the collection, numbering from 0
    pub async fn replace<I, T>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let count = self
            .store
            .replace_all(&self.dir, items, REPLACE_START_INDEX)
            .await?;
        tracing::info!(collection = %self.kind, count, "Collection replaced");
        Ok(count)
    }

    /// Split `raw` and replace the collection with the pieces, numbering from 1
    pub async fn ingest(&self, raw: &str) -> Result<usize> {
        let pieces = self.splitter.split(raw);
        let count = self
            .store
            .replace_all(&self.dir, &pieces, INGEST_START_INDEX)
            .await?;
        tracing::info!(collection = %self.kind, count, "Collection ingested");
        Ok(count)
    }

    /// Read a raw source file and ingest it
    pub async fn ingest_file(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        tracing::debug!(
            collection = %self.kind,
            source = %path.display(),
            bytes = raw.len(),
            "Ingesting raw source"
        );
        self.ingest(&raw).await
    }

    /// Current items in ascending index order
    pub async fn fetch(&self) -> Result<Vec<String>> {
        Ok(self
            .fetch_indexed()
            .await?
            .into_iter()
            .map(|item| item.text)
            .collect())
    }

    /// Current items in ascending index order, with their indices.
    ///
    /// Items that are not valid UTF-8 are skipped like unreadable files.
    pub async fn fetch_indexed(&self) -> Result<Vec<IndexedText>> {
        let items = self.store.read_indexed(&self.dir).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match String::from_utf8(item.payload) {
                Ok(text) => Some(IndexedText {
                    index: item.index,
                    text,
                }),
                Err(e) => {
                    tracing::warn!(
                        collection = %self.kind,
                        index = item.index,
                        error = %e,
                        "Skipping item that is not valid UTF-8"
                    );
                    None
                }
            })
            .collect())
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("dir", &self.dir)
            .field("store", &self.store)
            .finish()
    }
}
