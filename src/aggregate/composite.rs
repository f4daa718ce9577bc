//! Composite scene view across collections
//!
//! Fragments, prompts and images are fetched independently and returned as
//! parallel sequences. Image generation runs behind fragment and prompt
//! editing, so the three lengths routinely differ; positional alignment is
//! offered through [`Composite::record`] but never enforced.

use crate::collection::{Collection, ImageGallery};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// Parallel per-scene sequences, in ascending index order each
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composite {
    pub fragments: Vec<String>,
    pub images: Vec<String>,
    pub prompts: Vec<String>,
}

/// Sizes of the sequences in a [`Composite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeLengths {
    pub fragments: usize,
    pub prompts: usize,
    pub images: usize,
}

/// One scene's artifacts at a shared position; absent slots are `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRecord<'a> {
    pub position: usize,
    pub fragment: Option<&'a str>,
    pub prompt: Option<&'a str>,
    pub image: Option<&'a str>,
}

impl Composite {
    pub fn lengths(&self) -> CompositeLengths {
        CompositeLengths {
            fragments: self.fragments.len(),
            prompts: self.prompts.len(),
            images: self.images.len(),
        }
    }

    /// Number of positions covered by at least one sequence
    pub fn len(&self) -> usize {
        self.fragments
            .len()
            .max(self.prompts.len())
            .max(self.images.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Artifacts at `position`, or `None` past the longest sequence
    pub fn record(&self, position: usize) -> Option<CompositeRecord<'_>> {
        if position >= self.len() {
            return None;
        }
        Some(CompositeRecord {
            position,
            fragment: self.fragments.get(position).map(String::as_str),
            prompt: self.prompts.get(position).map(String::as_str),
            image: self.images.get(position).map(String::as_str),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = CompositeRecord<'_>> {
        (0..self.len()).filter_map(|position| self.record(position))
    }
}

/// Builds [`Composite`] views from the live collections
pub struct Aggregator {
    fragments: Arc<Collection>,
    prompts: Arc<Collection>,
    gallery: Arc<ImageGallery>,
}

impl Aggregator {
    pub fn new(
        fragments: Arc<Collection>,
        prompts: Arc<Collection>,
        gallery: Arc<ImageGallery>,
    ) -> Self {
        Self {
            fragments,
            prompts,
            gallery,
        }
    }

    /// Fetch every source, versioning image references with the current time.
    ///
    /// A missing or unreadable source fails the whole build.
    pub async fn build_composite(&self) -> Result<Composite> {
        self.build_composite_versioned(chrono::Utc::now().timestamp())
            .await
    }

    pub async fn build_composite_versioned(&self, version: i64) -> Result<Composite> {
        let fragments = self.fragments.fetch().await?;
        let prompts = self.prompts.fetch().await?;
        let images = self.gallery.list_versioned(version).await?;

        let composite = Composite {
            fragments,
            images,
            prompts,
        };
        let lengths = composite.lengths();
        tracing::debug!(
            fragments = lengths.fragments,
            prompts = lengths.prompts,
            images = lengths.images,
            "Built composite view"
        );
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionKind;
    use crate::config::StorageConfig;
    use tempfile::TempDir;

    struct Fixture {
        fragments: Arc<Collection>,
        prompts: Arc<Collection>,
        gallery: Arc<ImageGallery>,
        _dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let storage = StorageConfig::with_base_dir(dir.path());
            Self {
                fragments: Arc::new(Collection::from_config(CollectionKind::Fragments, &storage)),
                prompts: Arc::new(Collection::from_config(CollectionKind::Prompts, &storage)),
                gallery: Arc::new(ImageGallery::from_config(&storage)),
                _dir: dir,
            }
        }

        fn aggregator(&self) -> Aggregator {
            Aggregator::new(
                self.fragments.clone(),
                self.prompts.clone(),
                self.gallery.clone(),
            )
        }
    }

    #[tokio::test]
    async fn test_unequal_lengths() {
        let fx = Fixture::new();
        fx.fragments
            .ingest("one\ntwo\nthree\nfour\nfive\n")
            .await
            .unwrap();
        fx.prompts.replace(["p1", "p2", "p3"]).await.unwrap();
        fx.gallery.ensure_dir().await.unwrap();

        let composite = fx.aggregator().build_composite().await.unwrap();
        assert_eq!(
            composite.lengths(),
            CompositeLengths {
                fragments: 5,
                prompts: 3,
                images: 0,
            }
        );
        assert_eq!(composite.len(), 5);

        for position in 3..5 {
            let record = composite.record(position).unwrap();
            assert!(record.fragment.is_some());
            assert!(record.prompt.is_none());
            assert!(record.image.is_none());
        }
        assert!(composite.record(5).is_none());
        assert_eq!(composite.records().count(), 5);
    }

    #[tokio::test]
    async fn test_aligned_records() {
        let fx = Fixture::new();
        fx.fragments.replace(["rain", "sun"]).await.unwrap();
        fx.prompts.replace(["grey sky", "blue sky"]).await.unwrap();
        fx.gallery.ensure_dir().await.unwrap();
        tokio::fs::write(fx.gallery.dir().join("1.png"), b"png")
            .await
            .unwrap();
        tokio::fs::write(fx.gallery.dir().join("0.png"), b"png")
            .await
            .unwrap();

        let composite = fx
            .aggregator()
            .build_composite_versioned(7)
            .await
            .unwrap();
        let second = composite.record(1).unwrap();
        assert_eq!(second.fragment, Some("sun"));
        assert_eq!(second.prompt, Some("blue sky"));
        assert_eq!(second.image, Some("/images/1.png?v=7"));
    }

    #[tokio::test]
    async fn test_missing_prompts_fails() {
        let fx = Fixture::new();
        fx.fragments.ingest("only\n").await.unwrap();
        fx.gallery.ensure_dir().await.unwrap();

        let err = fx.aggregator().build_composite().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_images_dir_fails() {
        let fx = Fixture::new();
        fx.fragments.ingest("only\n").await.unwrap();
        fx.prompts.replace(["prompt"]).await.unwrap();

        let err = fx.aggregator().build_composite().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_composite() {
        let composite = Composite::default();
        assert!(composite.is_empty());
        assert!(composite.record(0).is_none());
        assert_eq!(composite.records().count(), 0);
    }

    #[test]
    fn test_composite_serialization() {
        let composite = Composite {
            fragments: vec!["f".to_string()],
            images: vec![],
            prompts: vec!["p".to_string()],
        };
        let json = serde_json::to_value(&composite).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fragments": ["f"], "images": [], "prompts": ["p"]})
        );
    }
}
