//! Collection module — per-kind artifact collections
//!
//! Fragments, prompts and translated prompts are numbered text collections
//! owned by this service. Images are produced elsewhere and only observed
//! through [`ImageGallery`].

pub mod gallery;
pub mod handler;
pub mod manager;
pub mod types;

pub use gallery::ImageGallery;
pub use handler::{collections_router, CollectionsState};
pub use manager::Collection;
pub use types::{CollectionKind, IndexedText, LineSplitter, Splitter};
