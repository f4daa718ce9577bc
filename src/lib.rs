//! Storyboard - ordered per-scene artifact store for novel-to-video pipelines
//!
//! A novel is split into scenes, and each scene accumulates artifacts: a text
//! fragment, an image prompt, a translated prompt, an image and audio. Every
//! artifact kind lives in its own directory as numbered files, and scene `i`
//! of one kind lines up with scene `i` of the others.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        HTTP API (axum)                        │
//! │   /api/novel/fragments  /api/novel/prompts  /api/novel/initial │
//! └───────────────┬───────────────────────────────┬──────────────┘
//!                 │                               │
//! ┌───────────────▼──────────────┐   ┌────────────▼─────────────┐
//! │      Collection Managers      │   │        Aggregator        │
//! │  fragments · prompts · en     │◄──┤  parallel sequences,     │
//! │  ingest · replace · fetch     │   │  joined by position      │
//! └───────────────┬──────────────┘   └────────────┬─────────────┘
//!                 │                               │
//! ┌───────────────▼──────────────┐   ┌────────────▼─────────────┐
//! │      Numbered File Store      │   │      Image Gallery       │
//! │  0.txt 1.txt ... ordered read │   │  list + cache-bust refs  │
//! └──────────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`]: numbered file persistence
//! - [`collection`]: per-kind collections, raw-source ingestion, image gallery
//! - [`aggregate`]: combined scene view
//! - [`api`]: HTTP router
//! - [`config`]: configuration management

pub mod aggregate;
pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod store;

pub use config::StoryboardConfig;
pub use error::{Error, Result};
