//! Collection kinds and raw-source splitting

use crate::config::StorageConfig;
use std::path::PathBuf;

/// Index of the first item written by [`Collection::replace`](super::Collection::replace)
pub const REPLACE_START_INDEX: u64 = 0;

/// Index of the first item written by [`Collection::ingest`](super::Collection::ingest)
pub const INGEST_START_INDEX: u64 = 1;

/// Artifact kind stored as a numbered text collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Scene text split from the novel
    Fragments,
    /// Image prompts in the source language
    Prompts,
    /// Image prompts translated to English
    PromptsEn,
}

impl CollectionKind {
    /// Directory of this collection under the given storage settings
    pub fn dir(&self, storage: &StorageConfig) -> PathBuf {
        match self {
            Self::Fragments => storage.fragments_path(),
            Self::Prompts => storage.prompts_path(),
            Self::PromptsEn => storage.prompts_en_path(),
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fragments => write!(f, "fragments"),
            Self::Prompts => write!(f, "prompts"),
            Self::PromptsEn => write!(f, "prompts_en"),
        }
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fragments" => Ok(Self::Fragments),
            "prompts" => Ok(Self::Prompts),
            "prompts_en" => Ok(Self::PromptsEn),
            other => Err(format!("unknown collection: {}", other)),
        }
    }
}

/// A text item with the index recovered from its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedText {
    pub index: u64,
    pub text: String,
}

/// Turns a raw source into the ordered items of a collection
pub trait Splitter: Send + Sync {
    fn split(&self, raw: &str) -> Vec<String>;
}

/// One item per non-blank line, with surrounding whitespace trimmed
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSplitter;

impl Splitter for LineSplitter {
    fn split(&self, raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_splitter_drops_blank_lines() {
        let pieces = LineSplitter.split("a\n\nb\n  \nc\n");
        assert_eq!(pieces, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_line_splitter_trims_and_handles_crlf() {
        let pieces = LineSplitter.split("  first scene \r\n\tsecond\r\n\r\n");
        assert_eq!(pieces, vec!["first scene", "second"]);
    }

    #[test]
    fn test_line_splitter_empty_input() {
        assert!(LineSplitter.split("").is_empty());
        assert!(LineSplitter.split("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_collection_kind_display_from_str() {
        for kind in [
            CollectionKind::Fragments,
            CollectionKind::Prompts,
            CollectionKind::PromptsEn,
        ] {
            let parsed: CollectionKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("images".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_collection_kind_dir() {
        let storage = StorageConfig::with_base_dir("/data");
        assert_eq!(
            CollectionKind::Fragments.dir(&storage),
            PathBuf::from("/data/fragments")
        );
        assert_eq!(
            CollectionKind::PromptsEn.dir(&storage),
            PathBuf::from("/data/prompts_en")
        );
    }
}
