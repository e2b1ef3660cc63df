//! The fixed category index: category name → human-written description.
//!
//! Entry order is preserved from the source and is the order used to break
//! similarity ties downstream.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;
use thiserror::Error;
use tracing::info;

/// Built-in cinema index used when no index file is configured.
pub const CINEMA: &[(&str, &str)] = &[
    (
        "Drama",
        "Movies with intense, emotional, and realistic storytelling.",
    ),
    (
        "Comedy",
        "Movies filled with humor and light-hearted storytelling.",
    ),
    ("Horror", "Movies that aim to scare and thrill the audience."),
    (
        "Action",
        "Movies packed with high-energy scenes and physical feats.",
    ),
];

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index file not found: {0}")]
    NotFound(PathBuf),
    #[error("read index file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse index JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category index is empty")]
    Empty,
    #[error("duplicate category '{0}'")]
    Duplicate(String),
}

/// Ordered, immutable category → description mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIndex {
    entries: IndexMap<String, String>,
}

impl CategoryIndex {
    /// Build an index from `(category, description)` pairs.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: IndexMap<String, String> = IndexMap::new();
        for (name, description) in pairs {
            match entries.entry(name.into()) {
                Entry::Occupied(e) => return Err(IndexError::Duplicate(e.key().clone())),
                Entry::Vacant(e) => {
                    e.insert(description.into());
                }
            }
        }
        if entries.is_empty() {
            return Err(IndexError::Empty);
        }
        Ok(Self { entries })
    }

    /// The built-in cinema index (Drama, Comedy, Horror, Action).
    pub fn cinema() -> Self {
        Self {
            entries: CINEMA
                .iter()
                .map(|&(n, d)| (n.to_string(), d.to_string()))
                .collect(),
        }
    }

    /// Parse a JSON object of `{"Category": "description", ...}`.
    ///
    /// A key repeated within the object keeps its first position and its
    /// last description, as with any JSON object decode.
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let raw: IndexMap<String, String> = serde_json::from_str(json)?;
        Self::new(raw)
    }

    /// Load an index from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let index = Self::from_json(&json)?;
        info!(path = %path.display(), categories = index.len(), "loaded category index");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: construction rejects an empty index.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category names in index order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Descriptions in index order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, d)| d.as_str())
    }

    /// `(category, description)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    pub fn description(&self, category: &str) -> Option<&str> {
        self.entries.get(category).map(String::as_str)
    }
}

impl Default for CategoryIndex {
    fn default() -> Self {
        Self::cinema()
    }
}
