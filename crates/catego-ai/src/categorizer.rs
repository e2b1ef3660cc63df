//! Assigns free text to the nearest category of a fixed index.
//!
//! The text is reduced to one vector according to the requested [`Method`]
//! and matched against the precomputed [`EmbeddingIndex`] by cosine similarity.

use catego_core::{CategoryIndex, Method};
use thiserror::Error;
use tracing::debug;

use crate::embed::Embed;
use crate::index::EmbeddingIndex;
use crate::summarizer::{Summarizer, SummaryBounds};
use crate::vector::mean;

/// Sentences per chunk for the `chunk` method.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum CategorizeError {
    #[error("Text must not be empty.")]
    EmptyText,
    #[error("Summarizer must be provided for 'summary' method.")]
    SummarizerUnavailable,
    #[error("embedding failed: {0:#}")]
    Embedding(anyhow::Error),
    #[error("summarization failed: {0:#}")]
    Summarization(anyhow::Error),
}

impl CategorizeError {
    /// Whether the caller's input caused the failure, as opposed to a model fault.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyText | Self::SummarizerUnavailable)
    }
}

/// Outcome of a single categorization.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub category: String,
    /// Cosine similarity between the text vector and the winning category.
    pub score: f32,
    pub method: Method,
}

/// Embedding-similarity categorizer over a fixed category index.
pub struct Categorizer {
    embedder: Box<dyn Embed + Send>,
    summarizer: Option<Box<dyn Summarizer + Send>>,
    index: EmbeddingIndex,
    chunk_size: usize,
    bounds: SummaryBounds,
}

impl Categorizer {
    /// Precompute category vectors for `index` with `embedder`.
    ///
    /// The same embedder is kept for input text so scores stay comparable.
    pub fn new(mut embedder: Box<dyn Embed + Send>, index: &CategoryIndex) -> anyhow::Result<Self> {
        let table = EmbeddingIndex::build(embedder.as_mut(), index)?;
        Ok(Self {
            embedder,
            summarizer: None,
            index: table,
            chunk_size: DEFAULT_CHUNK_SIZE,
            bounds: SummaryBounds::default(),
        })
    }

    /// Enable the `summary` method.
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer + Send>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Sentences per chunk for the `chunk` method (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_summary_bounds(mut self, bounds: SummaryBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Assign `text` to the category whose vector is most similar to it.
    pub fn assign_category(
        &mut self,
        text: &str,
        method: Method,
    ) -> Result<Assignment, CategorizeError> {
        let embedding = self.embed_text(text, method)?;
        let (category, score) = self
            .index
            .best_match(&embedding)
            .ok_or_else(|| CategorizeError::Embedding(anyhow::anyhow!("category index is empty")))?;

        debug!(%method, category, score, "assigned category");
        Ok(Assignment {
            category: category.to_string(),
            score,
            method,
        })
    }

    /// Reduce `text` to a single vector according to `method`.
    pub fn embed_text(&mut self, text: &str, method: Method) -> Result<Vec<f32>, CategorizeError> {
        if text.trim().is_empty() {
            return Err(CategorizeError::EmptyText);
        }
        match method {
            Method::Full => self.embedder.embed(text).map_err(CategorizeError::Embedding),
            Method::Chunk => self.chunk_and_embed(text),
            Method::Summary => self.summarize_and_embed(text),
        }
    }

    fn chunk_and_embed(&mut self, text: &str) -> Result<Vec<f32>, CategorizeError> {
        let chunks = chunk_text(text, self.chunk_size);
        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self
            .embedder
            .embed_batch(&refs)
            .map_err(CategorizeError::Embedding)?;
        debug!(chunks = vectors.len(), "embedded chunks");
        mean(&vectors).ok_or(CategorizeError::EmptyText)
    }

    fn summarize_and_embed(&mut self, text: &str) -> Result<Vec<f32>, CategorizeError> {
        let summarizer = self
            .summarizer
            .as_mut()
            .ok_or(CategorizeError::SummarizerUnavailable)?;
        let summary = summarizer
            .summarize(text, self.bounds, self.embedder.as_mut())
            .map_err(CategorizeError::Summarization)?;
        debug!(summary = %summary, "summarized text");
        if summary.trim().is_empty() {
            return Err(CategorizeError::Summarization(anyhow::anyhow!(
                "summarizer returned an empty summary"
            )));
        }
        self.embedder
            .embed(&summary)
            .map_err(CategorizeError::Embedding)
    }
}

/// Split `text` on `". "` and rejoin every `chunk_size` sentences with `". "`.
///
/// Text without the separator yields a single chunk. Blank text yields none.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let sentences: Vec<&str> = text.split(". ").collect();
    sentences
        .chunks(chunk_size.max(1))
        .map(|group| group.join(". "))
        .collect()
}
