//! Category embedding table.
//!
//! Embeds each category description once, then classifies text vectors by
//! cosine similarity to the nearest category vector.

use catego_core::CategoryIndex;
use tracing::info;

use crate::embed::Embed;
use crate::vector::cosine_sim;

/// Category → description vector, in category index order.
///
/// Built once at startup and never mutated. Every vector comes from the same
/// embedder that later embeds input text, so scores are comparable.
pub struct EmbeddingIndex {
    entries: Vec<(String, Vec<f32>)>,
    dim: usize,
}

impl EmbeddingIndex {
    /// Embed every description in `index` in a single batch.
    pub fn build(embedder: &mut dyn Embed, index: &CategoryIndex) -> anyhow::Result<Self> {
        let descriptions: Vec<&str> = index.descriptions().collect();
        let vectors = embedder.embed_batch(&descriptions)?;
        anyhow::ensure!(
            vectors.len() == index.len(),
            "embedder returned {} vectors for {} categories",
            vectors.len(),
            index.len()
        );

        let entries: Vec<(String, Vec<f32>)> = index
            .categories()
            .map(str::to_string)
            .zip(vectors)
            .collect();

        info!(
            categories = entries.len(),
            dim = embedder.dim(),
            "built category embedding table"
        );
        Ok(Self {
            entries,
            dim: embedder.dim(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Category names in index order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// The precomputed vector for `category`.
    pub fn get(&self, category: &str) -> Option<&[f32]> {
        self.entries
            .iter()
            .find(|(n, _)| n == category)
            .map(|(_, v)| v.as_slice())
    }

    /// Cosine similarity of `embedding` to every category, in index order.
    pub fn scores<'a>(&'a self, embedding: &[f32]) -> impl Iterator<Item = (&'a str, f32)> {
        self.entries
            .iter()
            .map(move |(label, v)| (label.as_str(), cosine_sim(embedding, v)))
    }

    /// Find the category with highest cosine similarity.
    ///
    /// Only a strictly greater score replaces the current best, so ties go to
    /// the category that appears first in the index. NaN ranks below every
    /// number and ties with itself.
    pub fn best_match(&self, embedding: &[f32]) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (label, sim) in self.scores(embedding) {
            match best {
                Some((_, best_sim)) if !outranks(sim, best_sim) => {}
                _ => best = Some((label, sim)),
            }
        }
        best
    }
}

fn outranks(sim: f32, best: f32) -> bool {
    if best.is_nan() {
        !sim.is_nan()
    } else {
        sim > best
    }
}
