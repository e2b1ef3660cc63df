//! Deterministic bag-of-words embedder for unit tests.

use std::collections::HashMap;

use crate::embed::Embed;
use crate::vector::normalize;

/// Assigns each distinct lowercase word its own dimension on first sight.
///
/// Texts sharing words get positive cosine similarity; texts with disjoint
/// vocabularies are orthogonal. Dimensions beyond `DIM` words wrap around.
pub(crate) struct WordEmbedder {
    vocab: HashMap<String, usize>,
    pub calls: usize,
}

const DIM: usize = 512;

impl WordEmbedder {
    pub(crate) fn new() -> Self {
        Self {
            vocab: HashMap::new(),
            calls: 0,
        }
    }

    fn vector(&mut self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let next = self.vocab.len();
            let slot = *self.vocab.entry(word.to_lowercase()).or_insert(next) % DIM;
            v[slot] += 1.0;
        }
        normalize(&mut v);
        v
    }
}

impl Embed for WordEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls += 1;
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Embedder whose every call fails.
pub(crate) struct FailingEmbedder;

impl Embed for FailingEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn embed_batch(&mut self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model unavailable")
    }
}
