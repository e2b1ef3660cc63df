//! The embedding seam shared by the ONNX model and test doubles.

/// Turns text into fixed-length vectors.
///
/// Every vector produced by one implementation has length [`Embed::dim`], so
/// vectors from the same embedder are directly comparable by cosine similarity.
pub trait Embed {
    /// Embedding dimensionality.
    fn dim(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in input order.
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single text string.
    fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for input"))
    }
}
