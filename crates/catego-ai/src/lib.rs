//! AI inference layer: sentence embeddings, summarization, and nearest-category assignment.

pub mod categorizer;
pub mod embed;
pub mod index;
pub mod summarizer;
pub mod vector;

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
pub use embedder::Embedder;

#[cfg(feature = "remote")]
mod remote;
#[cfg(feature = "remote")]
pub use remote::{RemoteError, RemoteSummarizer};

#[cfg(test)]
pub(crate) mod testing;

pub use categorizer::{Assignment, CategorizeError, Categorizer, DEFAULT_CHUNK_SIZE, chunk_text};
pub use embed::Embed;
pub use index::EmbeddingIndex;
pub use summarizer::{ExtractiveSummarizer, Summarizer, SummaryBounds};
