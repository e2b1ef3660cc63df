//! ONNX Runtime embedding pipeline for sentence-transformers models.
//!
//! Implements mean-pooled embeddings using all-MiniLM-L6-v2 (384 dimensions).
//! The model directory must contain `model.onnx` and `tokenizer.json`.

use std::path::Path;

use anyhow::Context;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::embed::Embed;
use crate::vector::normalize;

/// Longest token sequence fed to the model (MiniLM's trained window).
const MAX_TOKENS: usize = 256;

/// Sentence embedding generator using ONNX Runtime.
///
/// Loads a sentence-transformers model (e.g., all-MiniLM-L6-v2) and produces
/// 384-dimensional normalized embeddings suitable for cosine similarity search.
pub struct Embedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl Embedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?
            .commit_from_file(&model_path)
            .with_context(|| format!("load ONNX model {}", model_path.display()))?;

        // Infer embedding dimension from model output shape.
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        // Configure padding to pad all inputs in a batch to the same length.
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }
}

impl Embed for Embedder {
    /// Embedding dimensionality (384 for all-MiniLM-L6-v2).
    fn dim(&self) -> usize {
        self.dim
    }

    /// Embed a batch of texts, returning one normalized vector per input.
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch = self.encode(texts)?;
        let shape = [batch.rows as i64, batch.seq_len as i64];

        let outputs = self.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, batch.input_ids.into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, batch.attention_mask.clone().into_boxed_slice()))?,
            "token_type_ids" => Tensor::from_array((shape, batch.token_type_ids.into_boxed_slice()))?,
        ])?;

        // Token embeddings: [rows, seq_len, dim].
        let (output_shape, hidden) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == batch.rows && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{}, {}, {}]",
            batch.rows,
            batch.seq_len,
            self.dim
        );

        Ok(mean_pool(
            hidden,
            &batch.attention_mask,
            batch.rows,
            batch.seq_len,
            dims[1] as usize,
            self.dim,
        ))
    }
}

/// Padded model inputs for one batch, flattened row-major as `[rows, seq_len]`.
struct EncodedBatch {
    rows: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

impl Embedder {
    fn encode(&self, texts: &[&str]) -> anyhow::Result<EncodedBatch> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let rows = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut batch = EncodedBatch {
            rows,
            seq_len,
            input_ids: vec![0; rows * seq_len],
            attention_mask: vec![0; rows * seq_len],
            token_type_ids: vec![0; rows * seq_len],
        };
        for (i, encoding) in encodings.iter().enumerate() {
            let row = i * seq_len;
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();
            for j in 0..ids.len() {
                batch.input_ids[row + j] = ids[j] as i64;
                batch.attention_mask[row + j] = mask[j] as i64;
                batch.token_type_ids[row + j] = types[j] as i64;
            }
        }
        Ok(batch)
    }
}

/// Attention-masked mean over token embeddings, L2-normalized per row.
///
/// `hidden` is `[rows, out_seq_len, dim]`; `mask` is `[rows, seq_len]`.
fn mean_pool(
    hidden: &[f32],
    mask: &[i64],
    rows: usize,
    seq_len: usize,
    out_seq_len: usize,
    dim: usize,
) -> Vec<Vec<f32>> {
    (0..rows)
        .map(|i| {
            let mut pooled = vec![0.0f32; dim];
            let mut tokens = 0.0f32;
            for j in 0..out_seq_len.min(seq_len) {
                let weight = mask[i * seq_len + j] as f32;
                if weight > 0.0 {
                    let token = &hidden[(i * out_seq_len + j) * dim..][..dim];
                    for (p, &h) in pooled.iter_mut().zip(token) {
                        *p += h * weight;
                    }
                    tokens += weight;
                }
            }
            if tokens > 0.0 {
                pooled.iter_mut().for_each(|p| *p /= tokens);
            }
            normalize(&mut pooled);
            pooled
        })
        .collect()
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the embedding dim.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine_sim;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("all-MiniLM-L6-v2")
    }

    fn require_model() -> PathBuf {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            panic!(
                "Model not found. Download from HuggingFace:\n  \
                 curl -L -o models/all-MiniLM-L6-v2/model.onnx \
                 https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx"
            );
        }
        dir
    }

    #[test]
    fn mean_pool_skips_padding() {
        // Two rows, two tokens, dim 2. Row 1's second token is padding.
        let hidden = [1.0, 0.0, 0.0, 1.0, 3.0, 4.0, 100.0, 100.0];
        let mask = [1, 1, 1, 0];
        let pooled = mean_pool(&hidden, &mask, 2, 2, 2, 2);

        let diag = 1.0 / 2.0f32.sqrt();
        assert!((pooled[0][0] - diag).abs() < 1e-6);
        assert!((pooled[0][1] - diag).abs() < 1e-6);
        assert!((pooled[1][0] - 0.6).abs() < 1e-6);
        assert!((pooled[1][1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn missing_model_dir_is_an_error() {
        let err = Embedder::load(Path::new("/nonexistent/model")).err().unwrap();
        assert!(err.to_string().contains("model.onnx not found"));
    }

    #[test]
    #[ignore = "requires models/all-MiniLM-L6-v2"]
    fn load_model() {
        let dir = require_model();
        let embedder = Embedder::load(&dir).unwrap();
        assert_eq!(embedder.dim(), 384);
    }

    #[test]
    #[ignore = "requires models/all-MiniLM-L6-v2"]
    fn embed_single_text() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        let vec = embedder.embed("A heartfelt family drama").unwrap();
        assert_eq!(vec.len(), 384);

        // Vector should be normalized (L2 norm ≈ 1.0).
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
    }

    #[test]
    #[ignore = "requires models/all-MiniLM-L6-v2"]
    fn embed_batch_of_descriptions() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        let texts = &[
            "Movies with intense, emotional, and realistic storytelling.",
            "Movies filled with humor and light-hearted storytelling.",
            "Movies that aim to scare and thrill the audience.",
        ];
        let vecs = embedder.embed_batch(texts).unwrap();
        assert_eq!(vecs.len(), 3);
        for (i, v) in vecs.iter().enumerate() {
            assert_eq!(v.len(), 384, "text {i} has wrong dimension");
        }
    }

    #[test]
    #[ignore = "requires models/all-MiniLM-L6-v2"]
    fn similar_texts_closer() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();

        let v_horror = embedder.embed("a terrifying haunted house film").unwrap();
        let v_scary = embedder
            .embed("movies that aim to scare the audience")
            .unwrap();
        let v_comedy = embedder.embed("a light-hearted romantic comedy").unwrap();

        let sim_horror_scary = cosine_sim(&v_horror, &v_scary);
        let sim_horror_comedy = cosine_sim(&v_horror, &v_comedy);

        assert!(
            sim_horror_scary > sim_horror_comedy,
            "horror↔scary ({sim_horror_scary:.4}) should be more similar than horror↔comedy ({sim_horror_comedy:.4})"
        );
    }

    #[test]
    #[ignore = "requires models/all-MiniLM-L6-v2"]
    fn embed_empty_batch() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        let vecs = embedder.embed_batch(&[]).unwrap();
        assert!(vecs.is_empty());
    }
}
