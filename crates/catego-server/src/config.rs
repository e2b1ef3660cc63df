//! Command-line and environment configuration for the server.

use std::path::PathBuf;

use anyhow::Context;
use catego_ai::{
    Categorizer, DEFAULT_CHUNK_SIZE, Embedder, ExtractiveSummarizer, RemoteSummarizer, Summarizer,
};
use catego_core::CategoryIndex;
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "catego-server", version, about = "Categorize text against a fixed label index")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "CATEGO_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Directory holding `model.onnx` and `tokenizer.json`.
    #[arg(long, env = "CATEGO_MODEL_DIR", default_value = "models/all-MiniLM-L6-v2")]
    pub model_dir: PathBuf,

    /// JSON object of category → description. Defaults to the built-in cinema index.
    #[arg(long, env = "CATEGO_INDEX")]
    pub index: Option<PathBuf>,

    /// Backend for the `summary` method.
    #[arg(long, env = "CATEGO_SUMMARIZER", value_enum, default_value_t = SummarizerKind::Extractive)]
    pub summarizer: SummarizerKind,

    /// Summarization endpoint, required with `--summarizer remote`.
    #[arg(long, env = "CATEGO_SUMMARIZER_URL", required_if_eq("summarizer", "remote"))]
    pub summarizer_url: Option<String>,

    /// Bearer token for the summarization endpoint.
    #[arg(long, env = "CATEGO_SUMMARIZER_TOKEN", hide_env_values = true)]
    pub summarizer_token: Option<String>,

    /// Sentences per chunk for the `chunk` method.
    #[arg(long, env = "CATEGO_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummarizerKind {
    /// `summary` requests are rejected.
    None,
    /// Local extractive summaries from the embedding model.
    Extractive,
    /// Hosted summarization model over HTTP.
    Remote,
}

/// Load the index and models, and precompute category vectors.
///
/// Any failure here is fatal to startup.
pub fn build_categorizer(args: &Args) -> anyhow::Result<Categorizer> {
    let index = load_index(args)?;
    let embedder = Embedder::load(&args.model_dir)
        .with_context(|| format!("loading embedding model from {}", args.model_dir.display()))?;

    let mut categorizer =
        Categorizer::new(Box::new(embedder), &index)?.with_chunk_size(args.chunk_size);
    if let Some(summarizer) = summarizer(args)? {
        categorizer = categorizer.with_summarizer(summarizer);
    }
    Ok(categorizer)
}

pub fn load_index(args: &Args) -> anyhow::Result<CategoryIndex> {
    match &args.index {
        Some(path) => CategoryIndex::from_json_file(path)
            .with_context(|| format!("loading category index {}", path.display())),
        None => {
            info!("using built-in cinema index");
            Ok(CategoryIndex::cinema())
        }
    }
}

pub fn summarizer(args: &Args) -> anyhow::Result<Option<Box<dyn Summarizer + Send>>> {
    let summarizer: Option<Box<dyn Summarizer + Send>> = match args.summarizer {
        SummarizerKind::None => None,
        SummarizerKind::Extractive => Some(Box::new(ExtractiveSummarizer::new())),
        SummarizerKind::Remote => {
            let url = args
                .summarizer_url
                .clone()
                .context("--summarizer-url is required for the remote summarizer")?;
            let remote = RemoteSummarizer::new(url, args.summarizer_token.clone())?;
            info!(url = remote.url(), "using remote summarizer");
            Some(Box::new(remote))
        }
    };
    info!(summarizer = ?args.summarizer, "configured summarizer");
    Ok(summarizer)
}
