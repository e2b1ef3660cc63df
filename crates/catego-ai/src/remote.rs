//! HTTP summarizer for hosted sequence-to-sequence models.
//!
//! Speaks the Hugging Face inference summarization format:
//! `POST {url}` with `{"inputs": ..., "parameters": {...}}`, answered by
//! `[{"summary_text": ...}]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::embed::Embed;
use crate::summarizer::{Summarizer, SummaryBounds};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no summary")]
    NoSummary,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Parameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Blocking client for a remote summarization endpoint.
///
/// Must be constructed and dropped outside an async runtime; it is meant to
/// be called from blocking worker threads.
pub struct RemoteSummarizer {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl RemoteSummarizer {
    /// Create a summarizer for the full endpoint `url`, with an optional bearer token.
    pub fn new(url: String, token: Option<String>) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, text: &str, bounds: SummaryBounds) -> Result<String, RemoteError> {
        let body = request_body(text, bounds);

        info!(url = %self.url, chars = text.len(), "requesting remote summary");
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                body,
            });
        }

        parse_summary(&resp.text()?)
    }
}

impl Summarizer for RemoteSummarizer {
    fn summarize(
        &mut self,
        text: &str,
        bounds: SummaryBounds,
        _embedder: &mut dyn Embed,
    ) -> anyhow::Result<String> {
        Ok(self.request(text, bounds)?)
    }
}

fn request_body(text: &str, bounds: SummaryBounds) -> SummarizeRequest<'_> {
    SummarizeRequest {
        inputs: text,
        parameters: Parameters {
            min_length: bounds.min_length,
            max_length: bounds.max_length,
            do_sample: false,
        },
    }
}

fn parse_summary(body: &str) -> Result<String, RemoteError> {
    let outputs: Vec<SummaryOutput> = serde_json::from_str(body)?;
    outputs
        .into_iter()
        .next()
        .map(|o| o.summary_text)
        .ok_or(RemoteError::NoSummary)
}
