//! HTTP client for the categorization endpoint.

use std::fmt;

use catego_core::{CategorizeRequest, CategorizeResponse, ErrorBody, Method};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_URL: &str = "http://localhost:8000/categorize";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the server said about one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Category(String),
    /// Non-2xx answer, with the server's `detail` message.
    Rejected { status: u16, detail: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(name) => f.write_str(name),
            Self::Rejected { status, detail } => write!(f, "Error: {status}, {detail}"),
        }
    }
}

pub struct CategorizeClient {
    client: reqwest::Client,
    url: String,
}

impl CategorizeClient {
    /// `url` is the full endpoint, e.g. `http://localhost:8000/categorize`.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the server to categorize `text`.
    ///
    /// Server-side rejections come back as [`Outcome::Rejected`]; only
    /// transport and decoding failures are errors.
    pub async fn categorize(&self, text: &str, method: Method) -> Result<Outcome, ClientError> {
        let request = CategorizeRequest {
            text: text.to_string(),
            method,
        };

        debug!(url = %self.url, %method, "sending categorize request");
        let resp = self.client.post(&self.url).json(&request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // Non-JSON error pages are shown verbatim.
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Ok(Outcome::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: CategorizeResponse = serde_json::from_str(&body)?;
        Ok(Outcome::Category(parsed.category))
    }
}
