//! Wire types shared by the categorization server and its CLI client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the input text is turned into a single vector before matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Split on sentence boundaries, embed each chunk, average the vectors.
    #[default]
    Chunk,
    /// Summarize first, then embed the summary.
    Summary,
    /// Embed the whole text in one pass.
    Full,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Chunk, Method::Summary, Method::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chunk => "chunk",
            Self::Summary => "summary",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown method '{0}' (expected chunk, summary, or full)")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Body of `POST /categorize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeRequest {
    pub text: String,
    #[serde(default)]
    pub method: Method,
}

/// Successful answer to `POST /categorize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizeResponse {
    pub category: String,
}

/// Error answer from the server, for any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// One entry of a `--from-list` batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct TextEntry {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_defaults_to_chunk() {
        let req: CategorizeRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.method, Method::Chunk);
    }

    #[test]
    fn method_parses_lowercase_names() {
        let req: CategorizeRequest =
            serde_json::from_str(r#"{"text": "hello", "method": "summary"}"#).unwrap();
        assert_eq!(req.method, Method::Summary);
        assert_eq!(serde_json::to_string(&Method::Full).unwrap(), "\"full\"");
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = serde_json::from_str::<CategorizeRequest>(r#"{"text": "x", "method": "fuzzy"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("fuzzy"), "got: {err}");

        let err = "fuzzy".parse::<Method>().unwrap_err();
        assert_eq!(err, UnknownMethod("fuzzy".into()));
    }

    #[test]
    fn method_from_str_trims_input() {
        assert_eq!(" full\n".parse::<Method>().unwrap(), Method::Full);
        assert_eq!("chunk".parse::<Method>().unwrap(), Method::Chunk);
    }

    #[test]
    fn text_entries_ignore_extra_fields() {
        let json = r#"[{"text": "first", "id": 1}, {"text": "second"}]"#;
        let entries: Vec<TextEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "second");
    }
}
