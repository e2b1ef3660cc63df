//! Summarization backends for the `summary` categorization method.

use tracing::debug;

use crate::embed::Embed;
use crate::vector::{cosine_sim, mean};

/// Length bounds for a generated summary, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 30,
            max_length: 100,
        }
    }
}

/// Produces a short summary of a text.
///
/// The embedder is the categorizer's own model, lent for the duration of the
/// call so local summarizers can rank sentences without loading a second one.
pub trait Summarizer {
    fn summarize(
        &mut self,
        text: &str,
        bounds: SummaryBounds,
        embedder: &mut dyn Embed,
    ) -> anyhow::Result<String>;
}

/// Extractive summarizer: keeps the sentences closest to the document centroid.
///
/// Sentences are ranked by cosine similarity to the mean of all sentence
/// embeddings, taken best-first until `min_length` words are collected, then
/// emitted in their original order and cut at `max_length` words. Output is
/// deterministic for a deterministic embedder.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(
        &mut self,
        text: &str,
        bounds: SummaryBounds,
        embedder: &mut dyn Embed,
    ) -> anyhow::Result<String> {
        let sentences = split_sentences(text);
        let total_words: usize = sentences.iter().map(|s| word_count(s)).sum();

        if sentences.len() <= 1 || total_words <= bounds.min_length {
            return Ok(truncate_words(text.trim(), bounds.max_length));
        }

        let vectors = embedder.embed_batch(&sentences)?;
        anyhow::ensure!(
            vectors.len() == sentences.len(),
            "embedder returned {} vectors for {} sentences",
            vectors.len(),
            sentences.len()
        );
        let centroid = mean(&vectors).ok_or_else(|| anyhow::anyhow!("no sentence vectors"))?;

        // Stable sort keeps earlier sentences first among equal scores.
        let mut ranked: Vec<(usize, f32)> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_sim(v, &centroid)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut picked = Vec::new();
        let mut words = 0;
        for (i, _) in ranked {
            picked.push(i);
            words += word_count(sentences[i]);
            if words >= bounds.min_length {
                break;
            }
        }
        picked.sort_unstable();

        let summary = picked
            .iter()
            .map(|&i| sentences[i])
            .collect::<Vec<_>>()
            .join(" ");
        let summary = truncate_words(&summary, bounds.max_length);
        debug!(
            sentences = sentences.len(),
            kept = picked.len(),
            words = word_count(&summary),
            "extractive summary"
        );
        Ok(summary)
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// Terminal punctuation stays attached to its sentence; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|&(_, next)| next.is_whitespace())
        {
            let end = i + c.len_utf8();
            push_trimmed(&mut out, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn truncate_words(s: &str, max: usize) -> String {
    s.split_whitespace().take(max).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WordEmbedder;

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = split_sentences("First one. Second one! Third? Trailing");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "Trailing"]);
    }

    #[test]
    fn does_not_split_inside_numbers() {
        let s = split_sentences("Version 2.5 shipped. It works.");
        assert_eq!(s, vec!["Version 2.5 shipped.", "It works."]);
    }

    #[test]
    fn blank_text_has_no_sentences() {
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn short_text_is_returned_whole() {
        let mut embedder = WordEmbedder::new();
        let text = "A short review. Nothing more to say.";
        let summary = ExtractiveSummarizer
            .summarize(text, SummaryBounds::default(), &mut embedder)
            .unwrap();
        assert_eq!(summary, text);
        assert_eq!(embedder.calls, 0);
    }

    #[test]
    fn keeps_central_sentences_in_order() {
        let mut embedder = WordEmbedder::new();
        let text = "The ghost haunted the old house. \
                    Zebras graze quietly. \
                    The ghost in the old house screamed at night. \
                    A haunted house ghost story.";
        let bounds = SummaryBounds {
            min_length: 10,
            max_length: 100,
        };
        let summary = ExtractiveSummarizer
            .summarize(text, bounds, &mut embedder)
            .unwrap();

        assert!(!summary.contains("Zebras"), "off-topic sentence kept: {summary}");
        let first = summary.find("ghost haunted").unwrap();
        let second = summary.find("screamed").unwrap();
        assert!(first < second, "original order not preserved: {summary}");
    }

    #[test]
    fn respects_max_length() {
        let mut embedder = WordEmbedder::new();
        let sentence = "word ".repeat(40);
        let text = format!("{sentence}. {sentence}. {sentence}.");
        let bounds = SummaryBounds {
            min_length: 50,
            max_length: 60,
        };
        let summary = ExtractiveSummarizer
            .summarize(&text, bounds, &mut embedder)
            .unwrap();
        assert!(word_count(&summary) <= 60);
        assert!(word_count(&summary) >= 50);
    }

    #[test]
    fn deterministic() {
        let text = "Explosions rocked the city. The hero jumped from a helicopter. \
                    A car chase followed through the streets. Everyone cheered at the end. \
                    The villain escaped on a speedboat and the hero followed.";
        let bounds = SummaryBounds {
            min_length: 12,
            max_length: 100,
        };
        let a = ExtractiveSummarizer
            .summarize(text, bounds, &mut WordEmbedder::new())
            .unwrap();
        let b = ExtractiveSummarizer
            .summarize(text, bounds, &mut WordEmbedder::new())
            .unwrap();
        assert_eq!(a, b);
    }
}
