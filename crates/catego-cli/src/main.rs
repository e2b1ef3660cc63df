mod client;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use catego_core::{Method, TextEntry};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::client::{CategorizeClient, DEFAULT_URL};

/// Categorize general text into categories.
#[derive(Parser, Debug)]
#[command(name = "catego", version)]
struct Cli {
    /// JSON file containing a list of `{"text": ...}` entries.
    #[arg(long)]
    from_list: Option<PathBuf>,

    /// Method for categorization (chunk, summary, or full).
    #[arg(long, default_value_t = Method::Chunk)]
    method: Method,

    /// Categorization endpoint.
    #[arg(long, env = "CATEGO_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let client = CategorizeClient::new(cli.url);
    tracing::debug!(url = client.url(), "catego v{}", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    match cli.from_list {
        Some(path) => {
            let entries = read_entries(&path)?;
            run_batch(&client, &entries, cli.method, &mut stdout.lock()).await
        }
        None => {
            let stdin = std::io::stdin();
            run_interactive(&client, &mut stdin.lock(), &mut stdout.lock()).await
        }
    }
}

fn read_entries(path: &Path) -> anyhow::Result<Vec<TextEntry>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Categorize every entry, printing each text and its result.
async fn run_batch(
    client: &CategorizeClient,
    entries: &[TextEntry],
    method: Method,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for (idx, entry) in entries.iter().enumerate() {
        writeln!(out, "Categorizing text {}: {}", idx + 1, entry.text)?;
        let outcome = client.categorize(&entry.text, method).await?;
        writeln!(out, "Category: {outcome}\n")?;
    }
    Ok(())
}

/// Prompt for one text and a method, then print its category.
async fn run_interactive(
    client: &CategorizeClient,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let text = prompt(input, out, "Enter your text: ")?;
    let answer = prompt(input, out, "Enter method (chunk, summary, or full): ")?;

    let method = if answer.is_empty() {
        Method::Chunk
    } else {
        match answer.parse::<Method>() {
            Ok(m) => m,
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                return Ok(());
            }
        }
    };

    let outcome = client.categorize(&text, method).await?;
    writeln!(out, "Category: {outcome}")?;
    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, message: &str) -> anyhow::Result<String> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
