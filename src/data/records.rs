//! Raw review and movie-metadata records read from JSON-lines files.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

/// One user review as it appears in the reviews file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReviewRecord {
    pub movie_id: String,
    /// Either `10 February 2006` or `2006-02-10`.
    pub review_date: String,
    #[serde(default)]
    pub review_summary: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    pub is_spoiler: bool,
}

/// Movie metadata; only the key and release date matter here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MovieRecord {
    pub movie_id: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Parse a JSON-lines file, skipping blank lines. Any malformed line aborts with its line number.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed record", path.display(), idx + 1))?;
        rows.push(row);
    }
    info!(path = %path.display(), rows = rows.len(), "loaded json lines");
    Ok(rows)
}

pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>> {
    read_jsonl(path)
}

pub fn load_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    read_jsonl(path)
}
