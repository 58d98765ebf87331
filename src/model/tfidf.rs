//! Frequency-weighted n-gram vectorizer fit on training documents only.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::matrix::SparseMatrix;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid word regex"));

/// Vectorizer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    pub ngram_range: (usize, usize),
    /// Drop n-grams in more than this fraction of training documents.
    pub max_df: f64,
    pub max_features: usize,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: crate::config::NGRAM_RANGE,
            max_df: crate::config::MAX_DF,
            max_features: crate::config::MAX_FEATURES,
        }
    }
}

/// Fitted vocabulary and inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub config: TfidfConfig,
    /// N-gram to column, in lexicographic order.
    pub vocabulary: IndexMap<String, usize>,
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S], config: TfidfConfig) -> Result<Self> {
        if documents.is_empty() {
            return Err(anyhow!("cannot fit vectorizer on zero documents"));
        }
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(anyhow!("invalid n-gram range ({min_n}, {max_n})"));
        }

        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<String> = ngrams(doc.as_ref(), config.ngram_range)
                .into_iter()
                .collect();
            for gram in unique {
                *doc_freq.entry(gram).or_insert(0) += 1;
            }
        }
        let seen = doc_freq.len();

        let max_doc_count = config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| (*df as f64) <= max_doc_count)
            .collect();
        if kept.len() > config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(config.max_features);
        }
        let sorted: BTreeMap<String, usize> = kept.into_iter().collect();

        let mut vocabulary = IndexMap::with_capacity(sorted.len());
        let mut idf = Vec::with_capacity(sorted.len());
        for (column, (gram, df)) in sorted.into_iter().enumerate() {
            idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(gram, column);
        }
        if vocabulary.is_empty() {
            warn!(documents = n_docs, "no n-grams survived pruning; n-gram block is empty");
        }
        info!(
            documents = n_docs,
            seen,
            kept = vocabulary.len(),
            "fitted n-gram vocabulary"
        );
        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Weight documents against the fitted vocabulary. Unknown n-grams are ignored.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<SparseMatrix> {
        let rows = documents
            .iter()
            .map(|doc| self.weigh(doc.as_ref()))
            .collect();
        SparseMatrix::from_rows(self.n_features(), rows)
    }

    /// Column names, in column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary.keys().cloned().collect()
    }

    fn weigh(&self, doc: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in ngrams(doc, self.config.ngram_range) {
            if let Some(&col) = self.vocabulary.get(&gram) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut row {
                *value /= norm;
            }
        }
        row.sort_by_key(|(col, _)| *col);
        row
    }
}

/// Lowercased word n-grams of `doc` for every n in `range`.
pub fn ngrams(doc: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let lower = doc.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > words.len() {
            continue;
        }
        grams.extend(words.windows(n).map(|window| window.join(" ")));
    }
    grams
}
