//! Per-record feature tuples derived from an annotated review.

use serde::{Deserialize, Serialize};

use super::annotate::{Doc, EntityLabel, Pos};

/// Names of the numeric columns, in vector order.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "days_since_release",
    "noun_count",
    "verb_count",
    "adj_count",
    "person_count",
    "org_count",
    "gpe_count",
    "date_count",
];

/// Text-derived part of a feature tuple, produced inside an extraction worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub noun_count: u32,
    pub verb_count: u32,
    pub adj_count: u32,
    pub person_count: u32,
    pub org_count: u32,
    pub gpe_count: u32,
    pub date_count: u32,
    /// Lemmas of non-stop, non-punctuation tokens joined by single spaces.
    pub token_string: String,
}

impl TextFeatures {
    /// Counts come from the full token stream; the token string from the filtered one.
    pub fn from_doc(doc: &Doc) -> Self {
        let count_pos = |pos| doc.count_pos(pos) as u32;
        let count_ents = |label| doc.count_entities(label) as u32;
        Self {
            noun_count: count_pos(Pos::Noun),
            verb_count: count_pos(Pos::Verb),
            adj_count: count_pos(Pos::Adj),
            person_count: count_ents(EntityLabel::Person),
            org_count: count_ents(EntityLabel::Org),
            gpe_count: count_ents(EntityLabel::Gpe),
            date_count: count_ents(EntityLabel::Date),
            token_string: cleaned_tokens(doc),
        }
    }

    pub fn with_days(self, days_since_release: i64) -> FeatureTuple {
        FeatureTuple {
            days_since_release,
            noun_count: self.noun_count,
            verb_count: self.verb_count,
            adj_count: self.adj_count,
            person_count: self.person_count,
            org_count: self.org_count,
            gpe_count: self.gpe_count,
            date_count: self.date_count,
            token_string: self.token_string,
        }
    }
}

/// Eight numeric signals plus the cleaned token string for one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTuple {
    pub days_since_release: i64,
    pub noun_count: u32,
    pub verb_count: u32,
    pub adj_count: u32,
    pub person_count: u32,
    pub org_count: u32,
    pub gpe_count: u32,
    pub date_count: u32,
    pub token_string: String,
}

impl FeatureTuple {
    /// Numeric columns in [`NUMERIC_COLUMNS`] order.
    pub fn numeric(&self) -> [f64; 8] {
        [
            self.days_since_release as f64,
            f64::from(self.noun_count),
            f64::from(self.verb_count),
            f64::from(self.adj_count),
            f64::from(self.person_count),
            f64::from(self.org_count),
            f64::from(self.gpe_count),
            f64::from(self.date_count),
        ]
    }
}

pub fn cleaned_tokens(doc: &Doc) -> String {
    doc.tokens
        .iter()
        .filter(|token| !token.is_stop && !token.is_punct)
        .map(|token| token.lemma.as_str())
        .filter(|lemma| !lemma.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
