//! Annotation contract between the feature extractor and a natural-language pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest input a single annotation call accepts, in characters.
pub const MAX_TEXT_CHARS: usize = 1_000_000;

/// Coarse universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
}

/// Named-entity categories the extractor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Lowercased base form.
    pub lemma: String,
    pub pos: Pos,
    pub is_stop: bool,
    pub is_punct: bool,
}

/// Entity span over token indices, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
    pub text: String,
}

/// Fully annotated text: the unfiltered token stream plus recognised entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub tokens: Vec<Token>,
    pub entities: Vec<Entity>,
}

impl Doc {
    pub fn count_pos(&self, pos: Pos) -> usize {
        self.tokens.iter().filter(|token| token.pos == pos).count()
    }

    pub fn count_entities(&self, label: EntityLabel) -> usize {
        self.entities.iter().filter(|ent| ent.label == label).count()
    }
}

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("text of {len} characters exceeds the {max} character limit")]
    TooLong { len: usize, max: usize },
}

/// A loaded natural-language pipeline. Implementations are shared read-only across workers.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Doc, AnnotateError>;
}
