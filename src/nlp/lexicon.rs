//! Rule and dictionary based English annotator.
//!
//! Tokenises with a regex, splits clitics (`don't` -> `do` + `n't`), tags coarse parts of speech
//! from closed-class word lists plus suffix heuristics, and lemmatises with an exception table
//! followed by suffix rules.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    annotate::{AnnotateError, Annotator, Doc, EntityLabel, Pos, Token, MAX_TEXT_CHARS},
    ner::{self, RawToken},
};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{L}+(?:['’]\p{L}+)*|\p{N}+(?:[.,:/-]\p{N}+)*(?:\p{L}+)?|[^\p{L}\p{N}\s]")
        .expect("valid token regex")
});

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
        "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
        "anyone", "anything", "anyway", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "been", "before", "being", "below", "between", "both", "but", "by",
        "ca", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "due",
        "during", "each", "either", "else", "enough", "even", "ever", "every", "everyone",
        "everything", "few", "first", "for", "from", "further", "get", "give", "go", "had", "has",
        "have", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
        "i", "if", "in", "into", "is", "it", "its", "itself", "just", "last", "least", "less",
        "made", "make", "many", "may", "me", "might", "mine", "more", "most", "mostly", "much",
        "must", "my", "myself", "neither", "never", "next", "no", "nobody", "none", "nor", "not",
        "nothing", "now", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
        "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
        "per", "perhaps", "please", "put", "quite", "rather", "really", "regarding", "same", "say",
        "see", "seem", "seemed", "seeming", "seems", "several", "she", "should", "show", "since",
        "so", "some", "someone", "something", "sometimes", "somewhere", "still", "such", "take",
        "than", "that", "the", "their", "them", "themselves", "then", "there", "these", "they",
        "this", "those", "though", "three", "through", "thus", "to", "together", "too", "top",
        "toward", "two", "under", "until", "up", "upon", "us", "used", "using", "various", "very",
        "via", "was", "we", "well", "were", "what", "whatever", "when", "where", "whether",
        "which", "while", "who", "whole", "whom", "whose", "why", "will", "with", "within",
        "without", "wo", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
        "n't", "n’t", "'s", "’s", "'re", "’re", "'m", "’m", "'ve", "’ve", "'ll", "’ll", "'d", "’d",
    ]
    .into_iter()
    .collect()
});

static DETERMINERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "this", "that", "these", "those", "every", "each", "some", "any", "no",
        "all", "both", "another", "either", "neither", "whatever",
    ]
    .into_iter()
    .collect()
});

static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "you", "he", "him", "she", "her", "it", "we", "us", "they", "them", "my",
        "your", "his", "its", "our", "their", "mine", "yours", "hers", "ours", "theirs", "myself",
        "yourself", "himself", "herself", "itself", "ourselves", "themselves", "who", "whom",
        "whose", "what", "which", "someone", "something", "anyone", "anything", "everyone",
        "everything", "nobody", "nothing", "one",
    ]
    .into_iter()
    .collect()
});

static SUBJECT_PRONOUNS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["i", "you", "he", "she", "it", "we", "they"].into_iter().collect());

static ADPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
        "during", "before", "after", "above", "below", "from", "up", "down", "of", "off", "over",
        "under", "around", "without", "within", "like", "than", "as", "upon", "toward", "towards",
        "across", "behind", "beyond", "near", "despite", "until", "via", "among",
    ]
    .into_iter()
    .collect()
});

static CONJUNCTIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["and", "or", "but", "nor", "yet", "&"].into_iter().collect());

static SUBORDINATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "because", "while", "although", "though", "since", "unless", "whether", "whereas",
        "once",
    ]
    .into_iter()
    .collect()
});

static AUXILIARIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "is", "are", "was", "were", "be", "been", "being", "will", "would", "shall",
        "should", "can", "could", "may", "might", "must", "ca", "wo", "'re", "’re", "'m", "’m",
        "'ll", "’ll", "'d", "’d",
    ]
    .into_iter()
    .collect()
});

static MODALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "will", "would", "shall", "should", "can", "could", "may", "might", "must", "ca", "wo",
        "'ll", "’ll", "'d", "’d",
    ]
    .into_iter()
    .collect()
});

static INTERJECTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "oh", "wow", "hey", "yeah", "yes", "ok", "okay", "ugh", "lol", "omg", "hmm", "alas",
        "please", "wow", "meh",
    ]
    .into_iter()
    .collect()
});

static ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "very", "really", "too", "also", "just", "so", "never", "always", "often", "ever",
        "still", "even", "then", "there", "here", "now", "again", "already", "soon", "quite",
        "rather", "almost", "perhaps", "maybe", "how", "when", "where", "why", "well", "later",
        "together", "away", "instead", "else", "however", "anyway", "sometimes", "once",
        "twice", "far", "enough", "yet", "back", "ago", "out",
    ]
    .into_iter()
    .collect()
});

static ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "bad", "great", "best", "better", "worse", "worst", "new", "old", "big", "small",
        "little", "long", "short", "high", "low", "young", "few", "many", "much", "more", "most",
        "other", "same", "different", "first", "last", "next", "own", "whole", "real", "true",
        "false", "full", "sure", "able", "fine", "nice", "poor", "dark", "dead", "alive", "evil",
        "funny", "happy", "sad", "final", "main", "huge", "strong", "weak", "clear", "late",
        "early", "only", "likely", "lovely", "ugly", "friendly", "silly", "original", "entire",
        "amazing", "boring", "interesting", "stunning", "disappointing", "exciting",
        "surprising", "shocking", "entertaining", "annoying", "compelling", "gripping",
        "confusing", "satisfying", "touching", "predictable", "obvious", "cheap", "awful",
        "brilliant", "perfect", "terrible", "horrible", "epic", "beautiful", "wonderful", "cool",
        "hard", "easy", "slow", "fast", "worth", "whole", "overall", "certain", "clever",
    ]
    .into_iter()
    .collect()
});

static VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "see", "watch", "kill", "die", "reveal", "know", "think", "make", "take", "get", "go",
        "come", "find", "give", "tell", "say", "love", "hate", "want", "turn", "end", "start",
        "begin", "show", "play", "leave", "feel", "try", "become", "seem", "look", "happen",
        "save", "win", "lose", "marry", "discover", "realize", "realise", "learn", "survive",
        "escape", "betray", "murder", "explain", "expect", "enjoy", "recommend", "spoil", "ruin",
        "need", "let", "keep", "put", "mean", "believe", "bring", "hold", "stand", "hear", "run",
        "move", "live", "help", "understand", "fall", "meet", "write", "read", "sit", "stop",
        "kidnap", "rescue", "fight", "shoot", "destroy", "return", "appear", "remain", "follow",
        "guess", "figure", "wait", "wish", "care", "forget", "remember", "suppose", "manage",
        "fail", "decide", "agree", "pretend", "hope", "twist",
    ]
    .into_iter()
    .collect()
});

/// Irregular forms and clitics mapped to their lemma.
static LEMMA_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("am", "be"), ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"), ("been", "be"),
        ("being", "be"), ("'re", "be"), ("’re", "be"), ("'m", "be"), ("’m", "be"),
        ("has", "have"), ("had", "have"), ("having", "have"), ("'ve", "have"), ("’ve", "have"),
        ("does", "do"), ("did", "do"), ("done", "do"), ("doing", "do"),
        ("n't", "not"), ("n’t", "not"), ("ca", "can"), ("wo", "will"), ("'ll", "will"),
        ("’ll", "will"), ("'d", "would"), ("’d", "would"),
        ("saw", "see"), ("seen", "see"), ("went", "go"), ("gone", "go"), ("goes", "go"),
        ("took", "take"), ("taken", "take"), ("made", "make"), ("got", "get"), ("gotten", "get"),
        ("came", "come"), ("found", "find"), ("gave", "give"), ("given", "give"), ("told", "tell"),
        ("said", "say"), ("knew", "know"), ("known", "know"), ("thought", "think"),
        ("became", "become"), ("began", "begin"), ("begun", "begin"), ("left", "leave"),
        ("felt", "feel"), ("won", "win"), ("lost", "lose"), ("died", "die"), ("dies", "die"),
        ("dying", "die"), ("lies", "lie"), ("lying", "lie"), ("ties", "tie"), ("kept", "keep"),
        ("meant", "mean"), ("brought", "bring"), ("held", "hold"), ("stood", "stand"),
        ("heard", "hear"), ("ran", "run"), ("met", "meet"), ("wrote", "write"),
        ("written", "write"), ("fell", "fall"), ("fallen", "fall"), ("fought", "fight"),
        ("shot", "shoot"), ("sat", "sit"), ("forgot", "forget"), ("forgotten", "forget"),
        ("men", "man"), ("women", "woman"), ("children", "child"), ("feet", "foot"),
        ("teeth", "tooth"), ("mice", "mouse"), ("lives", "life"), ("wives", "wife"),
        ("knives", "knife"), ("movies", "movie"),
        ("better", "good"), ("best", "good"), ("worse", "bad"), ("worst", "bad"),
    ]
    .into_iter()
    .collect()
});

const SYMBOLS: &[&str] = &["$", "%", "+", "=", "<", ">", "^", "`", "|", "~", "#", "@", "*", "€", "£"];
const NUMBER_WORDS: &[&str] = &[
    "zero", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "twenty", "thirty", "hundred", "thousand", "million", "billion",
];
const ADJ_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "ical", "less", "ish"];

/// Whether the lowercase form is on the English stop list.
pub fn is_stop_word(lower: &str) -> bool {
    STOP_WORDS.contains(lower)
}

/// Split `text` into raw tokens, separating trailing clitics.
pub fn tokenize(text: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut sentence_start = true;
    for found in TOKEN_PATTERN.find_iter(text) {
        let word = found.as_str();
        let (base, clitic) = split_clitic(word);
        for piece in std::iter::once(base).chain(clitic) {
            if piece.is_empty() {
                continue;
            }
            tokens.push(RawToken {
                text: piece.to_string(),
                sentence_start,
            });
            sentence_start = false;
        }
        if matches!(word, "." | "!" | "?") {
            sentence_start = true;
        }
    }
    tokens
}

fn split_clitic(word: &str) -> (&str, Option<&str>) {
    let Some(apos) = word.rfind(['\'', '’']) else {
        return (word, None);
    };
    let head = &word[..apos];
    let tail = word[apos..].trim_start_matches(['\'', '’']).to_ascii_lowercase();
    if tail == "t" && head.len() > 1 && head.to_ascii_lowercase().ends_with('n') {
        let split = apos - 1;
        return (&word[..split], Some(&word[split..]));
    }
    if !head.is_empty() && matches!(tail.as_str(), "s" | "re" | "ve" | "ll" | "d" | "m") {
        return (head, Some(&word[apos..]));
    }
    (word, None)
}

fn is_punct(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric) && !SYMBOLS.contains(&text)
}

fn is_capitalised(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

fn looks_like_verb_form(lower: &str) -> bool {
    let inflected = (lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")))
        || LEMMA_EXCEPTIONS
            .get(lower)
            .is_some_and(|lemma| VERBS.contains(lemma));
    VERBS.contains(lower) || (inflected && !ADJECTIVES.contains(lower))
}

/// Tag one token given its neighbours and whether it sits inside a name-like entity.
fn tag(tokens: &[RawToken], idx: usize, in_name: bool) -> Pos {
    let text = tokens[idx].text.as_str();
    let lower = text.to_lowercase();
    let prev = idx
        .checked_sub(1)
        .map(|i| tokens[i].text.to_lowercase())
        .unwrap_or_default();
    let next = tokens
        .get(idx + 1)
        .map(|t| t.text.to_lowercase())
        .unwrap_or_default();

    if SYMBOLS.contains(&text) {
        return Pos::Sym;
    }
    if is_punct(text) {
        return Pos::Punct;
    }
    if text.chars().next().is_some_and(|c| c.is_numeric()) || NUMBER_WORDS.contains(&lower.as_str()) {
        return Pos::Num;
    }
    if in_name {
        return Pos::Propn;
    }
    match lower.as_str() {
        "not" | "n't" | "n’t" => return Pos::Part,
        "'s" | "’s" => {
            return if SUBJECT_PRONOUNS.contains(prev.as_str()) || prev == "that" || prev == "there" {
                Pos::Aux
            } else {
                Pos::Part
            }
        }
        "to" => {
            return if VERBS.contains(next.as_str()) {
                Pos::Part
            } else {
                Pos::Adp
            }
        }
        "have" | "has" | "had" | "'ve" | "’ve" => {
            return if looks_like_verb_form(&next) || next == "been" || next == "n't" {
                Pos::Aux
            } else {
                Pos::Verb
            }
        }
        "do" | "does" | "did" => {
            return if matches!(next.as_str(), "n't" | "n’t" | "not")
                || SUBJECT_PRONOUNS.contains(next.as_str())
            {
                Pos::Aux
            } else {
                Pos::Verb
            }
        }
        _ => {}
    }
    if AUXILIARIES.contains(lower.as_str()) {
        return Pos::Aux;
    }
    if DETERMINERS.contains(lower.as_str()) {
        return Pos::Det;
    }
    if PRONOUNS.contains(lower.as_str()) {
        return Pos::Pron;
    }
    if CONJUNCTIONS.contains(lower.as_str()) {
        return Pos::Cconj;
    }
    if SUBORDINATORS.contains(lower.as_str()) {
        return Pos::Sconj;
    }
    if ADPOSITIONS.contains(lower.as_str()) {
        return Pos::Adp;
    }
    if INTERJECTIONS.contains(lower.as_str()) {
        return Pos::Intj;
    }
    if ADJECTIVES.contains(lower.as_str()) {
        return Pos::Adj;
    }
    if ADVERBS.contains(lower.as_str()) || (lower.len() > 4 && lower.ends_with("ly")) {
        return Pos::Adv;
    }
    if is_capitalised(text) && !tokens[idx].sentence_start {
        return Pos::Propn;
    }
    let after_verb_trigger = MODALS.contains(prev.as_str())
        || SUBJECT_PRONOUNS.contains(prev.as_str())
        || matches!(prev.as_str(), "n't" | "n’t" | "not");
    if after_verb_trigger || looks_like_verb_form(&lower) {
        return Pos::Verb;
    }
    if lower.len() > 4 && ADJ_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return Pos::Adj;
    }
    Pos::Noun
}

/// Base form of a lowercase word for the given part of speech.
pub fn lemmatize(lower: &str, pos: Pos) -> String {
    if let Some(lemma) = LEMMA_EXCEPTIONS.get(lower) {
        return (*lemma).to_string();
    }
    match pos {
        Pos::Noun => noun_lemma(lower),
        Pos::Verb | Pos::Aux => verb_lemma(lower),
        _ => lower.to_string(),
    }
}

fn noun_lemma(word: &str) -> String {
    let n = word.len();
    if n > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..n - 3]);
    }
    if word.ends_with("sses") || ["ches", "shes", "xes", "zes"].iter().any(|s| word.ends_with(s)) {
        return word[..n - 2].to_string();
    }
    if n > 3 && word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word[..n - 1].to_string();
    }
    word.to_string()
}

fn verb_lemma(word: &str) -> String {
    let n = word.len();
    if n > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..n - 3]);
    }
    if n > 5 && word.ends_with("ing") {
        return restore_stem(&word[..n - 3]);
    }
    if n > 4 && word.ends_with("ied") {
        return format!("{}y", &word[..n - 3]);
    }
    if n > 4 && word.ends_with("ed") {
        return restore_stem(&word[..n - 2]);
    }
    if ["ches", "shes", "sses", "xes", "zes"].iter().any(|s| word.ends_with(s)) {
        return word[..n - 2].to_string();
    }
    if n > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..n - 1].to_string();
    }
    word.to_string()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Undo spelling changes made when a suffix was attached (`runn` -> `run`, `mak` -> `make`).
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 {
        let (a, b) = (chars[n - 2], chars[n - 1]);
        if a == b && !is_vowel(b) && !matches!(b, 'l' | 's' | 'z') {
            return chars[..n - 1].iter().collect();
        }
    }
    if matches!(chars.last(), Some('v' | 'u' | 'c' | 'z')) {
        return format!("{stem}e");
    }
    if n == 3 && !is_vowel(chars[0]) && is_vowel(chars[1]) && !is_vowel(chars[2]) && !matches!(chars[2], 'w' | 'x' | 'y') {
        return format!("{stem}e");
    }
    stem.to_string()
}

/// Dictionary-backed annotator with no external model files.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconAnnotator;

impl Annotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Result<Doc, AnnotateError> {
        let len = text.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(AnnotateError::TooLong {
                len,
                max: MAX_TEXT_CHARS,
            });
        }

        let raw = tokenize(text);
        let entities = ner::recognize(&raw);
        let mut in_name = vec![false; raw.len()];
        for entity in entities.iter().filter(|e| e.label != EntityLabel::Date) {
            for flag in &mut in_name[entity.start..entity.end] {
                *flag = true;
            }
        }

        let tokens = raw
            .iter()
            .enumerate()
            .map(|(idx, token)| {
                let lower = token.text.to_lowercase();
                let pos = tag(&raw, idx, in_name[idx]);
                Token {
                    lemma: lemmatize(&lower, pos),
                    is_stop: is_stop_word(&lower),
                    is_punct: pos == Pos::Punct,
                    pos,
                    text: token.text.clone(),
                }
            })
            .collect();
        Ok(Doc { tokens, entities })
    }
}
