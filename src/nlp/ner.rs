//! Dictionary and capitalisation based named-entity recognition over tokens.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::annotate::{Entity, EntityLabel};

/// Token as produced by the tokenizer, before tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    /// First token of the text or of a sentence.
    pub sentence_start: bool,
}

static MONTHS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
        "sept", "oct", "nov", "dec",
    ]
    .into_iter()
    .collect()
});

static WEEKDAYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ]
    .into_iter()
    .collect()
});

static RELATIVE_DAYS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["today", "yesterday", "tomorrow"].into_iter().collect());

static PERIODS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "day", "days", "week", "weeks", "weekend", "month", "months", "year", "years", "decade",
        "decades", "century", "summer", "winter", "spring", "autumn",
    ]
    .into_iter()
    .collect()
});

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(1[89]\d\d|20\d\d)s?$").expect("valid year regex"));
static DECADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'?\d0s$").expect("valid decade regex"));
static DAY_OF_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9]|[12]\d|3[01])(st|nd|rd|th)?$").expect("valid day regex"));

static ORG_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "inc", "corp", "corporation", "studios", "studio", "pictures", "films", "entertainment",
        "company", "co", "ltd", "llc", "group", "agency", "network", "records", "university",
        "bank", "association", "institute", "academy", "army", "navy", "police", "department",
        "fbi", "cia", "nasa", "nsa", "kgb", "mi6", "netflix", "hbo", "disney", "marvel", "pixar",
        "warner", "paramount", "universal", "dreamworks", "lucasfilm", "sony", "fox", "bbc",
        "nbc", "cbs", "abc", "mgm", "miramax", "amazon", "google", "apple", "microsoft",
        "hydra", "shield", "umbrella", "congress", "senate", "un",
    ]
    .into_iter()
    .collect()
});

static PLACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "america", "usa", "us", "u.s.", "uk", "england", "britain", "scotland", "ireland",
        "wales", "france", "germany", "italy", "spain", "portugal", "russia", "china", "japan",
        "korea", "india", "canada", "mexico", "brazil", "argentina", "australia", "egypt",
        "israel", "iran", "iraq", "afghanistan", "vietnam", "africa", "europe", "asia",
        "poland", "greece", "sweden", "norway", "denmark", "finland", "switzerland", "austria",
        "netherlands", "belgium", "ukraine", "turkey", "cuba", "texas", "california", "florida",
        "alaska", "nevada", "new york", "new jersey", "new orleans", "los angeles",
        "san francisco", "las vegas", "chicago", "boston", "washington", "seattle", "detroit",
        "miami", "atlanta", "london", "paris", "berlin", "rome", "moscow", "tokyo", "beijing",
        "hong kong", "sydney", "toronto", "dublin", "madrid", "venice", "vienna", "prague",
        "hollywood", "manhattan", "brooklyn", "gotham", "vegas",
    ]
    .into_iter()
    .collect()
});

static TITLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "miss", "dr", "sir", "lady", "lord", "captain", "agent", "detective",
        "professor", "king", "queen", "prince", "princess", "uncle", "aunt", "officer",
        "general", "president", "sheriff", "doctor", "father", "sister", "brother",
    ]
    .into_iter()
    .collect()
});

static FIRST_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "john", "james", "michael", "david", "robert", "william", "richard", "thomas", "tom",
        "mark", "paul", "peter", "george", "jack", "harry", "bruce", "tony", "steve", "chris",
        "brad", "leonardo", "matt", "ryan", "will", "christian", "heath", "keanu", "denzel",
        "morgan", "samuel", "robin", "jim", "bill", "joe", "frank", "luke", "han", "anakin",
        "mary", "jennifer", "anne", "emma", "kate", "natalie", "scarlett", "meryl", "julia",
        "sandra", "angelina", "nicole", "jane", "sarah", "rose", "alice", "elizabeth", "amy",
        "leia", "hermione", "ron", "frodo", "gandalf", "neo", "batman", "joker", "superman",
        "spider", "wolverine", "thor", "loki", "thanos", "voldemort", "dumbledore", "snape",
    ]
    .into_iter()
    .collect()
});

/// Words that may start a sentence capitalised without being part of a name.
static SENTENCE_OPENERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "this", "that", "these", "those", "i", "it", "he", "she", "we", "they",
        "you", "my", "his", "her", "our", "their", "in", "on", "at", "if", "but", "and", "or",
        "so", "when", "while", "after", "before", "then", "there", "here", "what", "why", "how",
        "who", "one", "all", "some", "no", "not", "yes", "overall", "also", "however", "even",
        "just", "as", "for", "of", "to", "with", "by", "from", "spoiler", "spoilers", "warning",
        "great", "good", "bad", "best", "worst", "very", "really", "wow", "well", "do", "don't",
        "is", "was", "are", "were", "its", "it's", "i'm", "i've", "movie", "film", "this",
    ]
    .into_iter()
    .collect()
});

fn is_name_like(token: &RawToken) -> bool {
    let mut chars = token.text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    let lower = token.text.to_lowercase();
    if MONTHS.contains(lower.as_str()) || WEEKDAYS.contains(lower.as_str()) || lower == "i" {
        return false;
    }
    if token.sentence_start && SENTENCE_OPENERS.contains(lower.as_str()) {
        return false;
    }
    chars.all(|c| c.is_alphabetic() || c == '.' || c == '-')
}

/// Length of a date expression starting at `idx`, if any.
fn match_date(tokens: &[RawToken], idx: usize) -> Option<usize> {
    let lower = |i: usize| tokens.get(i).map(|t| t.text.to_lowercase());
    let word = lower(idx)?;

    if MONTHS.contains(word.as_str()) {
        // "May" on its own is usually the verb.
        let capitalised = tokens[idx].text.chars().next().is_some_and(char::is_uppercase);
        if !capitalised {
            return None;
        }
        let mut len = 1;
        if lower(idx + len).is_some_and(|w| DAY_OF_MONTH.is_match(&w)) {
            len += 1;
            if lower(idx + len).as_deref() == Some(",") && lower(idx + len + 1).is_some_and(|w| YEAR.is_match(&w)) {
                len += 2;
            }
        }
        if lower(idx + len).is_some_and(|w| YEAR.is_match(&w)) {
            len += 1;
        }
        if len == 1 && word == "may" {
            return None;
        }
        return Some(len);
    }
    if DAY_OF_MONTH.is_match(&word) && lower(idx + 1).is_some_and(|w| MONTHS.contains(w.as_str())) {
        let mut len = 2;
        if lower(idx + 2).is_some_and(|w| YEAR.is_match(&w)) {
            len += 1;
        }
        return Some(len);
    }
    if YEAR.is_match(&word) || DECADE.is_match(&word) {
        return Some(1);
    }
    if WEEKDAYS.contains(word.as_str()) || RELATIVE_DAYS.contains(word.as_str()) {
        return Some(1);
    }
    if matches!(word.as_str(), "last" | "next" | "this" | "that")
        && lower(idx + 1).is_some_and(|w| PERIODS.contains(w.as_str()))
    {
        return Some(2);
    }
    let is_count = word.chars().all(|c| c.is_ascii_digit())
        || matches!(word.as_str(), "a" | "few" | "two" | "three" | "several" | "many");
    if is_count && lower(idx + 1).is_some_and(|w| PERIODS.contains(w.as_str())) {
        let len = if matches!(lower(idx + 2).as_deref(), Some("ago" | "later" | "earlier")) {
            3
        } else {
            2
        };
        // A bare "a day" is too vague to count as a date expression.
        if word == "a" && len == 2 {
            return None;
        }
        return Some(len);
    }
    None
}

fn label_name_span(tokens: &[RawToken]) -> Option<EntityLabel> {
    let lowers: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
    let phrase = lowers.join(" ");
    if lowers.iter().any(|w| ORG_MARKERS.contains(w.trim_end_matches('.'))) {
        return Some(EntityLabel::Org);
    }
    if PLACES.contains(phrase.as_str()) {
        return Some(EntityLabel::Gpe);
    }
    let first = lowers[0].trim_end_matches('.');
    if TITLES.contains(first) || FIRST_NAMES.contains(first) {
        return Some(EntityLabel::Person);
    }
    let text = &tokens[0].text;
    let acronym = tokens.len() == 1
        && (2..=5).contains(&text.chars().count())
        && text.chars().all(|c| c.is_uppercase());
    if acronym {
        return Some(EntityLabel::Org);
    }
    if tokens.len() >= 2 || !tokens[0].sentence_start {
        return Some(EntityLabel::Person);
    }
    None
}

/// Recognise PERSON, ORG, GPE and DATE spans.
pub fn recognize(tokens: &[RawToken]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        if let Some(len) = match_date(tokens, idx) {
            entities.push(span(tokens, idx, idx + len, EntityLabel::Date));
            idx += len;
            continue;
        }
        if is_name_like(&tokens[idx]) {
            let mut end = idx + 1;
            while end < tokens.len() && is_name_like(&tokens[end]) && !tokens[end].sentence_start {
                end += 1;
            }
            if let Some(label) = label_name_span(&tokens[idx..end]) {
                entities.push(span(tokens, idx, end, label));
            }
            idx = end;
            continue;
        }
        idx += 1;
    }
    entities
}

fn span(tokens: &[RawToken], start: usize, end: usize, label: EntityLabel) -> Entity {
    Entity {
        start,
        end,
        label,
        text: tokens[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    }
}
