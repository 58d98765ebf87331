//! Stage 1: drop movies with malformed release dates, inner-join reviews onto them and derive
//! the elapsed-days side feature.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::records::{MovieRecord, ReviewRecord};

/// Release dates are only trusted when the raw string is exactly this many characters.
pub const RELEASE_DATE_LEN: usize = 10;
/// Stand-in for an absent summary or body, matching how the source data renders nulls.
pub const MISSING_TEXT: &str = "None";

const REVIEW_DATE_FORMATS: &[&str] = &["%d %B %Y", "%Y-%m-%d"];

/// A review joined with its movie's release date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Stable identifier carried through every later stage.
    pub record_id: u64,
    pub movie_id: String,
    pub review_date: NaiveDate,
    pub release_date: NaiveDate,
    /// Review date minus release date; negative for reviews written before release.
    pub days_since_release: i64,
    pub review_combined: String,
    pub is_spoiler: bool,
}

/// Row accounting for one join run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub reviews: usize,
    pub movies: usize,
    pub valid_movies: usize,
    pub merged: usize,
    /// Reviews whose movie is absent from the filtered movie set.
    pub unmatched: usize,
    /// Matched reviews dropped because a date failed to parse.
    pub unparseable: usize,
}

/// Syntactic release-date check: exactly ten characters, content not inspected.
pub fn has_valid_release_date(movie: &MovieRecord) -> bool {
    movie
        .release_date
        .as_deref()
        .is_some_and(|date| date.chars().count() == RELEASE_DATE_LEN)
}

/// Keep only movies whose release date passes [`has_valid_release_date`].
pub fn filter_movies(movies: &[MovieRecord]) -> Vec<MovieRecord> {
    movies
        .iter()
        .filter(|movie| has_valid_release_date(movie))
        .cloned()
        .collect()
}

/// `summary + " " + body`, with missing parts rendered as [`MISSING_TEXT`].
pub fn combine_text(summary: Option<&str>, body: Option<&str>) -> String {
    format!(
        "{} {}",
        summary.unwrap_or(MISSING_TEXT),
        body.unwrap_or(MISSING_TEXT)
    )
}

pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    REVIEW_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Filter movies, then inner-join reviews onto them by movie identifier.
///
/// Output preserves review order; `record_id` is the position among surviving rows.
pub fn join_reviews(
    reviews: &[ReviewRecord],
    movies: &[MovieRecord],
) -> (Vec<MergedRecord>, JoinSummary) {
    let valid = filter_movies(movies);
    let mut release_by_movie: HashMap<&str, &str> = HashMap::with_capacity(valid.len());
    for movie in &valid {
        if let Some(date) = movie.release_date.as_deref() {
            release_by_movie.entry(movie.movie_id.as_str()).or_insert(date);
        }
    }

    let mut summary = JoinSummary {
        reviews: reviews.len(),
        movies: movies.len(),
        valid_movies: valid.len(),
        ..JoinSummary::default()
    };
    let mut merged = Vec::new();
    for review in reviews {
        let Some(raw_release) = release_by_movie.get(review.movie_id.as_str()) else {
            summary.unmatched += 1;
            continue;
        };
        let (Some(release_date), Some(review_date)) = (
            parse_release_date(raw_release),
            parse_review_date(&review.review_date),
        ) else {
            debug!(movie_id = %review.movie_id, release = %raw_release, review = %review.review_date, "unparseable date");
            summary.unparseable += 1;
            continue;
        };
        merged.push(MergedRecord {
            record_id: merged.len() as u64,
            movie_id: review.movie_id.clone(),
            review_date,
            release_date,
            days_since_release: (review_date - release_date).num_days(),
            review_combined: combine_text(
                review.review_summary.as_deref(),
                review.review_text.as_deref(),
            ),
            is_spoiler: review.is_spoiler,
        });
    }
    summary.merged = merged.len();
    info!(
        reviews = summary.reviews,
        movies = summary.movies,
        valid_movies = summary.valid_movies,
        merged = summary.merged,
        unmatched = summary.unmatched,
        unparseable = summary.unparseable,
        "joined reviews onto movies"
    );
    (merged, summary)
}
