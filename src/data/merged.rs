//! Flat parquet persistence for the merged, filtered review table.

use std::{fs::File, path::Path};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, ParquetReader, ParquetWriter, SerReader, Series};
use tracing::info;

use super::join::MergedRecord;
use crate::pipeline::stage::{PipelineError, Stage};

pub const FILE_NAME: &str = "merged.parquet";

const COLUMNS: &[&str] = &[
    "record_id",
    "movie_id",
    "review_date",
    "release_date",
    "days_since_release",
    "review_combined",
    "is_spoiler",
];

pub fn write_merged(rows: &[MergedRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let record_ids: Vec<i64> = rows.iter().map(|r| r.record_id as i64).collect();
    let movie_ids: Vec<String> = rows.iter().map(|r| r.movie_id.clone()).collect();
    let review_dates: Vec<String> = rows.iter().map(|r| r.review_date.to_string()).collect();
    let release_dates: Vec<String> = rows.iter().map(|r| r.release_date.to_string()).collect();
    let days: Vec<i64> = rows.iter().map(|r| r.days_since_release).collect();
    let texts: Vec<String> = rows.iter().map(|r| r.review_combined.clone()).collect();
    let labels: Vec<bool> = rows.iter().map(|r| r.is_spoiler).collect();

    let mut df = DataFrame::new(vec![
        Series::new("record_id".into(), record_ids),
        Series::new("movie_id".into(), movie_ids),
        Series::new("review_date".into(), review_dates),
        Series::new("release_date".into(), release_dates),
        Series::new("days_since_release".into(), days),
        Series::new("review_combined".into(), texts),
        Series::new("is_spoiler".into(), labels),
    ])?;
    let file = File::create(path)?;
    ParquetWriter::new(file).finish(&mut df)?;
    info!(path = %path.display(), rows = rows.len(), "wrote merged parquet");
    Ok(())
}

pub fn read_merged(path: &Path) -> Result<Vec<MergedRecord>> {
    if !path.exists() {
        return Err(PipelineError::MissingCheckpoint {
            stage: Stage::Join,
            path: path.to_path_buf(),
        }
        .into());
    }
    let mismatch = |found: String| PipelineError::SchemaMismatch {
        stage: Stage::Join,
        path: path.to_path_buf(),
        expected: format!("columns {}", COLUMNS.join(", ")),
        found,
    };
    let df = ParquetReader::new(File::open(path)?)
        .finish()
        .map_err(|err| mismatch(format!("unreadable parquet ({err})")))?;
    if let Some(missing) = COLUMNS.iter().find(|name| df.column(name).is_err()) {
        return Err(mismatch(format!("no `{missing}` column")).into());
    }

    let id_col = df.column("record_id")?.i64()?;
    let movie_col = df.column("movie_id")?.str()?;
    let review_col = df.column("review_date")?.str()?;
    let release_col = df.column("release_date")?.str()?;
    let days_col = df.column("days_since_release")?.i64()?;
    let text_col = df.column("review_combined")?.str()?;
    let label_col = df.column("is_spoiler")?.bool()?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (
            Some(record_id),
            Some(movie_id),
            Some(review_date),
            Some(release_date),
            Some(days),
            Some(text),
            Some(label),
        ) = (
            id_col.get(idx),
            movie_col.get(idx),
            review_col.get(idx),
            release_col.get(idx),
            days_col.get(idx),
            text_col.get(idx),
            label_col.get(idx),
        )
        else {
            return Err(anyhow!("{}: null value in row {idx}", path.display()));
        };
        rows.push(MergedRecord {
            record_id: record_id as u64,
            movie_id: movie_id.to_string(),
            review_date: iso_date(review_date)?,
            release_date: iso_date(release_date)?,
            days_since_release: days,
            review_combined: text.to_string(),
            is_spoiler: label,
        });
    }
    info!(path = %path.display(), rows = rows.len(), "loaded merged parquet");
    Ok(rows)
}

fn iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| anyhow!("bad stored date {raw:?}: {err}"))
}
