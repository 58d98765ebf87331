use std::{sync::Arc, thread, time::Duration};

use chrono::NaiveDate;
use spoiler_scope::{
    config::FailurePolicy,
    data::join::MergedRecord,
    nlp::{
        annotate::{AnnotateError, Annotator, Doc},
        extract_features, load_annotator, ExtractOptions,
    },
    pipeline::stage::PipelineError,
};

/// Fails on texts containing "boom" and stalls on texts containing "slow".
struct Flaky;

impl Annotator for Flaky {
    fn annotate(&self, text: &str) -> Result<Doc, AnnotateError> {
        if text.contains("boom") {
            return Err(AnnotateError::TooLong { len: 0, max: 0 });
        }
        if text.contains("slow") {
            thread::sleep(Duration::from_millis(1500));
        }
        load_annotator().annotate(text)
    }
}

fn rows(texts: &[&str]) -> Vec<MergedRecord> {
    let release = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| MergedRecord {
            record_id: i as u64,
            movie_id: format!("tt{i}"),
            review_date: release,
            release_date: release,
            days_since_release: i as i64 * 10,
            review_combined: text.to_string(),
            is_spoiler: i % 2 == 0,
        })
        .collect()
}

fn options(policy: FailurePolicy) -> ExtractOptions {
    ExtractOptions {
        sample_cap: 100,
        workers: 3,
        task_timeout: Duration::from_secs(5),
        failure_policy: policy,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn results_rejoin_by_record_id() {
    let long = "The hero finally dies at the end. ".repeat(200);
    let input = rows(&[long.as_str(), "short", "The villain wins.", "meh"]);
    let set = extract_features(&input, load_annotator(), options(FailurePolicy::FailFast))
        .await
        .unwrap();

    let ids: Vec<u64> = set.records.iter().map(|r| r.record_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    for record in &set.records {
        let source = &input[record.record_id as usize];
        assert_eq!(record.is_spoiler, source.is_spoiler);
        assert_eq!(record.features.days_since_release, source.days_since_release);
    }
    assert!(set.skipped.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sample_cap_takes_leading_rows() {
    let input = rows(&["one", "two", "three", "four", "five"]);
    let mut opts = options(FailurePolicy::FailFast);
    opts.sample_cap = 3;
    let set = extract_features(&input, load_annotator(), opts).await.unwrap();
    assert_eq!(set.records.len(), 3);
    assert_eq!(set.records.last().unwrap().record_id, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fail_fast_aborts_with_failing_record() {
    let input = rows(&["fine", "boom", "fine again"]);
    let err = extract_features(&input, Arc::new(Flaky), options(FailurePolicy::FailFast))
        .await
        .unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Extraction { record_id, .. }) => assert_eq!(*record_id, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn skip_policy_drops_failed_and_timed_out_records() {
    let input = rows(&["fine", "boom", "slow one", "fine again"]);
    let mut opts = options(FailurePolicy::Skip);
    opts.task_timeout = Duration::from_millis(250);
    let set = extract_features(&input, Arc::new(Flaky), opts).await.unwrap();

    let ids: Vec<u64> = set.records.iter().map(|r| r.record_id).collect();
    assert_eq!(ids, vec![0, 3]);
    assert_eq!(set.skipped, vec![1, 2]);
}
