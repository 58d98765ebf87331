use ndarray::array;
use spoiler_scope::{
    config::{ScalerFit, Settings},
    data::checkpoint::{self, Artifact},
    model::{scaler::MinMaxScaler, ClassifierKind},
    nlp::{features::FeatureTuple, ExtractedRecord, FeatureSet},
    pipeline::{
        scale_features, split_and_vectorize,
        stage::{PipelineError, Stage},
        Predictions, ScaledTable, VectorizedSet,
    },
};
use tempfile::tempdir;

fn feature_set() -> FeatureSet {
    FeatureSet {
        records: vec![ExtractedRecord {
            record_id: 3,
            is_spoiler: true,
            features: FeatureTuple {
                days_since_release: -2,
                noun_count: 4,
                verb_count: 2,
                adj_count: 1,
                person_count: 1,
                org_count: 0,
                gpe_count: 0,
                date_count: 1,
                token_string: "hero die end".to_string(),
            },
        }],
        skipped: vec![7],
        sample_cap: 2000,
    }
}

#[test]
fn artifacts_round_trip_exactly() {
    let dir = tempdir().unwrap();

    let features = feature_set();
    let path = checkpoint::path_in::<FeatureSet>(dir.path());
    checkpoint::save(&path, &features).unwrap();
    assert_eq!(checkpoint::load::<FeatureSet>(&path).unwrap(), features);

    let table = ScaledTable {
        record_ids: vec![0, 1],
        labels: vec![false, true],
        numeric: array![[0.1 + 0.2, 1.0 / 3.0], [f64::MIN_POSITIVE, 0.0]],
        token_strings: vec!["a".into(), "b".into()],
        scaler: MinMaxScaler {
            min: array![0.0, 0.0],
            max: array![1.0, 3.0],
        },
        scaler_fit: ScalerFit::TrainOnly,
    };
    let path = checkpoint::path_in::<ScaledTable>(dir.path());
    checkpoint::save(&path, &table).unwrap();
    assert_eq!(checkpoint::load::<ScaledTable>(&path).unwrap(), table);
}

fn labelled_features(n: u32) -> FeatureSet {
    let records = (0..n)
        .map(|i| ExtractedRecord {
            record_id: u64::from(i),
            is_spoiler: i % 2 == 1,
            features: FeatureTuple {
                days_since_release: i64::from(i) * 11 - 40,
                noun_count: i + 2,
                verb_count: i % 4,
                adj_count: 1,
                person_count: i % 2,
                org_count: 0,
                gpe_count: 0,
                date_count: i % 3,
                token_string: format!("scene{i} reveal twist{} finale", i % 4),
            },
        })
        .collect();
    FeatureSet {
        records,
        skipped: Vec::new(),
        sample_cap: 2000,
    }
}

#[test]
fn vectorized_set_and_predictions_round_trip_exactly() {
    let dir = tempdir().unwrap();
    let settings = Settings::rooted(dir.path(), dir.path());
    let table = scale_features(&labelled_features(12), &settings).unwrap();
    let set = split_and_vectorize(&table, &settings).unwrap();

    let path = checkpoint::path_in::<VectorizedSet>(dir.path());
    checkpoint::save(&path, &set).unwrap();
    let loaded = checkpoint::load::<VectorizedSet>(&path).unwrap();
    assert_eq!(loaded, set);
    assert_eq!(
        loaded.vectorizer.transform(&["scene3 reveal"]).unwrap(),
        set.vectorizer.transform(&["scene3 reveal"]).unwrap()
    );

    let predictions = Predictions {
        model: ClassifierKind::Logistic,
        record_ids: set.test.record_ids.clone(),
        labels: set.test.labels.clone(),
        predicted: set.test.labels.iter().map(|l| !l).collect(),
        probabilities: set
            .test
            .labels
            .iter()
            .map(|_| [0.1 + 0.2, 1.0 - (0.1 + 0.2)])
            .collect(),
    };
    let path = checkpoint::path_in::<Predictions>(dir.path());
    checkpoint::save(&path, &predictions).unwrap();
    assert_eq!(checkpoint::load::<Predictions>(&path).unwrap(), predictions);
}

#[test]
fn missing_checkpoint_names_producing_stage() {
    let dir = tempdir().unwrap();
    let err = checkpoint::load::<FeatureSet>(&dir.path().join("features.json")).unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::MissingCheckpoint { stage, .. }) => {
            assert_eq!(*stage, FeatureSet::STAGE);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("spoiler-scope extract"));
}

#[test]
fn wrong_kind_is_a_schema_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.json");
    checkpoint::save(&path, &feature_set()).unwrap();
    let err = checkpoint::load::<ScaledTable>(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SchemaMismatch {
            stage: Stage::Scale,
            ..
        })
    ));
    assert!(err.to_string().contains("spoiler-scope prepare"));
}

#[test]
fn corrupt_payload_names_producing_stage() {
    let dir = tempdir().unwrap();
    let path = checkpoint::path_in::<VectorizedSet>(dir.path());
    std::fs::write(
        &path,
        r#"{"schema":"spoiler-scope/vectorized","version":1,"stage":"vectorize","written_at":"2024-01-01T00:00:00Z","payload":{"train":7}}"#,
    )
    .unwrap();
    let err = checkpoint::load::<VectorizedSet>(&path).unwrap_err();
    let pipeline_err = err.downcast_ref::<PipelineError>().expect("pipeline error");
    assert_eq!(pipeline_err.stage(), Some(Stage::Vectorize));
    let message = err.to_string();
    assert!(message.contains("stage 4"), "{message}");
    assert!(message.contains("spoiler-scope prepare"), "{message}");
}

#[test]
fn truncated_file_is_a_schema_mismatch() {
    let dir = tempdir().unwrap();
    let path = checkpoint::path_in::<FeatureSet>(dir.path());
    std::fs::write(&path, "{\"schema\":\"spoiler-").unwrap();
    let err = checkpoint::load::<FeatureSet>(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SchemaMismatch {
            stage: Stage::Extract,
            ..
        })
    ));
}

#[test]
fn stale_version_is_a_schema_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.json");
    std::fs::write(
        &path,
        r#"{"schema":"spoiler-scope/features","version":99,"stage":"extract","written_at":"2024-01-01T00:00:00Z","payload":{}}"#,
    )
    .unwrap();
    let err = checkpoint::load::<FeatureSet>(&path).unwrap_err();
    assert!(err.to_string().contains("v99"));
}
