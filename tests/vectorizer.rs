use spoiler_scope::model::tfidf::{ngrams, TfidfConfig, TfidfVectorizer};

fn config(range: (usize, usize), max_df: f64, max_features: usize) -> TfidfConfig {
    TfidfConfig {
        ngram_range: range,
        max_df,
        max_features,
    }
}

#[test]
fn out_of_vocabulary_rows_are_zero() {
    let train = ["hero dies end", "villain wins battle"];
    let vectorizer = TfidfVectorizer::fit(&train, TfidfConfig::default()).unwrap();
    let test = vectorizer.transform(&["zebra unicorn"]).unwrap();
    assert_eq!(test.n_rows(), 1);
    assert_eq!(test.n_cols(), vectorizer.n_features());
    assert_eq!(test.nnz(), 0);
}

#[test]
fn max_df_prunes_ubiquitous_terms() {
    let train = ["movie good", "movie bad", "movie great"];
    let vectorizer = TfidfVectorizer::fit(&train, TfidfConfig::default()).unwrap();
    let names = vectorizer.feature_names();
    assert!(!names.contains(&"movie".to_string()));
    assert!(names.contains(&"movie good".to_string()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn cap_keeps_most_frequent_terms() {
    let train = ["apple banana", "apple cherry", "apple banana date"];
    let vectorizer = TfidfVectorizer::fit(&train, config((1, 1), 1.0, 2)).unwrap();
    assert_eq!(vectorizer.feature_names(), vec!["apple", "banana"]);
    // Present in every document: smoothed idf is exactly 1.
    assert!((vectorizer.idf[0] - 1.0).abs() < 1e-12);
}

#[test]
fn rows_are_l2_normalised() {
    let train = ["plot twist ending", "twist twist surprise"];
    let vectorizer = TfidfVectorizer::fit(&train, config((1, 2), 1.0, 100)).unwrap();
    let matrix = vectorizer.transform(&train).unwrap();
    for row in 0..matrix.n_rows() {
        let (_, values) = matrix.row(row);
        let norm: f64 = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }
}

#[test]
fn single_character_words_are_ignored() {
    assert_eq!(ngrams("a B cc", (1, 1)), vec!["cc"]);
    assert_eq!(ngrams("Big Bad Wolf", (1, 3)), vec![
        "big", "bad", "wolf", "big bad", "bad wolf", "big bad wolf"
    ]);
}

#[test]
fn fully_pruned_vocabulary_is_allowed() {
    let train = ["same words", "same words"];
    let vectorizer = TfidfVectorizer::fit(&train, TfidfConfig::default()).unwrap();
    assert_eq!(vectorizer.n_features(), 0);
    let matrix = vectorizer.transform(&["same words"]).unwrap();
    assert_eq!(matrix.n_cols(), 0);
    assert_eq!(matrix.n_rows(), 1);
}
