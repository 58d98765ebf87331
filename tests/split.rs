use spoiler_scope::model::split::stratified_split;

#[test]
fn preserves_label_ratio() {
    let labels: Vec<bool> = (0..100).map(|i| i < 60).collect();
    let split = stratified_split(&labels, 0.2, 42).expect("split");
    assert_eq!(split.test.len(), 20);
    assert_eq!(split.train.len(), 80);
    let test_true = split.test.iter().filter(|&&i| labels[i]).count();
    assert!((11..=13).contains(&test_true), "test true count {test_true}");
}

#[test]
fn five_rows_split_four_one() {
    let labels = vec![true, false, true, false, true];
    let split = stratified_split(&labels, 0.2, 42).expect("split");
    assert_eq!(split.train.len(), 4);
    assert_eq!(split.test.len(), 1);
    let train_labels: Vec<bool> = split.train.iter().map(|&i| labels[i]).collect();
    assert!(train_labels.contains(&true) && train_labels.contains(&false));
}

#[test]
fn partitions_are_disjoint_sorted_and_seeded() {
    let labels: Vec<bool> = (0..37).map(|i| i % 3 == 0).collect();
    let a = stratified_split(&labels, 0.25, 7).expect("split");
    let b = stratified_split(&labels, 0.25, 7).expect("split");
    assert_eq!(a, b);

    let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..37).collect::<Vec<_>>());
    assert!(a.train.windows(2).all(|w| w[0] < w[1]));
    assert!(a.test.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn rejects_degenerate_inputs() {
    assert!(stratified_split(&[true], 0.2, 1).is_err());
    assert!(stratified_split(&[true, false], 1.0, 1).is_err());
}
