use ndarray::{array, Array2};
use proptest::prelude::*;
use spoiler_scope::model::scaler::MinMaxScaler;

proptest! {
    #[test]
    fn full_fit_maps_into_unit_interval(
        rows in 2usize..30,
        values in prop::collection::vec(-1.0e6f64..1.0e6, 2 * 30),
    ) {
        let data = Array2::from_shape_fn((rows, 2), |(r, c)| values[r * 2 + c]);
        let all: Vec<usize> = (0..rows).collect();
        let scaler = MinMaxScaler::fit(&data, &all).unwrap();
        let scaled = scaler.transform(&data);

        for v in scaled.iter() {
            prop_assert!((0.0..=1.0).contains(v));
        }
        for col in 0..2 {
            let column = data.column(col);
            let (lo, hi) = column.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
            for row in 0..rows {
                if hi > lo && data[[row, col]] == lo {
                    prop_assert_eq!(scaled[[row, col]], 0.0);
                }
                if hi > lo && data[[row, col]] == hi {
                    prop_assert_eq!(scaled[[row, col]], 1.0);
                }
            }
        }
    }
}

#[test]
fn constant_column_maps_to_zero() {
    let data = array![[5.0, 1.0], [5.0, 3.0], [5.0, 2.0]];
    let scaler = MinMaxScaler::fit(&data, &[0, 1, 2]).unwrap();
    assert_eq!(scaler.degenerate_columns(), vec![0]);
    let scaled = scaler.transform(&data);
    assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    assert_eq!(scaled.column(1).to_vec(), vec![0.0, 1.0, 0.5]);
}

#[test]
fn train_only_fit_leaves_held_out_rows_unclipped() {
    let data = array![[0.0], [10.0], [20.0]];
    let scaler = MinMaxScaler::fit(&data, &[0, 1]).unwrap();
    let scaled = scaler.transform(&data);
    assert_eq!(scaled[[2, 0]], 2.0);
}

#[test]
fn empty_fit_is_an_error() {
    let data = array![[1.0]];
    assert!(MinMaxScaler::fit(&data, &[]).is_err());
}
