//! Seeded stratified train/test split over boolean labels.

use anyhow::{anyhow, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// Row indices of each partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition rows so both sides keep the overall label ratio within rounding.
///
/// `n_test = ceil(test_fraction * n)`. Each class receives the floor of its proportional test
/// share; leftover test slots go to the classes with the largest fractional share (larger class
/// first, then `false` before `true`).
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> Result<Split> {
    let n = labels.len();
    if n < 2 {
        return Err(anyhow!("need at least two rows to split, got {n}"));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(anyhow!("test fraction {test_fraction} outside (0, 1)"));
    }
    // The epsilon keeps exact products such as 0.2 * 100 from rounding up past 20.
    let n_test = ((test_fraction * n as f64 - 1e-9).ceil() as usize).clamp(1, n - 1);

    let classes: [Vec<usize>; 2] = [
        (0..n).filter(|&i| !labels[i]).collect(),
        (0..n).filter(|&i| labels[i]).collect(),
    ];
    let mut quota = [0usize; 2];
    let mut remainders: Vec<(f64, usize, usize)> = Vec::with_capacity(2);
    for (class, members) in classes.iter().enumerate() {
        let exact = n_test as f64 * members.len() as f64 / n as f64;
        quota[class] = exact.floor() as usize;
        remainders.push((exact - exact.floor(), members.len(), class));
    }
    remainders.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(b.1.cmp(&a.1))
            .then(a.2.cmp(&b.2))
    });
    let mut leftover = n_test - quota.iter().sum::<usize>();
    for &(_, size, class) in remainders.iter().cycle().take(4) {
        if leftover == 0 {
            break;
        }
        if quota[class] < size {
            quota[class] += 1;
            leftover -= 1;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (class, members) in classes.iter().enumerate() {
        let mut shuffled = members.clone();
        shuffled.shuffle(&mut rng);
        let (test_part, train_part) = shuffled.split_at(quota[class]);
        test.extend_from_slice(test_part);
        train.extend_from_slice(train_part);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}
