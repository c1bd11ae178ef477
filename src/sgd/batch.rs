//! Dataset splitting and mini-batch construction.

use crate::error::{NnError, Result};
use crate::matrix::Matrix;
use crate::utils::SimpleRng;
use ndarray::{s, Axis};

/// Features and one-hot targets for the same examples, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Matrix,
    pub targets: Matrix,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.nrows() == 0
    }
}

/// Fails unless `x` and `y` have the same number of rows.
pub fn check_rows(x: &Matrix, y: &Matrix) -> Result<()> {
    if x.nrows() != y.nrows() {
        return Err(NnError::RowCountMismatch {
            features: x.nrows(),
            targets: y.nrows(),
        });
    }
    Ok(())
}

/// Split into `(training, validation)` with the validation rows taken from
/// the end.
///
/// The validation split holds `floor(proportion · N)` rows.
pub fn train_validation_split(x: &Matrix, y: &Matrix, proportion: f64) -> Result<(Batch, Batch)> {
    check_rows(x, y)?;
    if !(0.0..1.0).contains(&proportion) {
        return Err(NnError::InvalidConfig(format!(
            "validation proportion must be in [0, 1), got {proportion}"
        )));
    }

    let rows = x.nrows();
    let validation_rows = (proportion * rows as f64) as usize;
    let boundary = rows - validation_rows;

    let training = Batch {
        features: x.slice(s![..boundary, ..]).to_owned(),
        targets: y.slice(s![..boundary, ..]).to_owned(),
    };
    let validation = Batch {
        features: x.slice(s![boundary.., ..]).to_owned(),
        targets: y.slice(s![boundary.., ..]).to_owned(),
    };
    Ok((training, validation))
}

/// Shuffle the rows of `x` and `y` together and cut them into consecutive
/// batches of `batch_size`. Every row lands in exactly one batch; the last
/// batch holds the remainder.
pub fn shuffled_batches(
    x: &Matrix,
    y: &Matrix,
    batch_size: usize,
    rng: &mut SimpleRng,
) -> Result<Vec<Batch>> {
    check_rows(x, y)?;
    if batch_size == 0 {
        return Err(NnError::InvalidConfig("batch_size must be positive".into()));
    }

    let mut order: Vec<usize> = (0..x.nrows()).collect();
    rng.shuffle_usize(&mut order);

    Ok(order
        .chunks(batch_size)
        .map(|indices| Batch {
            features: x.select(Axis(0), indices),
            targets: y.select(Axis(0), indices),
        })
        .collect())
}

/// Draw `n` rows uniformly at random, with replacement.
pub fn sample_batch(x: &Matrix, y: &Matrix, n: usize, rng: &mut SimpleRng) -> Result<Batch> {
    check_rows(x, y)?;
    if n > x.nrows() {
        return Err(NnError::InvalidConfig(format!(
            "sample of {n} rows exceeds the {} available",
            x.nrows()
        )));
    }

    let indices: Vec<usize> = (0..n).map(|_| rng.gen_usize(x.nrows())).collect();
    Ok(Batch {
        features: x.select(Axis(0), &indices),
        targets: y.select(Axis(0), &indices),
    })
}
