//! Turning network outputs into class decisions.

use crate::error::Result;
use crate::layers::Layer;
use crate::matrix::{check_shape, Matrix};
use crate::sgd::batch::check_rows;
use ndarray::ArrayView1;

/// Index of the largest entry; ties go to the lowest index.
///
/// Returns 0 for an empty row.
pub fn predicted_class(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Percentage of rows in `x` whose predicted class matches the one-hot row
/// of `y`.
///
/// The network is run as-is: switch it to inference mode first if it
/// contains dropout.
pub fn classification_rate<L>(network: &mut L, x: &Matrix, y: &Matrix) -> Result<f64>
where
    L: Layer + ?Sized,
{
    check_rows(x, y)?;
    if x.nrows() == 0 {
        return Ok(0.0);
    }

    let prediction = network.forward(x)?;
    check_shape("classification", y.dim(), &prediction)?;

    let correct = prediction
        .rows()
        .into_iter()
        .zip(y.rows())
        .filter(|(p, t)| predicted_class(p.view()) == predicted_class(t.view()))
        .count();
    Ok(correct as f64 / x.nrows() as f64 * 100.0)
}
