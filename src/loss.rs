//! Loss functions mapping a prediction and a target to a scalar and a gradient.

use crate::error::Result;
use crate::matrix::{check_shape, squared_norm, Matrix};

/// Scalar loss and its gradient with respect to the prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    pub value: f64,
    /// Same shape as the prediction; fed straight into `backward`.
    pub gradient: Matrix,
}

/// Halved mean squared error.
///
/// With `N` rows: `value = ½ Σ (y - ŷ)² / N` and `gradient = (ŷ - y) / N`.
///
/// # Example
///
/// ```
/// use feedforward_nn::loss::l2_loss;
/// use ndarray::array;
///
/// let out = l2_loss(&array![[1.0, 0.0]], &array![[0.0, 0.0]]).unwrap();
/// assert_eq!(out.value, 0.5);
/// assert_eq!(out.gradient, array![[1.0, 0.0]]);
/// ```
pub fn l2_loss(prediction: &Matrix, target: &Matrix) -> Result<LossOutput> {
    check_shape("l2 loss", prediction.dim(), target)?;
    let n = prediction.nrows() as f64;
    let diff = prediction - target;
    Ok(LossOutput {
        value: 0.5 * squared_norm(&diff) / n,
        gradient: diff / n,
    })
}
