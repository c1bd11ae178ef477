//! Row-wise softmax output layer.

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::matrix::{check_shape, Matrix};
use ndarray::{Array2, Axis};

/// Row-wise softmax.
///
/// Subtracts each row's maximum before exponentiating so that large inputs
/// do not overflow.
pub fn softmax(x: &Matrix) -> Matrix {
    let mut result = x.clone();
    for mut row in result.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    result
}

/// Jacobian `diag(s) - sᵀs` of softmax, given its output `s` as a single row.
///
/// Fails with [`NnError::ShapeMismatch`] when `s` has more than one row.
pub fn softmax_jacobian(s: &Matrix) -> Result<Matrix> {
    if s.nrows() != 1 {
        return Err(NnError::ShapeMismatch {
            context: "softmax jacobian",
            expected: (1, s.ncols()),
            actual: s.dim(),
        });
    }
    let row = s.row(0);
    let outer = s.t().dot(s);
    Ok(Array2::from_diag(&row) - outer)
}

/// Softmax layer. Caches its most recent output.
#[derive(Debug, Default)]
pub struct SoftMaxLayer {
    output: Option<Matrix>,
}

impl SoftMaxLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for SoftMaxLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let output = softmax(input);
        self.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let output = self
            .output
            .as_ref()
            .ok_or(NnError::BackwardBeforeForward("softmax"))?;
        check_shape("softmax backward", output.dim(), grad_output)?;

        let mut result = Matrix::zeros(output.dim());
        for (r, mut out_row) in result.axis_iter_mut(Axis(0)).enumerate() {
            let s = output.row(r).insert_axis(Axis(0)).to_owned();
            let jacobian = softmax_jacobian(&s)?;
            out_row.assign(&grad_output.row(r).dot(&jacobian));
        }
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "softmax"
    }
}
