//! Rectified linear unit activation.

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::matrix::{check_shape, Matrix};
use ndarray::Zip;

/// Elementwise `max(x, 0)`.
pub fn relu(x: &Matrix) -> Matrix {
    x.mapv(|v| v.max(0.0))
}

/// Passes `grad` through where `x` was strictly positive, zero elsewhere.
///
/// The sub-gradient at exactly zero is taken to be zero.
pub fn relu_backward(grad: &Matrix, x: &Matrix) -> Result<Matrix> {
    check_shape("relu backward", x.dim(), grad)?;
    let mut result = Matrix::zeros(x.dim());
    Zip::from(&mut result)
        .and(grad)
        .and(x)
        .for_each(|out, &g, &v| {
            if v > 0.0 {
                *out = g;
            }
        });
    Ok(result)
}

/// ReLU layer. Caches its most recent input.
#[derive(Debug, Default)]
pub struct ReluLayer {
    input: Option<Matrix>,
}

impl ReluLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for ReluLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let output = relu(input);
        self.input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let input = self
            .input
            .as_ref()
            .ok_or(NnError::BackwardBeforeForward("relu"))?;
        relu_backward(grad_output, input)
    }

    fn name(&self) -> &'static str {
        "relu"
    }
}
