//! Dense matrix primitive and the handful of helpers the layers share.
//!
//! Every layer input and output is a [`Matrix`] whose rows are individual
//! examples. Products go through [`check_product`] first so that a shape
//! error is reported as [`NnError::ShapeMismatch`] rather than a panic.

use crate::error::{NnError, Result};
use crate::utils::SimpleRng;
use ndarray::Array2;

/// Row-major dense matrix of 64-bit floats.
pub type Matrix = Array2<f64>;

/// Build a `rows × cols` matrix from row-major data.
pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
    let len = data.len();
    Array2::from_shape_vec((rows, cols), data).map_err(|_| NnError::ShapeMismatch {
        context: "matrix construction",
        expected: (rows, cols),
        actual: (len, 1),
    })
}

/// Matrix with entries drawn uniformly from [-1, 1).
pub fn random_uniform(rows: usize, cols: usize, rng: &mut SimpleRng) -> Matrix {
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range_f64(-1.0, 1.0))
}

/// Sum of squared entries (squared Frobenius norm).
pub fn squared_norm(m: &Matrix) -> f64 {
    m.iter().map(|v| v * v).sum()
}

/// Fails unless `actual` has exactly the `expected` shape.
pub fn check_shape(context: &'static str, expected: (usize, usize), actual: &Matrix) -> Result<()> {
    if actual.dim() != expected {
        return Err(NnError::ShapeMismatch {
            context,
            expected,
            actual: actual.dim(),
        });
    }
    Ok(())
}

/// Fails unless `lhs · rhs` is defined.
pub fn check_product(context: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Result<()> {
    if lhs.1 != rhs.0 {
        return Err(NnError::ShapeMismatch {
            context,
            expected: (lhs.1, rhs.1),
            actual: rhs,
        });
    }
    Ok(())
}
