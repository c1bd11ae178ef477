//! Finite-difference oracle for validating analytic backward passes.
//!
//! [`numeric_gradient`] knows nothing about layers: it perturbs one entry of
//! its input at a time and differences a scalar function. [`gradient_check`]
//! wires a layer to [`l2_loss`] and compares the layer's analytic input
//! gradient against that oracle.

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::loss::l2_loss;
use crate::matrix::{check_shape, squared_norm, Matrix};

/// Largest accepted sum of squared differences between the two gradients.
pub const GRADIENT_TOLERANCE: f64 = 1e-3;

/// Central-difference step for an entry of value `x`.
///
/// Scales with the entry itself, so it is zero for an entry that is exactly
/// zero.
pub fn step_size(x: f64) -> f64 {
    f64::EPSILON.sqrt() * x
}

/// Numerical approximation of `∂f/∂x_ij` for every entry of `x`.
///
/// Each entry is `(f(x + h·e_ij) - f(x - h·e_ij)) / 2h` with `h` from
/// [`step_size`].
///
/// # Errors
///
/// [`NnError::ZeroStep`] for an entry equal to zero, and whatever `f` returns.
///
/// # Example
///
/// ```
/// use feedforward_nn::gradient_check::numeric_gradient;
/// use ndarray::array;
///
/// let grad = numeric_gradient(|x| Ok(x[[0, 0]] * x[[0, 0]]), &array![[10.0]]).unwrap();
/// assert!((grad[[0, 0]] - 20.0).abs() < 0.1);
/// ```
pub fn numeric_gradient<F>(mut f: F, x: &Matrix) -> Result<Matrix>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    let mut result = Matrix::zeros(x.dim());
    let mut perturbed = x.clone();

    for ((row, col), &value) in x.indexed_iter() {
        let h = step_size(value);
        if h == 0.0 {
            return Err(NnError::ZeroStep { row, col });
        }

        perturbed[[row, col]] = value - h;
        let below = f(&perturbed)?;
        perturbed[[row, col]] = value + h;
        let above = f(&perturbed)?;
        perturbed[[row, col]] = value;

        result[[row, col]] = (above - below) / (2.0 * h);
    }

    Ok(result)
}

/// Outcome of a passing [`gradient_check`].
#[derive(Debug, Clone)]
pub struct GradientCheckReport {
    pub analytic: Matrix,
    pub numeric: Matrix,
    /// Sum of squared elementwise differences.
    pub squared_error: f64,
}

/// Compare `layer`'s analytic input gradient with the numeric oracle.
///
/// Runs `layer.forward(x)`, takes the [`l2_loss`] gradient against `y`, and
/// backpropagates it. Then differences `x ↦ l2_loss(layer.forward(x), y)`
/// numerically. Layers with trainable parameters must have their updates
/// disabled first, or backward will move the function being differenced.
///
/// # Errors
///
/// [`NnError::GradientMismatch`] carrying both matrices when the squared
/// error reaches [`GRADIENT_TOLERANCE`] or is not finite; structural errors
/// from the layer itself otherwise.
pub fn gradient_check<L>(layer: &mut L, x: &Matrix, y: &Matrix) -> Result<GradientCheckReport>
where
    L: Layer + ?Sized,
{
    let prediction = layer.forward(x)?;
    let loss = l2_loss(&prediction, y)?;
    let analytic = layer.backward(&loss.gradient)?;
    check_shape("gradient check", x.dim(), &analytic)?;

    let numeric = numeric_gradient(|probe| Ok(l2_loss(&layer.forward(probe)?, y)?.value), x)?;

    let squared_error = squared_norm(&(&analytic - &numeric));
    if squared_error.is_nan() || squared_error >= GRADIENT_TOLERANCE {
        return Err(NnError::GradientMismatch {
            squared_error,
            tolerance: GRADIENT_TOLERANCE,
            analytic: Box::new(analytic),
            numeric: Box::new(numeric),
        });
    }

    Ok(GradientCheckReport {
        analytic,
        numeric,
        squared_error,
    })
}
