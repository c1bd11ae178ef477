//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that every differentiable unit
//! implements: the concrete layers, and [`FeedForwardNetwork`] itself.
//!
//! [`FeedForwardNetwork`]: crate::network::FeedForwardNetwork

use crate::error::Result;
use crate::matrix::Matrix;

/// Core trait for neural network layers.
///
/// Inputs and outputs are matrices with one example per row.
///
/// # Forward/backward coupling
///
/// Each layer owns a single slot holding whatever it cached during its most
/// recent `forward` (input, mask, or output). `backward` reads that slot, so
/// it must be preceded by exactly one `forward` on the same instance in the
/// same training step. Interleaving forward calls for two unrelated batches
/// invalidates the pending backward. A layer is never shared across
/// concurrent passes.
///
/// # Example
///
/// ```
/// use feedforward_nn::layers::{Layer, ReluLayer};
/// use ndarray::array;
///
/// let mut relu = ReluLayer::new();
/// let out = relu.forward(&array![[1.0, -2.0]]).unwrap();
/// let grad_in = relu.backward(&array![[5.0, 5.0]]).unwrap();
/// assert_eq!(out, array![[1.0, 0.0]]);
/// assert_eq!(grad_in, array![[5.0, 0.0]]);
/// ```
pub trait Layer {
    /// Forward propagation through the layer.
    ///
    /// Returns an output with the same number of rows as `input`. Records the
    /// state needed by the next [`Layer::backward`] call.
    fn forward(&mut self, input: &Matrix) -> Result<Matrix>;

    /// Backward propagation through the layer.
    ///
    /// `grad_output` is the gradient of the loss with respect to this layer's
    /// most recent output; the return value is the gradient with respect to
    /// its most recent input. Layers with trainable parameters apply their
    /// own gradient-descent update here.
    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix>;

    /// Trainable non-bias parameter matrices, used for regularization.
    fn weights(&self) -> Vec<&Matrix> {
        Vec::new()
    }

    /// Mutable view of the same matrices returned by [`Layer::weights`].
    fn weights_mut(&mut self) -> Vec<&mut Matrix> {
        Vec::new()
    }

    /// Toggle behavior that differs between training and inference.
    fn set_training(&mut self, _training: bool) {}

    /// Set the step size used by parameter updates in `backward`.
    fn set_learning_rate(&mut self, _learning_rate: f64) {}

    /// Number of trainable scalars, biases included.
    fn parameter_count(&self) -> usize {
        0
    }

    /// Short human-readable layer kind.
    fn name(&self) -> &'static str;
}

impl<L: Layer + ?Sized> Layer for Box<L> {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        (**self).forward(input)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        (**self).backward(grad_output)
    }

    fn weights(&self) -> Vec<&Matrix> {
        (**self).weights()
    }

    fn weights_mut(&mut self) -> Vec<&mut Matrix> {
        (**self).weights_mut()
    }

    fn set_training(&mut self, training: bool) {
        (**self).set_training(training)
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        (**self).set_learning_rate(learning_rate)
    }

    fn parameter_count(&self) -> usize {
        (**self).parameter_count()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
