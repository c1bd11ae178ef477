//! Fully connected (dense) layer implementation
//!
//! Performs the transformation `output = activation(input × W + b)` and
//! updates `W` and `b` by gradient descent during its own backward pass.

use crate::error::{NnError, Result};
use crate::layers::{Layer, ReluLayer};
use crate::matrix::{check_product, check_shape, random_uniform, Matrix};
use crate::utils::SimpleRng;
use ndarray::Axis;

/// Step size used by a layer that was never given one explicitly.
pub const DEFAULT_LEARNING_RATE: f64 = 0.2;

/// Gradients of the loss with respect to a layer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGradients {
    /// `Xᵀ · gradA`, shaped like the weight matrix.
    pub weights: Matrix,
    /// Column sums of `gradA`, shaped like the bias row.
    pub bias: Matrix,
}

/// Affine transform `x · w + b` with `b` broadcast across rows.
pub fn affine_forward(x: &Matrix, w: &Matrix, b: &Matrix) -> Result<Matrix> {
    check_product("fully connected forward", x.dim(), w.dim())?;
    check_shape("fully connected bias", (1, w.ncols()), b)?;
    Ok(x.dot(w) + b)
}

/// Matrix calculus for `A = X·W + b`.
///
/// Given `grad = ∂L/∂A`, returns `(∂L/∂X, ∂L/∂W, ∂L/∂b)`.
pub fn affine_backward(
    grad: &Matrix,
    x: &Matrix,
    w: &Matrix,
) -> Result<(Matrix, ParameterGradients)> {
    check_shape("fully connected backward", (x.nrows(), w.ncols()), grad)?;
    check_product("fully connected backward", x.dim(), w.dim())?;

    let grad_bias = grad.sum_axis(Axis(0)).insert_axis(Axis(0));
    let grad_weights = x.t().dot(grad);
    let grad_input = grad.dot(&w.t());

    Ok((
        grad_input,
        ParameterGradients {
            weights: grad_weights,
            bias: grad_bias,
        },
    ))
}

/// Fully connected layer with weights, bias and a nested activation.
///
/// # Fields
///
/// * `weights` - Weight matrix (input_size × output_size)
/// * `bias` - Bias row (1 × output_size)
/// * `activation` - Layer applied to the affine output, ReLU unless replaced
/// * `input` - Input cached by the last forward pass
/// * `gradients` - Parameter gradients from the last backward pass
///
/// # Example
///
/// ```
/// use feedforward_nn::layers::{FullyConnectedLayer, Layer};
/// use feedforward_nn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let layer = FullyConnectedLayer::new(784, 30, &mut rng);
/// assert_eq!(layer.input_size(), 784);
/// assert_eq!(layer.output_size(), 30);
/// assert_eq!(layer.parameter_count(), 784 * 30 + 30);
/// ```
pub struct FullyConnectedLayer {
    weights: Matrix,
    bias: Matrix,
    activation: Box<dyn Layer>,
    learning_rate: f64,
    update_enabled: bool,
    input: Option<Matrix>,
    gradients: Option<ParameterGradients>,
}

impl FullyConnectedLayer {
    /// Create a layer with weights and bias drawn uniformly from [-1, 1).
    pub fn new(input_size: usize, output_size: usize, rng: &mut SimpleRng) -> Self {
        let weights = random_uniform(input_size, output_size, rng);
        let bias = random_uniform(1, output_size, rng);
        Self::build(weights, bias)
    }

    /// Create a layer from explicit parameters.
    ///
    /// # Errors
    ///
    /// [`NnError::ShapeMismatch`] unless `bias` is `1 × weights.ncols()`.
    pub fn from_parameters(weights: Matrix, bias: Matrix) -> Result<Self> {
        check_shape("fully connected bias", (1, weights.ncols()), &bias)?;
        Ok(Self::build(weights, bias))
    }

    fn build(weights: Matrix, bias: Matrix) -> Self {
        Self {
            weights,
            bias,
            activation: Box::new(ReluLayer::new()),
            learning_rate: DEFAULT_LEARNING_RATE,
            update_enabled: true,
            input: None,
            gradients: None,
        }
    }

    /// Replace the activation applied after the affine transform.
    pub fn with_activation(mut self, activation: impl Layer + 'static) -> Self {
        self.activation = Box::new(activation);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Enable or disable in-place parameter updates during backward.
    ///
    /// With updates disabled the gradients are still computed and can be
    /// read back through [`FullyConnectedLayer::gradients`].
    pub fn set_update_enabled(&mut self, enabled: bool) {
        self.update_enabled = enabled;
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn weight_matrix(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    /// Parameter gradients computed by the most recent backward pass.
    pub fn gradients(&self) -> Option<&ParameterGradients> {
        self.gradients.as_ref()
    }
}

impl Layer for FullyConnectedLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let affine = affine_forward(input, &self.weights, &self.bias)?;
        self.input = Some(input.clone());
        self.activation.forward(&affine)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let grad_affine = self.activation.backward(grad_output)?;
        let input = self
            .input
            .as_ref()
            .ok_or(NnError::BackwardBeforeForward("fully connected"))?;
        let (grad_input, gradients) = affine_backward(&grad_affine, input, &self.weights)?;

        if self.update_enabled {
            self.weights.scaled_add(-self.learning_rate, &gradients.weights);
            self.bias.scaled_add(-self.learning_rate, &gradients.bias);
        }
        self.gradients = Some(gradients);

        Ok(grad_input)
    }

    /// The weight matrix only; the bias is not regularized.
    fn weights(&self) -> Vec<&Matrix> {
        vec![&self.weights]
    }

    fn weights_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.weights]
    }

    fn set_training(&mut self, training: bool) {
        self.activation.set_training(training);
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    fn name(&self) -> &'static str {
        "fully connected"
    }
}
