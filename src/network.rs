//! Feed-forward composition of layers.

use crate::error::Result;
use crate::layers::Layer;
use crate::matrix::Matrix;

/// An ordered stack of layers behaving as a single [`Layer`].
///
/// The network takes ownership of each layer; nothing is copied. Forward
/// runs the layers in order, backward runs them in reverse.
///
/// # Example
///
/// ```
/// use feedforward_nn::layers::{FullyConnectedLayer, Layer, SoftMaxLayer};
/// use feedforward_nn::network::FeedForwardNetwork;
/// use feedforward_nn::utils::SimpleRng;
/// use ndarray::Array2;
///
/// let mut rng = SimpleRng::new(1);
/// let mut net = FeedForwardNetwork::new()
///     .with_layer(FullyConnectedLayer::new(4, 3, &mut rng))
///     .with_layer(SoftMaxLayer::new());
/// let out = net.forward(&Array2::ones((2, 4))).unwrap();
/// assert_eq!(out.dim(), (2, 3));
/// ```
#[derive(Default)]
pub struct FeedForwardNetwork {
    layers: Vec<Box<dyn Layer>>,
}

impl FeedForwardNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers }
    }

    /// Append a layer, builder style.
    pub fn with_layer(mut self, layer: impl Layer + 'static) -> Self {
        self.push(layer);
        self
    }

    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Names of the layers in order, for summaries and logs.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

impl Layer for FeedForwardNetwork {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut value = input.clone();
        for layer in &mut self.layers {
            value = layer.forward(&value)?;
        }
        Ok(value)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }
        Ok(grad)
    }

    fn weights(&self) -> Vec<&Matrix> {
        self.layers.iter().flat_map(|layer| layer.weights()).collect()
    }

    fn weights_mut(&mut self) -> Vec<&mut Matrix> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.weights_mut())
            .collect()
    }

    fn set_training(&mut self, training: bool) {
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        for layer in &mut self.layers {
            layer.set_learning_rate(learning_rate);
        }
    }

    fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.parameter_count()).sum()
    }

    fn name(&self) -> &'static str {
        "feed-forward network"
    }
}
