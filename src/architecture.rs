//! Architecture configuration structures
//!
//! Networks can be described in JSON and built with [`build_network`], so
//! different layer stacks can be tried without code changes.

use crate::error::{NnError, Result};
use crate::layers::{DropoutLayer, FullyConnectedLayer, IdentityLayer, Layer, ReluLayer, SoftMaxLayer};
use crate::network::FeedForwardNetwork;
use crate::utils::SimpleRng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Activation nested inside a fully connected layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Softmax,
    Identity,
}

/// Configuration for a single layer in the network.
///
/// # Examples
///
/// ```json
/// { "layer_type": "fully_connected", "input_size": 784, "output_size": 30 }
/// ```
///
/// ```json
/// { "layer_type": "dropout", "drop_rate": 0.05 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "layer_type", rename_all = "snake_case")]
pub enum LayerConfig {
    FullyConnected {
        input_size: usize,
        output_size: usize,
        #[serde(default)]
        activation: Activation,
    },
    Relu,
    Softmax,
    Dropout {
        drop_rate: f64,
    },
}

/// Configuration for the entire network, layers in application order.
///
/// # Example
///
/// ```json
/// {
///   "layers": [
///     { "layer_type": "fully_connected", "input_size": 784, "output_size": 30 },
///     { "layer_type": "dropout", "drop_rate": 0.05 },
///     { "layer_type": "fully_connected", "input_size": 30, "output_size": 10 },
///     { "layer_type": "softmax" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchitectureConfig {
    pub layers: Vec<LayerConfig>,
}

impl ArchitectureConfig {
    /// Checks that:
    /// - there is at least one layer
    /// - every size is positive and every drop rate is in [0, 1]
    /// - each fully connected layer's input size matches the output size of
    ///   the previous fully connected layer
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig(
                "architecture must have at least one layer".into(),
            ));
        }

        let mut width: Option<usize> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            match *layer {
                LayerConfig::FullyConnected {
                    input_size,
                    output_size,
                    ..
                } => {
                    if input_size == 0 || output_size == 0 {
                        return Err(NnError::InvalidConfig(format!(
                            "layer {i}: fully connected sizes must be positive"
                        )));
                    }
                    if let Some(previous) = width {
                        if previous != input_size {
                            return Err(NnError::InvalidConfig(format!(
                                "layer {i}: input size {input_size} does not match previous output size {previous}"
                            )));
                        }
                    }
                    width = Some(output_size);
                }
                LayerConfig::Dropout { drop_rate } => {
                    if !(0.0..=1.0).contains(&drop_rate) {
                        return Err(NnError::InvalidConfig(format!(
                            "layer {i}: drop_rate must be in [0, 1], got {drop_rate}"
                        )));
                    }
                }
                LayerConfig::Relu | LayerConfig::Softmax => {}
            }
        }
        Ok(())
    }

    /// Input width expected by the network, when the first sized layer says.
    pub fn input_size(&self) -> Option<usize> {
        self.layers.iter().find_map(|layer| match layer {
            LayerConfig::FullyConnected { input_size, .. } => Some(*input_size),
            _ => None,
        })
    }
}

/// Loads and validates an architecture from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use feedforward_nn::architecture::load_architecture;
///
/// let arch = load_architecture("config/architectures/mlp_mnist.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture(path: impl AsRef<Path>) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn activation_layer(activation: Activation) -> Box<dyn Layer> {
    match activation {
        Activation::Relu => Box::new(ReluLayer::new()),
        Activation::Softmax => Box::new(SoftMaxLayer::new()),
        Activation::Identity => Box::new(IdentityLayer),
    }
}

/// Build a network from `config`, drawing initial parameters and dropout
/// streams from `rng`.
pub fn build_network(config: &ArchitectureConfig, rng: &mut SimpleRng) -> Result<FeedForwardNetwork> {
    config.validate()?;

    let mut network = FeedForwardNetwork::new();
    for layer in &config.layers {
        match *layer {
            LayerConfig::FullyConnected {
                input_size,
                output_size,
                activation,
            } => network.push(
                FullyConnectedLayer::new(input_size, output_size, rng)
                    .with_activation(activation_layer(activation)),
            ),
            LayerConfig::Relu => network.push(ReluLayer::new()),
            LayerConfig::Softmax => network.push(SoftMaxLayer::new()),
            LayerConfig::Dropout { drop_rate } => network.push(DropoutLayer::new(drop_rate, rng)?),
        }
    }

    debug!(
        layers = ?network.layer_names(),
        parameters = network.parameter_count(),
        "built network"
    );
    Ok(network)
}
