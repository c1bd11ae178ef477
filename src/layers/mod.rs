//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait and the concrete layers a
//! feed-forward classifier is assembled from.

mod r#trait;
pub mod dropout;
pub mod fully_connected;
pub mod identity;
pub mod relu;
pub mod softmax;

// Re-export the Layer trait for convenience
pub use r#trait::Layer;
pub use dropout::DropoutLayer;
pub use fully_connected::{FullyConnectedLayer, ParameterGradients, DEFAULT_LEARNING_RATE};
pub use identity::IdentityLayer;
pub use relu::ReluLayer;
pub use softmax::SoftMaxLayer;
