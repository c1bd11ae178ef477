//! Feed-forward neural network toolkit
//!
//! A small set of differentiable layers with hand-derived gradients, a
//! network that chains them, an L2 loss, a finite-difference gradient
//! checker and a mini-batch SGD trainer with L2 weight decay.
//!
//! # Modules
//!
//! - `layers`: Layer trait and implementations (FullyConnected, ReLU, SoftMax, Dropout)
//! - `network`: Ordered composition of layers
//! - `loss`: L2 loss and its gradient
//! - `gradient_check`: Numeric gradient oracle for backward passes
//! - `sgd`: Mini-batch stochastic gradient descent
//! - `config`: Training configuration
//! - `architecture`: Network construction from JSON
//! - `metrics`: Class decisions and classification rate
//! - `utils`: Seeded RNG

pub mod architecture;
pub mod config;
pub mod error;
pub mod gradient_check;
pub mod layers;
pub mod loss;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod sgd;
pub mod utils;

pub use error::{NnError, Result};
pub use matrix::Matrix;
