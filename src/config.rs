//! Configuration structures for training
//!
//! [`SgdConfig`] is a plain value object built once before training, either
//! in code through its builder methods or from a JSON file with
//! [`load_config`]. Fields missing from the JSON take their defaults.

use crate::error::{NnError, Result};
use crate::layers::DEFAULT_LEARNING_RATE;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Hyper-parameters for a stochastic gradient descent run.
///
/// # Example
///
/// ```json
/// {
///   "epochs": 100,
///   "batch_size": 64,
///   "validation_proportion": 0.1,
///   "regularization_constant": 0.001,
///   "learning_rate": 0.2,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SgdConfig {
    /// Passes over the training split.
    pub epochs: usize,

    /// Rows per mini-batch; the last batch of an epoch may be shorter.
    ///
    /// Bounded by the training split, not the whole dataset: with a
    /// validation share of `p` at most `N - floor(p·N)` rows are available.
    /// [`SgdConfig::validate`] cannot see `N`, so the bound is enforced by
    /// [`crate::sgd::Sgd::train`].
    pub batch_size: usize,

    /// Share of rows held out (from the end) for validation, in [0, 1).
    pub validation_proportion: f64,

    /// Weight-decay strength applied once per batch.
    pub regularization_constant: f64,

    /// Step size for gradient updates and weight decay.
    pub learning_rate: f64,

    /// Seed for batch shuffling; 0 selects the generator's fixed fallback.
    pub seed: u64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            batch_size: 1,
            validation_proportion: 0.1,
            regularization_constant: 0.001,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: 0,
        }
    }
}

impl SgdConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_validation_proportion(mut self, proportion: f64) -> Self {
        self.validation_proportion = proportion;
        self
    }

    /// Validation share as a whole percentage, e.g. `10` for 10%.
    pub fn with_validation_percent(self, percent: u32) -> Self {
        self.with_validation_proportion(f64::from(percent) / 100.0)
    }

    pub fn with_regularization_constant(mut self, constant: f64) -> Self {
        self.regularization_constant = constant;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field against its allowed range.
    ///
    /// The batch size is only checked for positivity here; whether it fits
    /// the training split depends on the data and is checked by the trainer.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(NnError::InvalidConfig("batch_size must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.validation_proportion) {
            return Err(NnError::InvalidConfig(format!(
                "validation_proportion must be in [0, 1), got {}",
                self.validation_proportion
            )));
        }
        if !(self.regularization_constant >= 0.0) {
            return Err(NnError::InvalidConfig(format!(
                "regularization_constant must be non-negative, got {}",
                self.regularization_constant
            )));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(NnError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Loads and validates a training configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use feedforward_nn::config::load_config;
///
/// let cfg = load_config("config/sgd_mnist.json").unwrap();
/// assert_eq!(cfg.batch_size, 64);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SgdConfig> {
    let contents = fs::read_to_string(path)?;
    let config: SgdConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
