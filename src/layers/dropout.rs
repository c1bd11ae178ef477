//! Dropout layer implementation for regularization
//!
//! During training, each feature column is dropped (zeroed) with probability
//! `drop_rate`. One mask row is sampled per forward call and shared by every
//! example in the batch. During inference no masking happens; the input is
//! scaled by `1 - drop_rate` instead so that activations keep the magnitude
//! they had on average during training.

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::matrix::{check_shape, Matrix};
use crate::utils::SimpleRng;
use ndarray::Array2;

/// Dropout layer for regularization.
///
/// # Fields
///
/// * `drop_rate` - Probability of dropping each feature column, in [0.0, 1.0]
/// * `training` - Whether the layer is in training mode (true) or inference mode (false)
/// * `frozen` - When set, training-mode forward reuses the cached mask
/// * `mask` - `1 × features` binary mask from the last training-mode forward pass
/// * `rng` - Random stream owned by this layer for mask sampling
///
/// # Example
///
/// ```
/// use feedforward_nn::layers::{DropoutLayer, Layer};
/// use feedforward_nn::utils::SimpleRng;
/// use ndarray::array;
///
/// let mut rng = SimpleRng::new(42);
/// let mut layer = DropoutLayer::new(0.5, &mut rng).unwrap();
/// layer.set_training(false);
/// let out = layer.forward(&array![[2.0, 4.0]]).unwrap();
/// assert_eq!(out, array![[1.0, 2.0]]);
/// ```
#[derive(Debug)]
pub struct DropoutLayer {
    drop_rate: f64,
    training: bool,
    frozen: bool,
    mask: Option<Matrix>,
    rng: SimpleRng,
}

impl DropoutLayer {
    /// Creates a dropout layer in training mode.
    ///
    /// The layer forks its own random stream from `rng`.
    ///
    /// # Errors
    ///
    /// [`NnError::InvalidConfig`] when `drop_rate` is outside [0.0, 1.0].
    pub fn new(drop_rate: f64, rng: &mut SimpleRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&drop_rate) {
            return Err(NnError::InvalidConfig(format!(
                "drop_rate must be in range [0.0, 1.0], got {drop_rate}"
            )));
        }

        Ok(Self {
            drop_rate,
            training: true,
            frozen: false,
            mask: None,
            rng: rng.fork(),
        })
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn drop_rate(&self) -> f64 {
        self.drop_rate
    }

    /// Mask sampled by the most recent training-mode forward pass.
    pub fn mask(&self) -> Option<&Matrix> {
        self.mask.as_ref()
    }

    /// Stop (or resume) resampling the mask on each training-mode forward.
    ///
    /// While frozen, a cached mask whose width matches the input is reused.
    /// Finite-difference checks need this: they evaluate the layer many times
    /// and expect the same function every time.
    pub fn freeze_mask(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    fn sample_mask(&mut self, features: usize) -> Matrix {
        let keep = 1.0 - self.drop_rate;
        let rng = &mut self.rng;
        Array2::from_shape_fn((1, features), |_| {
            if rng.next_f64() < keep {
                1.0
            } else {
                0.0
            }
        })
    }
}

impl Layer for DropoutLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if !self.training {
            let keep = 1.0 - self.drop_rate;
            return Ok(input.mapv(|v| v * keep));
        }

        let features = input.ncols();
        let reuse = self.frozen && self.mask.as_ref().is_some_and(|m| m.ncols() == features);
        if !reuse {
            self.mask = Some(self.sample_mask(features));
        }

        match &self.mask {
            Some(mask) => Ok(input * mask),
            None => Err(NnError::BackwardBeforeForward("dropout")),
        }
    }

    /// Applies the mask cached by the last training-mode forward pass.
    ///
    /// Gradients are only meaningful in training mode; after an
    /// inference-mode forward this still uses whatever mask was cached last.
    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let mask = self
            .mask
            .as_ref()
            .ok_or(NnError::BackwardBeforeForward("dropout"))?;
        check_shape(
            "dropout backward",
            (grad_output.nrows(), mask.ncols()),
            grad_output,
        )?;
        Ok(grad_output * mask)
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn name(&self) -> &'static str {
        "dropout"
    }
}
