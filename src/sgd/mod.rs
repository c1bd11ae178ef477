//! Mini-batch stochastic gradient descent.
//!
//! One call to [`Sgd::train`] runs the whole schedule:
//!
//! 1. split the data once into training and validation rows,
//! 2. every epoch, shuffle the training rows into batches,
//! 3. per batch: forward, loss, weight decay, backward (the layers update
//!    their own parameters during backward),
//! 4. after each epoch, evaluate the validation split in inference mode.
//!
//! Weight decay runs before the batch's gradient step and is not part of
//! the reported loss.

pub mod batch;

pub use batch::{sample_batch, shuffled_batches, train_validation_split, Batch};

use crate::config::SgdConfig;
use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::loss::LossOutput;
use crate::matrix::Matrix;
use crate::utils::SimpleRng;
use tracing::{debug, info};

/// Summary of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch index.
    pub epoch: usize,
    pub batches: usize,
    /// Mean of the per-batch training losses.
    pub training_loss: f64,
    /// `None` when the validation split is empty.
    pub validation_loss: Option<f64>,
}

/// Everything [`Sgd::train`] observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub training_rows: usize,
    pub validation_rows: usize,
    pub epochs: Vec<EpochReport>,
}

impl TrainingReport {
    /// Validation loss of the last epoch, if there was a validation split.
    pub fn final_validation_loss(&self) -> Option<f64> {
        self.epochs.last().and_then(|e| e.validation_loss)
    }
}

/// Shrink every weight matrix: `w -= learning_rate · constant · w`.
pub fn l2_regularize<L>(network: &mut L, learning_rate: f64, constant: f64)
where
    L: Layer + ?Sized,
{
    let decay = learning_rate * constant;
    if decay == 0.0 {
        return;
    }
    for weights in network.weights_mut() {
        weights.mapv_inplace(|w| w - decay * w);
    }
}

/// Stochastic gradient descent trainer.
///
/// Owns its configuration and the random stream used for shuffling, so two
/// trainers built from the same seed visit batches in the same order.
///
/// # Example
///
/// ```
/// use feedforward_nn::config::SgdConfig;
/// use feedforward_nn::layers::{FullyConnectedLayer, IdentityLayer, SoftMaxLayer};
/// use feedforward_nn::loss::l2_loss;
/// use feedforward_nn::network::FeedForwardNetwork;
/// use feedforward_nn::sgd::Sgd;
/// use feedforward_nn::utils::SimpleRng;
/// use ndarray::array;
///
/// let x = array![[0.1, 0.9], [0.8, 0.2], [0.2, 0.7], [0.9, 0.1]];
/// let y = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
///
/// let mut rng = SimpleRng::new(3);
/// let mut net = FeedForwardNetwork::new()
///     .with_layer(FullyConnectedLayer::new(2, 2, &mut rng).with_activation(IdentityLayer))
///     .with_layer(SoftMaxLayer::new());
///
/// let config = SgdConfig::default().with_epochs(5).with_batch_size(2).with_validation_percent(25);
/// let report = Sgd::new(config).unwrap().train(&x, &y, l2_loss, &mut net).unwrap();
/// assert_eq!(report.epochs.len(), 5);
/// assert_eq!(report.validation_rows, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Sgd {
    config: SgdConfig,
    rng: SimpleRng,
}

impl Sgd {
    /// Validate `config` and seed the shuffling stream from `config.seed`.
    pub fn new(config: SgdConfig) -> Result<Self> {
        config.validate()?;
        let rng = SimpleRng::new(config.seed);
        Ok(Self { config, rng })
    }

    /// Use an explicit random stream instead of the configured seed.
    pub fn with_rng(mut self, rng: SimpleRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &SgdConfig {
        &self.config
    }

    /// Train `network` on features `x` and one-hot targets `y`.
    ///
    /// The trainer's learning rate is pushed into the network first. The
    /// network is left in training mode.
    ///
    /// # Errors
    ///
    /// Row-count mismatches and a batch size larger than the training split
    /// are reported before any parameter changes. Shape errors from the
    /// network abort the run.
    pub fn train<L, F>(
        &mut self,
        x: &Matrix,
        y: &Matrix,
        loss: F,
        network: &mut L,
    ) -> Result<TrainingReport>
    where
        L: Layer + ?Sized,
        F: Fn(&Matrix, &Matrix) -> Result<LossOutput>,
    {
        let (training, validation) =
            train_validation_split(x, y, self.config.validation_proportion)?;
        if training.is_empty() {
            return Err(NnError::InvalidConfig("training split is empty".into()));
        }
        if self.config.batch_size > training.len() {
            return Err(NnError::InvalidConfig(format!(
                "batch_size {} exceeds the {} training rows",
                self.config.batch_size,
                training.len()
            )));
        }

        debug!(
            training_rows = training.len(),
            validation_rows = validation.len(),
            batch_size = self.config.batch_size,
            "starting sgd"
        );

        network.set_learning_rate(self.config.learning_rate);
        let mut report = TrainingReport {
            training_rows: training.len(),
            validation_rows: validation.len(),
            epochs: Vec::with_capacity(self.config.epochs),
        };

        for epoch in 1..=self.config.epochs {
            network.set_training(true);
            let batches = shuffled_batches(
                &training.features,
                &training.targets,
                self.config.batch_size,
                &mut self.rng,
            )?;

            let mut loss_sum = 0.0;
            for (index, batch) in batches.iter().enumerate() {
                let batch_loss = self.step(batch, &loss, network)?;
                debug!(epoch, batch = index, loss = batch_loss, "batch done");
                loss_sum += batch_loss;
            }

            let validation_loss = if validation.is_empty() {
                None
            } else {
                network.set_training(false);
                let prediction = network.forward(&validation.features);
                network.set_training(true);
                Some(loss(&prediction?, &validation.targets)?.value)
            };

            match validation_loss {
                Some(value) => info!(
                    epoch,
                    epochs = self.config.epochs,
                    validation_loss = value,
                    "Validation set loss: {value:.6} (epoch {epoch}/{})",
                    self.config.epochs
                ),
                None => info!(epoch, epochs = self.config.epochs, "epoch complete, no validation rows"),
            }

            report.epochs.push(EpochReport {
                epoch,
                batches: batches.len(),
                training_loss: loss_sum / batches.len() as f64,
                validation_loss,
            });
        }

        Ok(report)
    }

    /// One forward/decay/backward step on a single batch. Returns its loss.
    fn step<L, F>(&self, batch: &Batch, loss: &F, network: &mut L) -> Result<f64>
    where
        L: Layer + ?Sized,
        F: Fn(&Matrix, &Matrix) -> Result<LossOutput>,
    {
        let prediction = network.forward(&batch.features)?;
        let LossOutput { value, gradient } = loss(&prediction, &batch.targets)?;
        l2_regularize(
            network,
            self.config.learning_rate,
            self.config.regularization_constant,
        );
        network.backward(&gradient)?;
        Ok(value)
    }
}
