use anyhow::{Context, Result};
use feedforward_nn::architecture::{build_network, load_architecture};
use feedforward_nn::config::{load_config, SgdConfig};
use feedforward_nn::layers::{DropoutLayer, FullyConnectedLayer, IdentityLayer, Layer, SoftMaxLayer};
use feedforward_nn::loss::l2_loss;
use feedforward_nn::matrix::{from_flat, Matrix};
use feedforward_nn::metrics::classification_rate;
use feedforward_nn::network::FeedForwardNetwork;
use feedforward_nn::sgd::Sgd;
use feedforward_nn::utils::SimpleRng;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Small MLP classifying noisy 2-D points into one of three clusters.
// Usage: mlp_synthetic [sgd_config.json] [architecture.json]
const NUM_INPUTS: usize = 2;
const NUM_HIDDEN: usize = 16;
const NUM_CLASSES: usize = 3;
const TRAIN_SAMPLES: usize = 600;
const TEST_SAMPLES: usize = 150;
const CENTERS: [[f64; 2]; NUM_CLASSES] = [[0.2, 0.2], [0.8, 0.3], [0.5, 0.8]];
const SPREAD: f64 = 0.12;

// Points scattered uniformly around each cluster center, labels one-hot.
fn generate_dataset(samples: usize, rng: &mut SimpleRng) -> Result<(Matrix, Matrix)> {
    let mut features = Vec::with_capacity(samples * NUM_INPUTS);
    let mut targets = vec![0.0; samples * NUM_CLASSES];

    for i in 0..samples {
        let class = rng.gen_usize(NUM_CLASSES);
        for center in CENTERS[class] {
            features.push(center + rng.gen_range_f64(-SPREAD, SPREAD));
        }
        targets[i * NUM_CLASSES + class] = 1.0;
    }

    Ok((
        from_flat(samples, NUM_INPUTS, features)?,
        from_flat(samples, NUM_CLASSES, targets)?,
    ))
}

fn default_network(rng: &mut SimpleRng) -> Result<FeedForwardNetwork> {
    Ok(FeedForwardNetwork::new()
        .with_layer(FullyConnectedLayer::new(NUM_INPUTS, NUM_HIDDEN, rng))
        .with_layer(DropoutLayer::new(0.05, rng)?)
        .with_layer(FullyConnectedLayer::new(NUM_HIDDEN, NUM_CLASSES, rng).with_activation(IdentityLayer))
        .with_layer(SoftMaxLayer::new()))
}

fn evaluate(network: &mut FeedForwardNetwork, x: &Matrix, y: &Matrix) -> Result<f64> {
    network.set_training(false);
    let rate = classification_rate(network, x, y)?;
    network.set_training(true);
    Ok(rate)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => load_config(path).with_context(|| format!("loading {path}"))?,
        None => SgdConfig::default()
            .with_epochs(50)
            .with_batch_size(32)
            .with_learning_rate(0.5)
            .with_seed(42),
    };

    let mut rng = SimpleRng::new(config.seed);
    let (x_train, y_train) = generate_dataset(TRAIN_SAMPLES, &mut rng)?;
    let (x_test, y_test) = generate_dataset(TEST_SAMPLES, &mut rng)?;

    let mut network = match args.get(2) {
        Some(path) => {
            let arch = load_architecture(path).with_context(|| format!("loading {path}"))?;
            build_network(&arch, &mut rng)?
        }
        None => default_network(&mut rng)?,
    };
    info!(parameters = network.parameter_count(), layers = ?network.layer_names(), "network ready");

    let start_rate = evaluate(&mut network, &x_test, &y_test)?;
    let report = Sgd::new(config)?
        .with_rng(rng.fork())
        .train(&x_train, &y_train, l2_loss, &mut network)?;
    let end_rate = evaluate(&mut network, &x_test, &y_test)?;

    if let Some(loss) = report.final_validation_loss() {
        info!("Final validation loss: {loss:.6}");
    }
    info!("Classification rate on test set: from {start_rate:.2}% to {end_rate:.2}%");
    Ok(())
}
