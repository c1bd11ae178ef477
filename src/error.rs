//! Error type shared by every layer, the trainer and the config loaders.

use crate::matrix::Matrix;
use thiserror::Error;

/// Errors produced by the network toolkit.
///
/// Every variant except [`NnError::GradientMismatch`] is structural: a bad
/// shape or a bad configuration. Retrying the failed call will not change
/// the outcome.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("feature matrix has {features} rows but target matrix has {targets}")]
    RowCountMismatch { features: usize, targets: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} layer: backward called before forward")]
    BackwardBeforeForward(&'static str),

    #[error("numeric gradient step is zero at ({row}, {col}); use nonzero test values")]
    ZeroStep { row: usize, col: usize },

    #[error(
        "gradient check failed: squared error {squared_error:e} exceeds {tolerance:e}\n\
         analytic:\n{analytic}\nnumeric:\n{numeric}"
    )]
    GradientMismatch {
        squared_error: f64,
        tolerance: f64,
        analytic: Box<Matrix>,
        numeric: Box<Matrix>,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;
