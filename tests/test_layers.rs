// Tests for the forward and backward behavior of individual layers.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use feedforward_nn::gradient_check::numeric_gradient;
use feedforward_nn::layers::softmax::{softmax, softmax_jacobian};
use feedforward_nn::layers::{
    DropoutLayer, FullyConnectedLayer, IdentityLayer, Layer, ReluLayer, SoftMaxLayer,
};
use feedforward_nn::matrix::Matrix;
use feedforward_nn::utils::SimpleRng;
use feedforward_nn::NnError;
use ndarray::{array, Axis};

// ============================================================================
// ReLU
// ============================================================================

mod relu_tests {
    use super::*;

    #[test]
    fn test_relu_forward_backward() {
        let mut relu = ReluLayer::new();
        let x = array![[1.0, 2.0, -1.0], [-3.0, 4.0, 5.0], [30.0, 40.0, -50.0]];

        let out = relu.forward(&x).unwrap();
        assert_eq!(out, array![[1.0, 2.0, 0.0], [0.0, 4.0, 5.0], [30.0, 40.0, 0.0]]);

        let grad = relu
            .backward(&array![[3.0, 4.0, 5.0], [6.0, 7.0, 8.0], [9.0, 10.0, 11.0]])
            .unwrap();
        assert_eq!(grad, array![[3.0, 4.0, 0.0], [0.0, 7.0, 8.0], [9.0, 10.0, 0.0]]);
    }

    #[test]
    fn test_relu_zero_input_blocks_gradient() {
        let mut relu = ReluLayer::new();
        relu.forward(&array![[0.0, 1.0]]).unwrap();
        assert_eq!(relu.backward(&array![[2.0, 2.0]]).unwrap(), array![[0.0, 2.0]]);
    }

    #[test]
    fn test_relu_backward_before_forward() {
        let err = ReluLayer::new().backward(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, NnError::BackwardBeforeForward(_)));
    }

    #[test]
    fn test_relu_backward_shape_mismatch() {
        let mut relu = ReluLayer::new();
        relu.forward(&array![[1.0, 2.0]]).unwrap();
        let err = relu.backward(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, NnError::ShapeMismatch { .. }));
    }
}

// ============================================================================
// SoftMax
// ============================================================================

mod softmax_tests {
    use super::*;

    #[test]
    fn test_softmax_large_inputs() {
        let out = SoftMaxLayer::new().forward(&array![[30.0, 40.0, 50.0]]).unwrap();
        let expected = array![[2.06106005e-09, 4.53978686e-05, 9.99954600e-01]];
        assert_abs_diff_eq!(out, expected, epsilon = 1e-2);
        assert_relative_eq!(out[[0, 1]], 4.53978686e-05, max_relative = 1e-6);
    }

    #[test]
    fn test_softmax_rows_are_distributions() {
        let x = array![[410.0, -50.0, 3.0, 0.5], [1e3, 1e3, -1e3, 0.0], [-7.0, -7.5, -8.0, -9.0]];
        let out = softmax(&x);

        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
        for sum in out.sum_axis(Axis(1)) {
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(out[[1, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_jacobian_known_row() {
        let s = array![[0.09003057317, 0.2447284711, 0.6652409558]];
        let jacobian = softmax_jacobian(&s).unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j {
                    s[[0, i]] * (1.0 - s[[0, i]])
                } else {
                    -s[[0, i]] * s[[0, j]]
                };
                assert_abs_diff_eq!(jacobian[[i, j]], expected, epsilon = 1e-12);
            }
        }
        assert_eq!(jacobian, jacobian.t());
    }

    #[test]
    fn test_softmax_jacobian_matches_finite_differences() {
        // The row above is softmax([1, 2, 3]).
        let x = array![[1.0, 2.0, 3.0]];
        let jacobian = softmax_jacobian(&softmax(&x)).unwrap();

        for j in 0..3 {
            let column = numeric_gradient(|p| Ok(softmax(p)[[0, j]]), &x).unwrap();
            for i in 0..3 {
                assert_abs_diff_eq!(column[[0, i]], jacobian[[i, j]], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_softmax_jacobian_rejects_batches() {
        assert!(softmax_jacobian(&array![[0.5, 0.5], [0.2, 0.8]]).is_err());
    }

    #[test]
    fn test_softmax_backward_per_row() {
        let mut layer = SoftMaxLayer::new();
        let x = array![[1.0, 2.0, 3.0], [0.5, -0.5, 0.0]];
        let s = layer.forward(&x).unwrap();
        let grad = array![[1.0, 0.0, -1.0], [0.2, 0.3, 0.5]];
        let back = layer.backward(&grad).unwrap();

        for r in 0..2 {
            let row = s.row(r).insert_axis(Axis(0)).to_owned();
            let expected = grad.row(r).insert_axis(Axis(0)).dot(&softmax_jacobian(&row).unwrap());
            for c in 0..3 {
                assert_abs_diff_eq!(back[[r, c]], expected[[0, c]], epsilon = 1e-12);
            }
        }
    }
}

// ============================================================================
// Dropout
// ============================================================================

mod dropout_tests {
    use super::*;

    #[test]
    fn test_dropout_rate_is_respected() {
        let mut rng = SimpleRng::new(42);
        let mut layer = DropoutLayer::new(0.3, &mut rng).unwrap();
        let out = layer.forward(&Matrix::ones((2, 5000))).unwrap();

        let dropped = out.row(0).iter().filter(|&&v| v == 0.0).count() as f64 / 5000.0;
        assert!((dropped - 0.3).abs() < 0.05, "dropped share {dropped}");
    }

    #[test]
    fn test_dropout_training_mode_round_trip() {
        let mut rng = SimpleRng::new(42);
        let mut layer = DropoutLayer::new(0.5, &mut rng).unwrap();
        assert!(layer.is_training());

        layer.set_training(false);
        assert_eq!(layer.forward(&array![[2.0, -4.0]]).unwrap(), array![[1.0, -2.0]]);

        layer.set_training(true);
        let out = layer.forward(&array![[2.0, -4.0]]).unwrap();
        assert!(out.iter().zip([2.0, -4.0]).all(|(&o, x)| o == 0.0 || o == x));
    }

    #[test]
    fn test_dropout_backward_shape_mismatch() {
        let mut rng = SimpleRng::new(1);
        let mut layer = DropoutLayer::new(0.5, &mut rng).unwrap();
        layer.forward(&Matrix::ones((2, 4))).unwrap();
        assert!(layer.backward(&Matrix::ones((2, 3))).is_err());
    }
}

// ============================================================================
// Fully Connected
// ============================================================================

mod fully_connected_tests {
    use super::*;

    #[test]
    fn test_forward_applies_relu_by_default() {
        let mut layer =
            FullyConnectedLayer::from_parameters(array![[1.0, -1.0], [2.0, -2.0]], array![[0.5, 0.5]])
                .unwrap();
        let out = layer.forward(&array![[1.0, 1.0]]).unwrap();
        assert_eq!(out, array![[3.5, 0.0]]);
    }

    #[test]
    fn test_backward_updates_parameters() {
        let mut layer = FullyConnectedLayer::from_parameters(array![[1.0], [2.0]], array![[0.0]])
            .unwrap()
            .with_activation(IdentityLayer)
            .with_learning_rate(0.1);
        layer.forward(&array![[1.0, 3.0]]).unwrap();
        let grad_in = layer.backward(&array![[2.0]]).unwrap();

        assert_eq!(grad_in, array![[2.0, 4.0]]);
        assert_abs_diff_eq!(*layer.weight_matrix(), array![[0.8], [1.4]], epsilon = 1e-12);
        assert_abs_diff_eq!(*layer.bias(), array![[-0.2]], epsilon = 1e-12);
    }

    #[test]
    fn test_learning_rate_from_trait() {
        let mut rng = SimpleRng::new(1);
        let mut layer = FullyConnectedLayer::new(3, 2, &mut rng);
        layer.set_learning_rate(0.01);
        assert_eq!(layer.learning_rate(), 0.01);
    }

    #[test]
    fn test_input_width_mismatch() {
        let mut rng = SimpleRng::new(1);
        let mut layer = FullyConnectedLayer::new(3, 2, &mut rng);
        let err = layer.forward(&Matrix::ones((4, 5))).unwrap_err();
        assert!(matches!(err, NnError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_weights_exclude_bias() {
        let mut rng = SimpleRng::new(1);
        let layer = FullyConnectedLayer::new(3, 2, &mut rng);
        assert_eq!(layer.weights(), vec![layer.weight_matrix()]);
        assert_eq!(layer.parameter_count(), 3 * 2 + 2);
    }
}

// ============================================================================
// Forward Idempotence
// ============================================================================

#[test]
fn test_stateless_forward_is_idempotent() {
    let x = array![[1.5, -2.0, 0.25], [4.0, 0.0, -3.0]];
    let mut rng = SimpleRng::new(3);
    let mut dropout = DropoutLayer::new(0.4, &mut rng).unwrap();
    dropout.set_training(false);

    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(ReluLayer::new()),
        Box::new(SoftMaxLayer::new()),
        Box::new(IdentityLayer),
        Box::new(dropout),
    ];
    for mut layer in layers {
        let first = layer.forward(&x).unwrap();
        let second = layer.forward(&x).unwrap();
        assert_eq!(first, second, "{} is not idempotent", layer.name());
    }
}
