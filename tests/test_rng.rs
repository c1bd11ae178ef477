// Tests for RNG reproducibility and distribution.

use feedforward_nn::layers::{DropoutLayer, FullyConnectedLayer, Layer};
use feedforward_nn::sgd::shuffled_batches;
use feedforward_nn::utils::SimpleRng;
use ndarray::Array2;

// ============================================================================
// Reproducibility
// ============================================================================

mod reproducibility_tests {
    use super::*;

    #[test]
    fn test_rng_different_seeds_produce_different_sequences() {
        let mut rng1 = SimpleRng::new(1);
        let mut rng2 = SimpleRng::new(2);

        let a: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();
        let b: Vec<u64> = (0..10).map(|_| rng2.next_u64()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_continues_same_stream() {
        let mut rng = SimpleRng::new(99);
        rng.next_u64();
        let mut copy = rng.clone();
        for _ in 0..20 {
            assert_eq!(rng.next_f64(), copy.next_f64());
        }
    }

    #[test]
    fn test_forks_are_reproducible() {
        let mut parent1 = SimpleRng::new(5);
        let mut parent2 = SimpleRng::new(5);
        let mut child1 = parent1.fork();
        let mut child2 = parent2.fork();

        assert_eq!(child1.next_u64(), child2.next_u64());
        assert_eq!(parent1.next_u64(), parent2.next_u64());
    }

    #[test]
    fn test_forked_stream_is_not_the_parent_stream() {
        let mut parent = SimpleRng::new(7);
        let mut child = parent.fork();
        let same = (0..1000).filter(|_| parent.next_u64() == child.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_dropout_mask_independent_of_next_layer_weights() {
        // Same construction order as a network of dropout then fully connected.
        let mut rng = SimpleRng::new(42);
        let mut dropout = DropoutLayer::new(0.5, &mut rng).unwrap();
        let dense = FullyConnectedLayer::new(1, 64, &mut rng);

        let mask = dropout.forward(&Array2::ones((1, 64))).unwrap();
        let agree = mask
            .iter()
            .zip(dense.weight_matrix().iter())
            .filter(|&(&kept, &w)| (kept == 1.0) == (w < 0.0))
            .count();
        assert!((12..=52).contains(&agree), "mask agrees with weight signs on {agree}/64 columns");
    }

    #[test]
    fn test_batch_order_follows_seed() {
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y = x.clone();

        let first = shuffled_batches(&x, &y, 6, &mut SimpleRng::new(8)).unwrap();
        let second = shuffled_batches(&x, &y, 6, &mut SimpleRng::new(8)).unwrap();
        let other = shuffled_batches(&x, &y, 6, &mut SimpleRng::new(9)).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}

// ============================================================================
// Distribution
// ============================================================================

mod distribution_tests {
    use super::*;

    #[test]
    fn test_rng_mean_convergence_f64() {
        let mut rng = SimpleRng::new(424242);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.next_f64()).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean {mean}");
    }

    #[test]
    fn test_gen_range_f64_symmetric_mean() {
        let mut rng = SimpleRng::new(1234);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.gen_range_f64(-1.0, 1.0)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02, "mean {mean}");
    }

    #[test]
    fn test_gen_usize_distribution() {
        let mut rng = SimpleRng::new(2024);
        let mut counts = [0usize; 5];
        for _ in 0..10_000 {
            counts[rng.gen_usize(5)] += 1;
        }
        for count in counts {
            assert!((1700..2300).contains(&count), "bucket count {count}");
        }
    }

    #[test]
    fn test_shuffle_visits_every_position() {
        let mut rng = SimpleRng::new(77);
        let mut first_positions = [0usize; 4];
        for _ in 0..400 {
            let mut data = vec![0, 1, 2, 3];
            rng.shuffle_usize(&mut data);
            first_positions[data[0]] += 1;
        }
        assert!(first_positions.iter().all(|&c| c > 50), "{first_positions:?}");
    }
}
