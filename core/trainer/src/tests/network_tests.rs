// Path and File Name : /home/decepticloud/core/trainer/src/tests/network_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for the Q-network - layout, batch forward, loss reduction under Adam, non-finite update guard

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2, ArrayView1};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::errors::TrainerError;
    use crate::network::{train_step, AdamOptimizer, QNetwork};

    fn network(seed: u64) -> QNetwork {
        let mut rng = StdRng::seed_from_u64(seed);
        QNetwork::new(&[3, 24, 24, 3], &mut rng).unwrap()
    }

    fn batch() -> (Array2<f64>, Vec<usize>, Vec<f64>) {
        let inputs = array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 2.0],
            [1.0, 1.0, 0.0],
        ];
        (inputs, vec![0, 1, 2, 1], vec![0.0, 10.0, 10.0, -4.0])
    }

    #[test]
    fn test_layout() {
        let net = network(1);
        assert_eq!(net.sizes(), vec![3, 24, 24, 3]);
        assert_eq!(net.input_size(), 3);
        assert_eq!(net.output_size(), 3);
        assert!(net.validate().is_ok());

        let mut rng = StdRng::seed_from_u64(1);
        assert!(QNetwork::new(&[3], &mut rng).is_err());
        assert!(QNetwork::new(&[3, 0, 3], &mut rng).is_err());
    }

    #[test]
    fn test_seeded_init_is_deterministic() {
        assert_eq!(network(42), network(42));
        assert_ne!(network(42), network(43));
    }

    #[test]
    fn test_batch_forward_matches_single() {
        let net = network(5);
        let (inputs, _, _) = batch();
        let outputs = net.forward_batch(&inputs);

        for (row, input) in inputs.rows().into_iter().enumerate() {
            let single = net.forward(input);
            for col in 0..3 {
                assert!((outputs[[row, col]] - single[col]).abs() < 1e-12);
            }
        }
        assert_eq!(net.forward(ArrayView1::from(&[0.0, 0.0, 0.0][..])).len(), 3);
    }

    #[test]
    fn test_adam_reduces_loss() {
        let mut net = network(9);
        let mut optimizer = AdamOptimizer::new(&net, 0.01);
        let (inputs, actions, targets) = batch();

        let (initial, _) = net.loss_and_gradients(&inputs, &actions, &targets).unwrap();
        for _ in 0..300 {
            train_step(&mut net, &mut optimizer, &inputs, &actions, &targets).unwrap();
        }
        let (trained, _) = net.loss_and_gradients(&inputs, &actions, &targets).unwrap();

        assert!(trained < initial * 0.25, "loss {} -> {}", initial, trained);
        assert_eq!(optimizer.step_count(), 300);
    }

    #[test]
    fn test_non_finite_target_rejected_without_update() {
        let mut net = network(3);
        let mut optimizer = AdamOptimizer::new(&net, 0.001);
        let before = net.clone();
        let (inputs, actions, _) = batch();

        let result = train_step(&mut net, &mut optimizer, &inputs, &actions, &[0.0, f64::NAN, 0.0, 0.0]);
        assert!(matches!(result, Err(TrainerError::NumericalFailure(_))));

        let result = train_step(&mut net, &mut optimizer, &inputs, &actions, &[1e300, 1e300, 1e300, 1e300]);
        assert!(matches!(result, Err(TrainerError::NumericalFailure(_))));

        assert_eq!(net, before);
        assert_eq!(optimizer.step_count(), 0);
    }

    #[test]
    fn test_batch_shape_checked() {
        let net = network(3);
        let (inputs, _, _) = batch();
        assert!(net.loss_and_gradients(&inputs, &[0, 1], &[0.0, 0.0]).is_err());
        assert!(net.loss_and_gradients(&inputs, &[0, 1, 2, 3], &[0.0; 4]).is_err());
    }

    #[test]
    fn test_copy_from() {
        let mut target = network(1);
        let value = network(2);
        target.copy_from(&value);
        assert_eq!(target, value);
    }
}
