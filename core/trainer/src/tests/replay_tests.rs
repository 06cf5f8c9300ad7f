// Path and File Name : /home/decepticloud/core/trainer/src/tests/replay_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for experience replay - capacity bound, FIFO eviction, sampling without replacement

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use decepticloud_deception::{Action, State};

    use crate::replay::{ReplayBuffer, SharedReplayBuffer, Transition};

    fn transition(reward: f64) -> Transition {
        Transition::new(State::initial(), Action::DeploySsh, reward, State::initial(), false)
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = ReplayBuffer::new(3);
        for i in 0..5 {
            buffer.push(transition(i as f64));
        }

        assert_eq!(buffer.len(), 3);
        let rewards: Vec<f64> = buffer.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sample_requires_batch() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut buffer = ReplayBuffer::new(10);
        for i in 0..3 {
            buffer.push(transition(i as f64));
        }

        assert!(buffer.sample(&mut rng, 4).is_none());
        assert!(buffer.sample(&mut rng, 0).is_none());
        assert_eq!(buffer.sample(&mut rng, 3).map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut buffer = ReplayBuffer::new(16);
        for i in 0..16 {
            buffer.push(transition(i as f64));
        }

        let mut rewards: Vec<f64> = buffer.sample(&mut rng, 16).unwrap().iter().map(|t| t.reward).collect();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..16).map(|i| i as f64).collect();
        assert_eq!(rewards, expected);
    }

    #[test]
    fn test_shared_buffer() {
        let shared = SharedReplayBuffer::new(2);
        let clone = shared.clone();
        shared.push(transition(1.0));
        clone.push(transition(2.0));
        clone.push(transition(3.0));

        assert_eq!(shared.len(), 2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut rewards: Vec<f64> = shared.sample(&mut rng, 2).unwrap().iter().map(|t| t.reward).collect();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rewards, vec![2.0, 3.0]);
    }

    proptest! {
        #[test]
        fn prop_len_bounded_by_capacity(capacity in 1usize..64, pushes in 0usize..200) {
            let mut buffer = ReplayBuffer::new(capacity);
            for i in 0..pushes {
                buffer.push(transition(i as f64));
            }
            prop_assert_eq!(buffer.len(), pushes.min(capacity));
            if pushes > 0 {
                let newest = buffer.iter().last().map(|t| t.reward);
                prop_assert_eq!(newest, Some((pushes - 1) as f64));
            }
        }
    }
}
