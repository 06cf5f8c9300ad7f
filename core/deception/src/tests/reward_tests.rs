// Path and File Name : /home/decepticloud/core/deception/src/tests/reward_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for the reward policy - full attack/asset table and rule independence

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::asset::ActiveAsset;
    use crate::reward::compute_reward;
    use crate::signals::AttackSignals;

    #[test]
    fn test_reward_table() {
        let cases = [
            // (ssh, web, active, expected)
            (false, false, ActiveAsset::None, 0),
            (false, false, ActiveAsset::Ssh, -1),
            (false, false, ActiveAsset::Web, -1),
            (true, false, ActiveAsset::None, -2),
            (true, false, ActiveAsset::Ssh, 10),
            (true, false, ActiveAsset::Web, -3),
            (false, true, ActiveAsset::None, -2),
            (false, true, ActiveAsset::Ssh, -3),
            (false, true, ActiveAsset::Web, 10),
            (true, true, ActiveAsset::None, -4),
            (true, true, ActiveAsset::Ssh, 8),
            (true, true, ActiveAsset::Web, 8),
        ];

        for (ssh, web, active, expected) in cases {
            assert_eq!(
                compute_reward(AttackSignals::new(ssh, web), active),
                expected,
                "ssh={} web={} active={}",
                ssh,
                web,
                active
            );
        }
    }

    #[test]
    fn test_capture_during_other_attack_is_not_exclusive() {
        assert_eq!(compute_reward(AttackSignals::new(true, true), ActiveAsset::Ssh), 8);
    }

    #[test]
    fn test_wrong_asset_pays_idle_and_miss() {
        assert_eq!(compute_reward(AttackSignals::new(true, false), ActiveAsset::Web), -3);
    }

    fn active_strategy() -> impl Strategy<Value = ActiveAsset> {
        prop_oneof![
            Just(ActiveAsset::None),
            Just(ActiveAsset::Ssh),
            Just(ActiveAsset::Web),
        ]
    }

    proptest! {
        #[test]
        fn prop_reward_bounded(ssh in any::<bool>(), web in any::<bool>(), active in active_strategy()) {
            let reward = compute_reward(AttackSignals::new(ssh, web), active);
            prop_assert!((-4..=10).contains(&reward));
        }

        #[test]
        fn prop_no_attack_no_asset_is_neutral(active in active_strategy()) {
            let reward = compute_reward(AttackSignals::none(), active);
            prop_assert_eq!(reward, if active == ActiveAsset::None { 0 } else { -1 });
        }
    }
}
