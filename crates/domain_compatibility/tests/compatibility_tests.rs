//! Compatibility Engine Tests
//!
//! # Test Organization
//!
//! - `rules` - rule construction and triggering
//! - `policy` - indexed queries over features and types
//! - `validation` - selection validation outcomes
//! - `properties` - the indexed query agrees with a full rule scan

use std::collections::HashSet;

use core_kernel::ItemId;
use domain_compatibility::{
    CompatibilityError, CompatibilityPolicy, CompatibilityTag, IncompatibilityRule,
    SelectedFeature, SelectedType, SelectionValidator, ValidationResult,
};

fn tag(s: &str) -> CompatibilityTag {
    CompatibilityTag::new(s).expect("valid tag")
}

mod rules {
    use super::*;

    #[test]
    fn test_both_triggers_missing_is_rejected() {
        let forbidden = ItemId::new();
        assert_eq!(
            IncompatibilityRule::new(None, None, forbidden),
            Err(CompatibilityError::MissingTrigger {
                forbidden_id: forbidden
            })
        );
    }

    #[test]
    fn test_tag_and_id_trigger_together() {
        let rule = IncompatibilityRule::new(Some(ItemId::new()), Some(tag("metal-only")), ItemId::new());
        assert!(rule.is_ok());
    }

    #[test]
    fn test_rule_survives_json() {
        let rule = IncompatibilityRule::by_tag(tag("eco"), ItemId::new()).unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let back: IncompatibilityRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}

mod policy {
    use super::*;

    #[test]
    fn test_tag_triggered_rule_applies_to_every_tagged_feature() {
        let f1 = ItemId::new();
        let f2 = ItemId::new();
        let f9 = ItemId::new();
        let rules = vec![IncompatibilityRule::by_tag(tag("metal-only"), f9).unwrap()];
        let policy = CompatibilityPolicy::from_rules(&rules);

        for selected in [f1, f2] {
            let features = [SelectedFeature::new(selected, [tag("metal-only")])];
            let forbidden = policy.incompatible_with::<_, SelectedType>(&features, &[]);
            assert_eq!(forbidden, HashSet::from([f9]));
        }
    }

    #[test]
    fn test_query_is_order_independent() {
        let ids: Vec<ItemId> = (0..6).map(|_| ItemId::new()).collect();
        let rules = vec![
            IncompatibilityRule::by_id(ids[0], ids[3]).unwrap(),
            IncompatibilityRule::by_id(ids[1], ids[4]).unwrap(),
            IncompatibilityRule::by_tag(tag("heavy"), ids[5]).unwrap(),
        ];
        let policy = CompatibilityPolicy::from_rules(&rules);

        let forward = vec![
            SelectedFeature::untagged(ids[0]),
            SelectedFeature::new(ids[1], [tag("heavy")]),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = policy.incompatible_with::<_, SelectedType>(&forward, &[]);
        let b = policy.incompatible_with::<_, SelectedType>(&backward, &[]);
        let again = policy.incompatible_with::<_, SelectedType>(&forward, &[]);
        assert_eq!(a, b);
        assert_eq!(a, again);
        assert_eq!(a, HashSet::from([ids[3], ids[4], ids[5]]));
    }

    #[test]
    fn test_selected_type_forbids_feature() {
        let frame = ItemId::new();
        let glass = ItemId::new();
        let rules = [IncompatibilityRule::by_id(frame, glass).unwrap()];
        let policy = CompatibilityPolicy::from_rules(&rules);

        let types = [SelectedType::untagged(frame)];
        let forbidden = policy.incompatible_with::<SelectedFeature, _>(&[], &types);
        assert!(forbidden.contains(&glass));
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_type_makes_selected_feature_invalid() {
        let outdoor = ItemId::new();
        let paper_shade = ItemId::new();
        let other = ItemId::new();
        let rules = vec![IncompatibilityRule::by_tag(tag("outdoor"), paper_shade).unwrap()];

        let features = vec![
            SelectedFeature::untagged(paper_shade),
            SelectedFeature::untagged(other),
        ];
        let types = vec![SelectedType::new(outdoor, [tag("outdoor")])];

        let result = SelectionValidator::new().validate(&features, &types, &rules);
        match &result {
            ValidationResult::Invalid { violations, message } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].id, paper_shade);
                assert!(message.contains(&paper_shade.to_string()));
            }
            ValidationResult::Valid => panic!("expected the paper shade to be rejected"),
        }
    }

    #[test]
    fn test_forbidden_but_unselected_feature_is_fine() {
        let a = ItemId::new();
        let rules = vec![IncompatibilityRule::by_id(a, ItemId::new()).unwrap()];
        let result = SelectionValidator::new().validate(&[SelectedFeature::untagged(a)], &[], &rules);
        assert_eq!(result, ValidationResult::Valid);
    }

    #[test]
    fn test_prebuilt_policy_gives_same_answer() {
        let a = ItemId::new();
        let b = ItemId::new();
        let rules = vec![IncompatibilityRule::by_id(a, b).unwrap()];
        let features = vec![SelectedFeature::untagged(a), SelectedFeature::untagged(b)];

        let validator = SelectionValidator::new();
        let policy = CompatibilityPolicy::from_rules(&rules);
        assert_eq!(
            validator.validate(&features, &[], &rules),
            validator.validate_with_policy(&policy, &features, &[])
        );
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::tag_strategy;

    proptest! {
        #[test]
        fn index_matches_full_scan(
            rule_specs in prop::collection::vec((prop::option::of(0usize..8), prop::option::of(tag_strategy()), 0usize..8), 0..20),
            selection in prop::collection::vec((0usize..8, prop::collection::vec(tag_strategy(), 0..3)), 0..6),
        ) {
            let ids: Vec<ItemId> = (0..8).map(|_| ItemId::new()).collect();
            let rules: Vec<IncompatibilityRule> = rule_specs
                .into_iter()
                .filter_map(|(trigger, t, forbidden)| {
                    IncompatibilityRule::new(trigger.map(|i| ids[i]), t, ids[forbidden]).ok()
                })
                .collect();
            let features: Vec<SelectedFeature> = selection
                .iter()
                .map(|(i, tags)| SelectedFeature::new(ids[*i], tags.iter().cloned()))
                .collect();

            let policy = CompatibilityPolicy::from_rules(&rules);
            let indexed = policy.incompatible_with::<_, SelectedType>(&features, &[]);

            let selected_ids: HashSet<ItemId> = features.iter().map(|f| f.id).collect();
            let selected_tags: HashSet<CompatibilityTag> =
                features.iter().flat_map(|f| f.tags.iter().cloned()).collect();
            let scanned: HashSet<ItemId> = rules
                .iter()
                .filter(|r| r.is_triggered_by(&selected_ids, &selected_tags))
                .map(|r| r.forbidden_id())
                .collect();

            prop_assert_eq!(indexed, scanned);
        }
    }
}
