//! Selection validation
//!
//! Checks a customer's selection against the active incompatibility rules and
//! reports which selected features are forbidden by the rest of the
//! selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policy::CompatibilityPolicy;
use crate::rule::IncompatibilityRule;
use crate::selection::{SelectedFeature, SelectedType};

/// Outcome of validating a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid {
        /// Offending features, ordered by id
        violations: Vec<SelectedFeature>,
        message: String,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn violations(&self) -> &[SelectedFeature] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid { violations, .. } => violations,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { message, .. } => Some(message),
        }
    }
}

/// Stateless validator over externally supplied selections and rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionValidator;

impl SelectionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Builds a policy from `rules` and validates the selection against it
    pub fn validate(
        &self,
        features: &[SelectedFeature],
        types: &[SelectedType],
        rules: &[IncompatibilityRule],
    ) -> ValidationResult {
        let policy = CompatibilityPolicy::from_rules(rules);
        self.validate_with_policy(&policy, features, types)
    }

    /// Validates against an already built policy
    pub fn validate_with_policy(
        &self,
        policy: &CompatibilityPolicy,
        features: &[SelectedFeature],
        types: &[SelectedType],
    ) -> ValidationResult {
        let forbidden = policy.incompatible_with(features, types);

        let mut violations: Vec<SelectedFeature> = features
            .iter()
            .filter(|feature| forbidden.contains(&feature.id))
            .cloned()
            .collect();
        if violations.is_empty() {
            return ValidationResult::Valid;
        }

        violations.sort_by_key(|feature| feature.id);
        violations.dedup_by_key(|feature| feature.id);
        let ids: Vec<String> = violations.iter().map(|f| f.id.to_string()).collect();
        debug!(
            violations = violations.len(),
            rules = policy.len(),
            "Selection rejected by compatibility rules"
        );
        ValidationResult::Invalid {
            message: format!("Selection contains incompatible features: {}", ids.join(", ")),
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ItemId;

    #[test]
    fn test_valid_when_nothing_forbidden() {
        let a = ItemId::new();
        let result = SelectionValidator::new().validate(
            &[SelectedFeature::untagged(a)],
            &[],
            &[IncompatibilityRule::by_id(a, ItemId::new()).unwrap()],
        );
        assert!(result.is_valid());
        assert!(result.violations().is_empty());
        assert_eq!(result.message(), None);
    }

    #[test]
    fn test_mutually_exclusive_features_both_reported() {
        let a = ItemId::new();
        let b = ItemId::new();
        let rules = [
            IncompatibilityRule::by_id(a, b).unwrap(),
            IncompatibilityRule::by_id(b, a).unwrap(),
        ];
        let features = [SelectedFeature::untagged(b), SelectedFeature::untagged(a)];

        let result = SelectionValidator::new().validate(&features, &[], &rules);
        let mut expected = vec![a, b];
        expected.sort();
        let reported: Vec<_> = result.violations().iter().map(|f| f.id).collect();
        assert_eq!(reported, expected);

        let message = result.message().unwrap();
        let first = message.find(&expected[0].to_string()).unwrap();
        let second = message.find(&expected[1].to_string()).unwrap();
        assert!(first < second);
    }
}
