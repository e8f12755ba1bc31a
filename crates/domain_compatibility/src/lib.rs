//! Compatibility Domain
//!
//! Decides which features become forbidden once a customer has selected
//! other features or product types.
//!
//! # Architecture
//!
//! - **Value Objects**: IncompatibilityRule, CompatibilityTag, SelectedFeature, SelectedType
//! - **Policy**: CompatibilityPolicy, an immutable index over a rule set
//! - **Domain Services**: SelectionValidator
//! - **Ports**: RuleStore
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_compatibility::{IncompatibilityRule, SelectionValidator, SelectedFeature};
//!
//! let rules = vec![IncompatibilityRule::by_tag("metal-only".parse()?, glass_finish)?];
//! let result = SelectionValidator::new().validate(&features, &types, &rules);
//! if !result.is_valid() {
//!     println!("{}", result.message().unwrap_or_default());
//! }
//! ```

pub mod tag;
pub mod selection;
pub mod rule;
pub mod policy;
pub mod validator;
pub mod ports;
pub mod error;

pub use tag::CompatibilityTag;
pub use selection::{Selectable, SelectedFeature, SelectedType};
pub use rule::IncompatibilityRule;
pub use policy::CompatibilityPolicy;
pub use validator::{SelectionValidator, ValidationResult};
pub use ports::{RuleRecord, RuleStore, RULE_ENTITY};
pub use error::CompatibilityError;
