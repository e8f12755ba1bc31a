//! Compatibility domain errors

use thiserror::Error;

use core_kernel::ItemId;

/// Errors raised while building rules and tags
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompatibilityError {
    /// A rule names neither a trigger id nor a trigger tag
    #[error("Rule for {forbidden_id} has no trigger")]
    MissingTrigger { forbidden_id: ItemId },

    /// A rule forbids the very item that triggers it
    #[error("Rule would make {0} incompatible with itself")]
    SelfReferential(ItemId),

    /// A tag is empty, too long or uses characters outside the tag alphabet
    #[error("Invalid compatibility tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },
}
