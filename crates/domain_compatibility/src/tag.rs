//! Compatibility tags
//!
//! A tag is a shared label such as `metal-only` that lets one rule cover every
//! feature or type carrying it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CompatibilityError;

/// Trimmed, lower-cased label of 1 to 64 characters from `[a-z0-9-_:.]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompatibilityTag(String);

impl CompatibilityTag {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl AsRef<str>) -> Result<Self, CompatibilityError> {
        let raw = value.as_ref();
        let normalized = raw.trim().to_lowercase();
        let invalid = |reason: &str| CompatibilityError::InvalidTag {
            tag: raw.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("tag is empty"));
        }
        if normalized.chars().count() > Self::MAX_LEN {
            return Err(invalid("tag is longer than 64 characters"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | ':' | '.'))
        {
            return Err(invalid("only a-z, 0-9 and - _ : . are allowed"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompatibilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CompatibilityTag {
    type Err = CompatibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompatibilityTag::new(s)
    }
}

impl TryFrom<String> for CompatibilityTag {
    type Error = CompatibilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CompatibilityTag::new(value)
    }
}

impl From<CompatibilityTag> for String {
    fn from(tag: CompatibilityTag) -> Self {
        tag.0
    }
}
