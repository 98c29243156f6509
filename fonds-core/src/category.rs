// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed allowlist of supported rule categories.
///
/// The list is shared with the upstream validation layer: a management
/// declaration outside of these categories never reaches the resolver.
/// Variants are ordered so category maps serialize deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    #[serde(rename = "StorageRule")]
    Storage,
    #[serde(rename = "AppraisalRule")]
    Appraisal,
    #[serde(rename = "AccessRule")]
    Access,
    #[serde(rename = "DisseminationRule")]
    Dissemination,
    #[serde(rename = "ReuseRule")]
    Reuse,
    #[serde(rename = "ClassificationRule")]
    Classification,
    #[serde(rename = "HoldRule")]
    Hold,
}

impl RuleCategory {
    /// Every supported category, in serialization order.
    pub const fn all() -> [RuleCategory; 7] {
        [
            RuleCategory::Storage,
            RuleCategory::Appraisal,
            RuleCategory::Access,
            RuleCategory::Dissemination,
            RuleCategory::Reuse,
            RuleCategory::Classification,
            RuleCategory::Hold,
        ]
    }

    /// External wire name of the category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Storage => "StorageRule",
            RuleCategory::Appraisal => "AppraisalRule",
            RuleCategory::Access => "AccessRule",
            RuleCategory::Dissemination => "DisseminationRule",
            RuleCategory::Reuse => "ReuseRule",
            RuleCategory::Classification => "ClassificationRule",
            RuleCategory::Hold => "HoldRule",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CategoryError {
    #[error("'{0}' is not a supported rule category")]
    Unsupported(String),
}

impl FromStr for RuleCategory {
    type Err = CategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RuleCategory::all()
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| CategoryError::Unsupported(value.to_string()))
    }
}
