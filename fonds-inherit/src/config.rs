// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FETCH_PAGE_SIZE: usize = 100;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Tuning knobs for one inheritance computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Maximum number of unit ids requested from the store in one call.
    pub fetch_page_size: usize,

    /// Maximum number of store calls in flight at once while fetching the
    /// pages of one closure level.
    pub fetch_concurrency: usize,

    /// Overall deadline for the computation, propagated from the caller.
    /// On expiry the request fails outright; a partially merged rule set is
    /// never returned.
    pub deadline: Option<Duration>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: ComputeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ComputeConfig::default());

        let config: ComputeConfig =
            serde_json::from_str(r#"{ "fetch_page_size": 25 }"#).unwrap();
        assert_eq!(config.fetch_page_size, 25);
        assert_eq!(config.fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);
        assert_eq!(config.deadline, None);
    }
}
