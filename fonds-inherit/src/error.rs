// SPDX-License-Identifier: MIT OR Apache-2.0

use fonds_core::UnitId;
use fonds_store::StoreError;
use thiserror::Error;

/// Faults aborting an inheritance computation.
///
/// No fault ever yields a partial rule set: the computation for the affected
/// request fails as a whole.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// An ancestor id referenced by a unit is absent from the store. The
    /// hierarchy data is inconsistent; aborting beats silently resolving
    /// against a truncated ancestry.
    #[error("ancestor '{ancestor}' referenced by unit '{child}' is missing from the store")]
    MissingAncestor { child: UnitId, ancestor: UnitId },

    /// The ancestry relation loops back on itself.
    #[error("unit hierarchy contains a cycle through '{0}'")]
    CyclicHierarchy(UnitId),

    /// A management declaration violates the upstream contract.
    #[error("malformed rule declaration on unit '{unit}': {reason}")]
    MalformedDeclaration { unit: UnitId, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("inheritance computation exceeded its deadline")]
    DeadlineExceeded,
}

impl ComputeError {
    /// `true` for infrastructure faults the caller may retry; data-integrity
    /// and validation faults are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ComputeError::Store(_) | ComputeError::DeadlineExceeded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_infrastructure_faults_are_retryable() {
        assert!(ComputeError::Store(StoreError::Unavailable("down".to_string())).is_retryable());
        assert!(ComputeError::DeadlineExceeded.is_retryable());

        let fault = ComputeError::MissingAncestor {
            child: UnitId::from("C"),
            ancestor: UnitId::from("R"),
        };
        assert!(!fault.is_retryable());
        assert!(!ComputeError::CyclicHierarchy(UnitId::from("C")).is_retryable());
    }
}
