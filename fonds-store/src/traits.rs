// SPDX-License-Identifier: MIT OR Apache-2.0

use fonds_core::{UnitId, UnitProjection};
use thiserror::Error;

/// Read access to unit projections in the external document store.
pub trait UnitStore {
    /// Fetch the projections for the given ids.
    ///
    /// One call is one page; callers chunk larger id sets themselves. Ids
    /// unknown to the store are simply absent from the returned vector, in
    /// no guaranteed order. It is the caller's decision whether a missing
    /// id is an error.
    async fn units_by_ids(&self, ids: &[UnitId]) -> Result<Vec<UnitProjection>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out. Retryable by the caller.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
