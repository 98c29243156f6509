// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only interface to the external document store holding unit
//! projections, plus an in-memory implementation used throughout the tests.
//!
//! The rule-inheritance resolver never writes to the store; the store
//! remains the single source of truth for units, while graphs and rule sets
//! are rebuilt fresh per request.

mod memory_store;
mod traits;

pub use memory_store::MemoryStore;
pub use traits::{StoreError, UnitStore};
