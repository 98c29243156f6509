// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use fonds_core::{UnitId, UnitProjection};

use crate::traits::{StoreError, UnitStore};

/// In-memory unit store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    units: HashMap<UnitId, UnitProjection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit projection.
    ///
    /// Returns `true` when the insert occurred, or `false` when a unit with
    /// the same id already existed and was replaced.
    pub fn insert_unit(&mut self, unit: UnitProjection) -> bool {
        self.units.insert(unit.id.clone(), unit).is_none()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl UnitStore for MemoryStore {
    async fn units_by_ids(&self, ids: &[UnitId]) -> Result<Vec<UnitProjection>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.units.get(id).cloned())
            .collect())
    }
}

impl FromIterator<UnitProjection> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = UnitProjection>>(units: I) -> Self {
        let mut store = Self::new();
        for unit in units {
            store.insert_unit(unit);
        }
        store
    }
}
