// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::category::RuleCategory;
use crate::identifiers::UnitId;
use crate::management::{Management, RuleDeclaration};

/// Minimal read model of an archival unit, as returned by the external
/// document store.
///
/// `denormalized_ancestor_ids` is the transitive ancestor id list maintained
/// by the store. The resolver trusts it as ground truth when expanding the
/// closure instead of recomputing transitivity; it may name ids the direct
/// parent chain alone would only reach after several hops.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProjection {
    pub id: UnitId,

    #[serde(default, skip_serializing_if = "Management::is_empty")]
    pub management: Management,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direct_parent_ids: Vec<UnitId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub denormalized_ancestor_ids: Vec<UnitId>,
}

impl UnitProjection {
    pub fn new(id: impl Into<UnitId>) -> Self {
        Self {
            id: id.into(),
            management: Management::new(),
            direct_parent_ids: Vec::new(),
            denormalized_ancestor_ids: Vec::new(),
        }
    }

    /// Attach a direct parent and fold its ancestry into the denormalized
    /// ancestor list, the way the store maintains it.
    pub fn with_parent(mut self, parent: &UnitProjection) -> Self {
        self.direct_parent_ids.push(parent.id.clone());
        for ancestor in std::iter::once(&parent.id).chain(&parent.denormalized_ancestor_ids) {
            if !self.denormalized_ancestor_ids.contains(ancestor) {
                self.denormalized_ancestor_ids.push(ancestor.clone());
            }
        }
        self
    }

    pub fn with_rule(mut self, category: RuleCategory, declaration: RuleDeclaration) -> Self {
        self.management.insert(category, declaration);
        self
    }

    /// A unit with no parents is a root of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.direct_parent_ids.is_empty()
    }
}
