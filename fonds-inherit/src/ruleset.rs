// SPDX-License-Identifier: MIT OR Apache-2.0

//! The effective rule set a unit inherits, with provenance.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use fonds_core::{RuleCategory, RuleDeclaration, RuleId, UnitId};
use serde::{Deserialize, Serialize};

pub(crate) type OriginMap = BTreeMap<UnitId, RuleOrigin>;
pub(crate) type CategoryMap = BTreeMap<RuleId, OriginMap>;

/// One ancestor's contribution of a rule to a descendant's effective set.
///
/// `paths` records every distinct lineage (root first, the descendant last)
/// through which this origin's declaration reached the unit. Convergent
/// paths extend `paths`; they never create a second entry for the same
/// origin. Directive fields of the original declaration are deliberately not
/// carried here: a directive acts only at its declaring unit and must not
/// propagate further.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleOrigin {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_date: Option<String>,

    pub paths: BTreeSet<Vec<UnitId>>,

    /// Units which locally redeclared this rule. A marked entry is dropped
    /// when the owning unit's set is finalized; the marks exist so sibling
    /// merge passes drop the entry no matter which parent contributed it.
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub overridden_by: BTreeSet<UnitId>,
}

impl RuleOrigin {
    /// Entry for a rule declared locally by `unit_id` itself.
    pub fn declared_by(unit_id: &UnitId, declaration: &RuleDeclaration) -> Self {
        Self {
            start_date: declaration.start_date.clone(),
            end_date: declaration.end_date.clone(),
            paths: BTreeSet::from([vec![unit_id.clone()]]),
            overridden_by: BTreeSet::new(),
        }
    }
}

/// Complete effective rule set of one unit: `category -> rule -> origin`.
///
/// Built from ordered maps end to end so two computations over identical
/// inputs serialize byte-identically.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InheritedRuleSet(pub(crate) BTreeMap<RuleCategory, CategoryMap>);

impl InheritedRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = RuleCategory> + '_ {
        self.0.keys().copied()
    }

    pub fn rules(&self, category: RuleCategory) -> Option<&CategoryMap> {
        self.0.get(&category)
    }

    pub fn origins(&self, category: RuleCategory, rule: &RuleId) -> Option<&OriginMap> {
        self.0.get(&category).and_then(|rules| rules.get(rule))
    }

    pub fn origin(
        &self,
        category: RuleCategory,
        rule: &RuleId,
        origin: &UnitId,
    ) -> Option<&RuleOrigin> {
        self.origins(category, rule)
            .and_then(|origins| origins.get(origin))
    }

    pub fn contains_rule(&self, category: RuleCategory, rule: &RuleId) -> bool {
        self.origins(category, rule).is_some()
    }

    /// Insert an origin entry, unioning paths and override marks when the
    /// `(category, rule, origin)` triple already exists. The triple is never
    /// duplicated.
    pub fn insert(
        &mut self,
        category: RuleCategory,
        rule: RuleId,
        origin: UnitId,
        entry: RuleOrigin,
    ) {
        match self
            .0
            .entry(category)
            .or_default()
            .entry(rule)
            .or_default()
            .entry(origin)
        {
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                existing.paths.extend(entry.paths);
                existing.overridden_by.extend(entry.overridden_by);
            }
        }
    }

    pub(crate) fn iter_entries(
        &self,
    ) -> impl Iterator<Item = (RuleCategory, &RuleId, &UnitId, &RuleOrigin)> {
        self.0.iter().flat_map(|(category, rules)| {
            rules.iter().flat_map(move |(rule, origins)| {
                origins
                    .iter()
                    .map(move |(origin, entry)| (*category, rule, origin, entry))
            })
        })
    }
}
