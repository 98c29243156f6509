// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::RuleCategory;
use crate::identifiers::RuleId;
use crate::serde_util::one_or_many;

/// One locally declared rule or directive inside a management category.
///
/// A declaration carries a rule identifier, a directive, or both:
///
/// - `rule_id` declares the rule on the unit itself.
/// - `prevent_inheritance: true` without a `rule_id` blocks the whole
///   category from being inherited past the declaring unit.
/// - `ref_non_rule_id` excludes the listed rule identifiers from
///   inheritance at the declaring unit.
///
/// Shape validation beyond upstream schema checks happens in the merge
/// engine, which rejects declarations that say nothing at all or that
/// attach the category kill switch to a single rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuleDeclaration {
    #[serde(rename = "Rule", skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_inheritance: Option<bool>,

    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ref_non_rule_id: Vec<RuleId>,
}

impl RuleDeclaration {
    pub fn new(rule_id: impl Into<RuleId>) -> Self {
        Self {
            rule_id: Some(rule_id.into()),
            ..Default::default()
        }
    }

    pub fn prevents_inheritance(&self) -> bool {
        self.prevent_inheritance.unwrap_or(false)
    }

    /// `true` when this declaration is the category-level kill switch: it
    /// blocks inheritance for the whole category and names no rule.
    pub fn is_category_block(&self) -> bool {
        self.rule_id.is_none() && self.prevents_inheritance()
    }
}

/// A unit's management declarations, grouped by rule category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Management(BTreeMap<RuleCategory, Vec<RuleDeclaration>>);

impl Management {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declarations for one category; empty when the unit declares nothing
    /// in it.
    pub fn declarations(&self, category: RuleCategory) -> &[RuleDeclaration] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn declares(&self, category: RuleCategory) -> bool {
        self.0.contains_key(&category)
    }

    pub fn insert(&mut self, category: RuleCategory, declaration: RuleDeclaration) {
        self.0.entry(category).or_default().push(declaration);
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleCategory, &[RuleDeclaration])> {
        self.0
            .iter()
            .map(|(category, declarations)| (*category, declarations.as_slice()))
    }
}
