// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure rule-set merge engine.
//!
//! A unit's effective set is computed in two phases. Phase one takes the raw
//! union of every parent's already-finalized set, with the unit appended to
//! each path ([`inherit`] folded by [`concat_rule`]). Phase two interprets
//! the unit's own declarations exactly once over the merged whole
//! ([`apply_local`], then [`finalize`]). Because the union is plain and all
//! directive handling is deferred to the second phase, the parent reduction
//! is commutative and associative: any parent permutation yields the same
//! set.

use fonds_core::{RuleDeclaration, UnitId, UnitProjection};

use crate::error::ComputeError;
use crate::ruleset::{InheritedRuleSet, RuleOrigin};

/// Compute the effective rule set of a root unit.
pub fn seed(unit: &UnitProjection) -> Result<InheritedRuleSet, ComputeError> {
    let set = apply_local(InheritedRuleSet::new(), unit)?;
    Ok(finalize(set, &unit.id))
}

/// Compute a unit's effective rule set from one parent's set.
///
/// Convenience for the single-parent case; multi-parent units go through
/// [`resolve`].
pub fn propagate(
    parent_set: &InheritedRuleSet,
    unit: &UnitProjection,
) -> Result<InheritedRuleSet, ComputeError> {
    resolve(unit, [parent_set])
}

/// Compute a unit's effective rule set from all of its parents' sets.
pub fn resolve<'a>(
    unit: &UnitProjection,
    parent_sets: impl IntoIterator<Item = &'a InheritedRuleSet>,
) -> Result<InheritedRuleSet, ComputeError> {
    let mut merged = InheritedRuleSet::new();
    for parent_set in parent_sets {
        merged = concat_rule(merged, inherit(parent_set, &unit.id));
    }
    let set = apply_local(merged, unit)?;
    Ok(finalize(set, &unit.id))
}

/// Carry one parent's entries forward to `unit_id`: every entry is copied
/// unchanged except that `unit_id` is appended to each of its paths.
///
/// No directive is interpreted here. Directive fields were already stripped
/// when the origin entry was built, so nothing a parent declared can act
/// again below its own unit.
pub fn inherit(parent_set: &InheritedRuleSet, unit_id: &UnitId) -> InheritedRuleSet {
    let mut next = InheritedRuleSet::new();
    for (category, rule, origin, entry) in parent_set.iter_entries() {
        let mut entry = entry.clone();
        entry.paths = entry
            .paths
            .into_iter()
            .map(|mut path| {
                path.push(unit_id.clone());
                path
            })
            .collect();
        next.insert(category, rule.clone(), origin.clone(), entry);
    }
    next
}

/// Union two provisional sets.
///
/// Origins are unioned per `(category, rule)`; when the same origin appears
/// on both sides its path lists and override marks are unioned, never
/// duplicated. The operation is commutative and associative with the empty
/// set as identity, so folding any permutation of parents produces the same
/// accumulator.
pub fn concat_rule(acc: InheritedRuleSet, incoming: InheritedRuleSet) -> InheritedRuleSet {
    let mut acc = acc;
    for (category, rules) in incoming.0 {
        for (rule, origins) in rules {
            for (origin, entry) in origins {
                acc.insert(category, rule.clone(), origin, entry);
            }
        }
    }
    acc
}

/// Interpret the unit's own declarations over the merged parent union.
///
/// Per declared category: the category kill switch clears all inherited
/// entries first; then local redeclarations mark the inherited origins of
/// the same rule as overridden; then explicit exclusions remove the rules
/// they name (a rule never excludes itself); finally the unit's own rules
/// are inserted with the unit as origin.
pub fn apply_local(
    merged: InheritedRuleSet,
    unit: &UnitProjection,
) -> Result<InheritedRuleSet, ComputeError> {
    let mut set = merged;

    for (category, declarations) in unit.management.iter() {
        for declaration in declarations {
            validate_declaration(&unit.id, declaration)?;
        }

        // Category kill switch: a bare `PreventInheritance` clears the whole
        // inherited map before local rules are applied.
        if declarations.iter().any(RuleDeclaration::is_category_block) {
            set.0.remove(&category);
        }

        // Local redeclaration of an inherited rule id overrides it: the
        // foreign origins are marked and dropped at finalization.
        for declaration in declarations {
            if let Some(rule_id) = &declaration.rule_id
                && let Some(origins) = set
                    .0
                    .get_mut(&category)
                    .and_then(|rules| rules.get_mut(rule_id))
            {
                for (origin, entry) in origins.iter_mut() {
                    if origin != &unit.id {
                        entry.overridden_by.insert(unit.id.clone());
                    }
                }
            }
        }

        // Explicit exclusions. Referencing the declaration's own rule id is
        // a no-op; any other referenced id is removed outright, which also
        // stops descendants from re-inheriting it.
        for declaration in declarations {
            for excluded in &declaration.ref_non_rule_id {
                if declaration.rule_id.as_ref() == Some(excluded) {
                    continue;
                }
                if let Some(rules) = set.0.get_mut(&category) {
                    rules.remove(excluded);
                }
            }
        }

        // The unit's own rules, origin = the unit itself.
        for declaration in declarations {
            if let Some(rule_id) = &declaration.rule_id {
                set.insert(
                    category,
                    rule_id.clone(),
                    unit.id.clone(),
                    RuleOrigin::declared_by(&unit.id, declaration),
                );
            }
        }
    }

    Ok(set)
}

/// Resolve all override marks at once and prune empty maps.
///
/// Marked entries are dropped unless they originate from `unit_id` itself:
/// a unit's own contribution is never self-overridden, its marks are
/// stripped instead. Running the deletions once here, after the full parent
/// union, is what keeps the reduction order-independent.
pub fn finalize(set: InheritedRuleSet, unit_id: &UnitId) -> InheritedRuleSet {
    let mut next = InheritedRuleSet::new();
    for (category, rules) in set.0 {
        for (rule, origins) in rules {
            for (origin, mut entry) in origins {
                if origin == *unit_id {
                    entry.overridden_by.clear();
                } else if !entry.overridden_by.is_empty() {
                    continue;
                }
                next.insert(category, rule.clone(), origin, entry);
            }
        }
    }
    next
}

fn validate_declaration(
    unit: &UnitId,
    declaration: &RuleDeclaration,
) -> Result<(), ComputeError> {
    if declaration.rule_id.is_none()
        && !declaration.prevents_inheritance()
        && declaration.ref_non_rule_id.is_empty()
    {
        return Err(ComputeError::MalformedDeclaration {
            unit: unit.clone(),
            reason: "declaration carries neither a rule id nor a directive".to_string(),
        });
    }

    if declaration.rule_id.is_some() && declaration.prevents_inheritance() {
        return Err(ComputeError::MalformedDeclaration {
            unit: unit.clone(),
            reason: "prevent-inheritance is category-level and cannot name a rule".to_string(),
        });
    }

    Ok(())
}
