// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture helpers shared by the resolver tests.

use fonds_core::{RuleDeclaration, RuleId, UnitProjection};
use fonds_store::MemoryStore;

/// Forward `tracing` output from tests to the terminal when `RUST_LOG` is
/// set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Declaration of a single rule.
pub fn rule(rule_id: &str) -> RuleDeclaration {
    RuleDeclaration::new(rule_id)
}

/// Declaration of a rule which also excludes another rule id.
pub fn rule_with_exclusion(rule_id: &str, excluded: &str) -> RuleDeclaration {
    RuleDeclaration {
        ref_non_rule_id: vec![RuleId::from(excluded)],
        ..RuleDeclaration::new(rule_id)
    }
}

/// Pure exclusion directive: removes the listed rule ids from inheritance
/// without declaring anything.
pub fn exclude(excluded: &[&str]) -> RuleDeclaration {
    RuleDeclaration {
        ref_non_rule_id: excluded.iter().map(|id| RuleId::from(*id)).collect(),
        ..Default::default()
    }
}

/// Category-level kill switch: blocks the whole category from being
/// inherited past the declaring unit.
pub fn block_category() -> RuleDeclaration {
    RuleDeclaration {
        prevent_inheritance: Some(true),
        ..Default::default()
    }
}

/// Memory store holding the given units.
pub fn store_with(units: &[UnitProjection]) -> MemoryStore {
    units.iter().cloned().collect()
}
