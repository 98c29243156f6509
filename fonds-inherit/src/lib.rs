// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-inheritance resolver for archival units.
//!
//! Archival units form a directed acyclic hierarchy in which a unit may have
//! several parents. Each unit optionally declares management rules grouped
//! by category. This crate computes, for a batch of requested units, the
//! complete effective rule set each one inherits from its ancestors, merged
//! with its own declarations and honouring override, exclusion and
//! category-block directives, while recording the ancestor paths every rule
//! travelled.
//!
//! The computation is rebuilt fresh per request over a private arena graph:
//! no state is shared between requests and nothing is persisted. The merge
//! itself is two-phase and purely functional, which makes the multi-parent
//! reduction commutative and associative: the result never depends on the
//! order in which parents are processed.

mod compute;
mod config;
mod error;
mod graph;
mod merge;
mod response;
mod ruleset;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use compute::compute_inherited_rules;
pub use config::ComputeConfig;
pub use error::ComputeError;
pub use graph::{NodeIdx, UnitGraph, UnitNode, build_closure};
pub use merge::{apply_local, concat_rule, finalize, inherit, propagate, resolve, seed};
pub use response::{INHERITED_RULES_FIELD, attach_inherited_rules};
pub use ruleset::{InheritedRuleSet, RuleOrigin};
