// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared vocabulary types for the fonds archival back-office.
//!
//! A *unit* is one node in the archival hierarchy. Units optionally declare
//! *management declarations*: retention, appraisal and access-style rules
//! grouped by a fixed category allowlist. These types form the read model
//! consumed by the rule-inheritance resolver; they carry no behaviour beyond
//! accessors and (de)serialization.

mod category;
mod identifiers;
mod management;
mod serde_util;
mod unit;

pub use category::{CategoryError, RuleCategory};
pub use identifiers::{RuleId, UnitId};
pub use management::{Management, RuleDeclaration};
pub use unit::UnitProjection;
