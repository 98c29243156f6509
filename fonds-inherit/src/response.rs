// SPDX-License-Identifier: MIT OR Apache-2.0

use serde_json::{Map, Value};

use crate::ruleset::InheritedRuleSet;

/// Field under which a unit's computed rule set is attached to its JSON
/// representation for API callers.
pub const INHERITED_RULES_FIELD: &str = "InheritedRules";

/// Attach a computed rule set to a unit's response representation.
///
/// The response assembler queries units first, computes inheritance over
/// the batch, then decorates each unit object with its set. An existing
/// value under the field is replaced: the computed set is authoritative.
pub fn attach_inherited_rules(
    unit_json: &mut Map<String, Value>,
    set: &InheritedRuleSet,
) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(set)?;
    unit_json.insert(INHERITED_RULES_FIELD.to_string(), value);
    Ok(())
}
