// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Deserializer};

/// Helper method for `serde` to deserialize a field which the external store
/// encodes either as a single value or as a list of values.
///
/// `RefNonRuleId` historically accepted both shapes; the resolver always
/// works with the list form.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => Ok(vec![value]),
        OneOrMany::Many(values) => Ok(values),
    }
}
