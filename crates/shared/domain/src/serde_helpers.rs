//! Serde helpers for tolerant row decoding.

use serde::{Deserialize, Deserializer};

/// Decode `null` the same as a missing field.
///
/// Pair with `#[serde(default)]` so both absent and null columns fall back.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
