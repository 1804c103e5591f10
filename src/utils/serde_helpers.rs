//! Helpers de deserialización

use serde::{Deserialize, Deserializer};

/// Distingue un campo ausente (`None`) de un `null` explícito (`Some(None)`).
///
/// Se usa con `#[serde(default, deserialize_with = "double_option")]` en los
/// updates parciales donde `null` significa "quitar la asignación".
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
