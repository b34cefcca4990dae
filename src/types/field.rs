//! Tri-state record fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record field that distinguishes "not set" from "explicitly null".
///
/// Pair with `#[serde(default, skip_serializing_if = "Field::is_unset")]`:
/// a missing key deserializes to [`Field::Unset`] and is omitted again on
/// serialization, while `null` round-trips as [`Field::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// The key is absent; leave the remote value untouched.
    Unset,
    /// The key is present with value `null`; clear the remote value.
    Null,
    /// The key holds a value.
    Value(T),
}

impl<T> Field<T> {
    /// Returns true if the field is [`Field::Unset`].
    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    /// Returns true if the field is [`Field::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns the value, if there is one.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into an `Option`, folding `Unset` and `Null` into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Unset | Field::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Field::Null, Field::Value))
    }
}
