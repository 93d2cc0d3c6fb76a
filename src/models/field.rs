//! Present/absent field wrapper for partial updates.
//!
//! JSON partial updates need three states per field: absent (leave alone),
//! explicitly null (clear), and a value (set). `Option<T>` collapses the
//! first two, so nullable columns use [`Patch<T>`] instead.

use serde::{Deserialize, Deserializer};

/// A field in a partial-update request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not present in the request body.
    #[default]
    Absent,
    /// The field was present, either as null or as a value.
    Value(Option<T>),
}

impl<T> Patch<T> {
    /// Resolve against the current stored value: an absent field keeps
    /// `current`, a present field (including null) replaces it.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Value(v) => v,
        }
    }
}

// Deserializes only present fields; combined with `#[serde(default)]` on the
// struct field, absence falls through to `Patch::Absent`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::Value)
    }
}
