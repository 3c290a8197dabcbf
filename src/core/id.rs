//! Normalized entity identifiers.
//!
//! Ids arrive at the form layer from two directions with different types: the
//! backend returns numeric primary keys, while widget values and query strings
//! carry their decimal serialization. Comparing `5` against `"5"` without
//! normalizing is a recurring bug on the association screens, so every id is
//! funneled through [`EntityId`] at the boundary and all set arithmetic
//! downstream operates on the canonical form.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::MAX_CANONICAL_ID_DIGITS;

/// A normalized identifier for a parent record, child record, or dependent option.
///
/// A string in canonical signed-decimal form (optional `-`, digits, no leading
/// zeros, value within `i64` range) is normalized to [`EntityId::Int`] at
/// construction; anything else is kept verbatim as [`EntityId::Text`]. As a
/// result `EntityId::from("5")` and `EntityId::from(5)` are equal and hash
/// identically, while `"05"`, `"5a"`, and the empty string remain distinct
/// text ids.
///
/// Equality, hashing, and ordering all operate on the normalized form, so the
/// type is safe to use directly in `HashSet` and `BTreeSet` membership checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// A numeric key, the common case for relational primary keys.
    Int(i64),
    /// An opaque non-numeric key (codes, ULIDs, composite exports).
    Text(String),
}

impl EntityId {
    /// Normalize an arbitrary string into an id.
    ///
    /// Only the canonical decimal rendering of an integer collapses to
    /// [`EntityId::Int`]; ambiguous forms such as `"05"` do not, because the
    /// backend would never have produced them for a numeric key.
    pub fn parse(raw: &str) -> Self {
        match canonical_int(raw) {
            Some(n) => Self::Int(n),
            None => Self::Text(raw.to_string()),
        }
    }

    /// Whether this id normalized to a numeric key.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

/// Parse `raw` as a canonically-rendered `i64`, rejecting anything
/// `i64::to_string` could not have produced.
fn canonical_int(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || digits.len() > MAX_CANONICAL_ID_DIGITS {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // "0" is canonical, "00" and "-0" are not.
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if digits == "0" && raw.starts_with('-') {
        return None;
    }
    raw.parse().ok()
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an integer or string identifier")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(EntityId::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                match i64::try_from(v) {
                    Ok(n) => Ok(EntityId::Int(n)),
                    Err(_) => Ok(EntityId::Text(v.to_string())),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(EntityId::parse(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}
