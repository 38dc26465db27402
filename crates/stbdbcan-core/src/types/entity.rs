//! Entity identifiers.

use std::fmt;

/// Identifier of a spatial actor (e.g. a sensor).
///
/// Ids written in canonical integer form are kept numeric so that `3 < 10`
/// holds; all other ids (including `07` or `+7`) are kept verbatim and compare
/// as strings, so two ids are equal only when their text is. Numeric ids order
/// before named ones. This ordering defines the canonical `id1 < id2` rule of
/// the distance table.
///
/// # Example
///
/// ```
/// use stbdbcan_core::types::EntityId;
///
/// assert!(EntityId::parse("3") < EntityId::parse("10"));
/// assert!(EntityId::parse("A12") < EntityId::parse("B1"));
/// assert!(EntityId::parse("99") < EntityId::parse("A1"));
/// assert_ne!(EntityId::parse("07"), EntityId::parse("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    /// Integer id.
    Numeric(i64),
    /// Free-form id.
    Named(String),
}

impl EntityId {
    /// Parse a raw field. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if n.to_string() == trimmed => EntityId::Numeric(n),
            _ => EntityId::Named(trimmed.to_string()),
        }
    }

    /// Return the pair in canonical (smaller, larger) order.
    pub fn canonical_pair(a: &EntityId, b: &EntityId) -> (EntityId, EntityId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Numeric(n) => write!(f, "{}", n),
            EntityId::Named(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Numeric(n)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        EntityId::parse(raw)
    }
}
