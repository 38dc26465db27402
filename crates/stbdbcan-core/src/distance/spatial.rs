//! Pairwise spatial distance table between entities.

use std::collections::HashMap;

use crate::error::{InputError, MissingDistance};
use crate::types::EntityId;

/// Symmetric entity-to-entity distance relation.
///
/// Pairs are stored once in canonical `id1 < id2` order. `distance(e, e)` is 0
/// by definition. A pair that was never inserted is unreachable: lookups fail
/// with [`MissingDistance`] instead of defaulting to 0.
///
/// # Example
///
/// ```
/// use stbdbcan_core::distance::SpatialDistanceTable;
/// use stbdbcan_core::types::EntityId;
///
/// let mut table = SpatialDistanceTable::new();
/// table.insert(EntityId::from(3), EntityId::from(5), 120.0).unwrap();
///
/// assert_eq!(table.lookup(&EntityId::from(5), &EntityId::from(3)), Ok(120.0));
/// assert_eq!(table.lookup(&EntityId::from(7), &EntityId::from(7)), Ok(0.0));
/// assert!(table.lookup(&EntityId::from(3), &EntityId::from(7)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpatialDistanceTable {
    pairs: HashMap<(EntityId, EntityId), f64>,
}

impl SpatialDistanceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the distance of a canonical pair.
    ///
    /// # Errors
    ///
    /// - `InputError::PairOrder` unless `id1 < id2`
    /// - `InputError::InvalidDistance` if `distance` is negative or not finite
    /// - `InputError::DuplicatePair` if the pair was already inserted
    pub fn insert(&mut self, id1: EntityId, id2: EntityId, distance: f64) -> Result<(), InputError> {
        if id1 >= id2 {
            return Err(InputError::PairOrder { id1, id2 });
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(InputError::InvalidDistance {
                id1,
                id2,
                value: distance,
            });
        }

        let key = (id1, id2);
        if self.pairs.contains_key(&key) {
            let (id1, id2) = key;
            return Err(InputError::DuplicatePair { id1, id2 });
        }
        self.pairs.insert(key, distance);
        Ok(())
    }

    /// Distance between two entities in either argument order.
    ///
    /// # Errors
    ///
    /// - [`MissingDistance`] if the canonical pair is absent
    pub fn lookup(&self, a: &EntityId, b: &EntityId) -> Result<f64, MissingDistance> {
        if a == b {
            return Ok(0.0);
        }
        let (id1, id2) = EntityId::canonical_pair(a, b);
        match self.pairs.get(&(id1.clone(), id2.clone())) {
            Some(&d) => Ok(d),
            None => Err(MissingDistance { id1, id2 }),
        }
    }

    /// Number of stored pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no pair is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> EntityId {
        EntityId::from(n)
    }

    #[test]
    fn test_insert_requires_canonical_order() {
        let mut table = SpatialDistanceTable::new();
        let err = table.insert(id(7), id(3), 1.0).unwrap_err();
        assert!(matches!(err, InputError::PairOrder { .. }));

        let err = table.insert(id(3), id(3), 0.0).unwrap_err();
        assert!(matches!(err, InputError::PairOrder { .. }));
        assert!(table.is_empty());

        println!("[PASS] test_insert_requires_canonical_order");
    }

    #[test]
    fn test_insert_rejects_invalid_distances_and_duplicates() {
        let mut table = SpatialDistanceTable::new();
        assert!(matches!(
            table.insert(id(1), id(2), -1.0),
            Err(InputError::InvalidDistance { .. })
        ));
        assert!(matches!(
            table.insert(id(1), id(2), f64::NAN),
            Err(InputError::InvalidDistance { .. })
        ));

        table.insert(id(1), id(2), 5.0).unwrap();
        assert!(matches!(
            table.insert(id(1), id(2), 6.0),
            Err(InputError::DuplicatePair { .. })
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_is_symmetric_and_missing_is_explicit() {
        let mut table = SpatialDistanceTable::new();
        table.insert(id(3), id(5), 2.5).unwrap();

        assert_eq!(table.lookup(&id(3), &id(5)), Ok(2.5));
        assert_eq!(table.lookup(&id(5), &id(3)), Ok(2.5));
        assert_eq!(table.lookup(&id(9), &id(9)), Ok(0.0));

        let missing = table.lookup(&id(7), &id(3)).unwrap_err();
        assert_eq!(missing.id1, id(3));
        assert_eq!(missing.id2, id(7));
    }
}
