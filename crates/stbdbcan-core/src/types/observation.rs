//! Observations and the dataset that owns them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::InputError;

use super::entity::EntityId;

/// One data row: an entity, a timestamp and a behavioral vector.
///
/// Immutable once pushed into a [`Dataset`]. The entity is stored as an index
/// into [`Dataset::entities`].
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    row: usize,
    entity: usize,
    timestamp: DateTime<Utc>,
    behavior: Vec<f64>,
}

impl Observation {
    /// Zero-based row of this observation in the source data.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Index of the owning entity in [`Dataset::entities`].
    #[inline]
    pub fn entity(&self) -> usize {
        self.entity
    }

    /// Observation instant.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Behavioral vector, ordered like [`Dataset::attributes`].
    #[inline]
    pub fn behavior(&self) -> &[f64] {
        &self.behavior
    }
}

/// Ordered set of observations sharing one behavioral schema.
///
/// Observations are addressed by their zero-based position for the duration
/// of a run.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stbdbcan_core::types::{Dataset, EntityId};
///
/// let mut data = Dataset::new(vec!["flow".to_string(), "speed".to_string()]);
/// let t = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
/// data.push(EntityId::from(1), t, vec![120.0, 55.0]).unwrap();
/// data.push(EntityId::from(2), t, vec![80.0, 61.0]).unwrap();
///
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.dimension(), 2);
/// assert_eq!(data.entities().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    attributes: Vec<String>,
    entities: Vec<EntityId>,
    entity_lookup: HashMap<EntityId, usize>,
    observations: Vec<Observation>,
}

impl Dataset {
    /// Create an empty dataset with the given behavioral attribute names.
    pub fn new(attributes: Vec<String>) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    /// Append an observation; its row number is its insertion position.
    ///
    /// # Errors
    ///
    /// - `InputError::DimensionMismatch` if `behavior.len() != dimension()`
    pub fn push(
        &mut self,
        entity: EntityId,
        timestamp: DateTime<Utc>,
        behavior: Vec<f64>,
    ) -> Result<usize, InputError> {
        if behavior.len() != self.attributes.len() {
            return Err(InputError::DimensionMismatch {
                expected: self.attributes.len(),
                actual: behavior.len(),
            });
        }

        let entity = self.intern(entity);
        let index = self.observations.len();
        self.observations.push(Observation {
            row: index,
            entity,
            timestamp,
            behavior,
        });
        Ok(index)
    }

    fn intern(&mut self, entity: EntityId) -> usize {
        if let Some(&idx) = self.entity_lookup.get(&entity) {
            return idx;
        }
        let idx = self.entities.len();
        self.entities.push(entity.clone());
        self.entity_lookup.insert(entity, idx);
        idx
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// True when there are no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Behavioral dimensionality D.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.attributes.len()
    }

    /// Behavioral attribute names.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Distinct entities, in first-seen order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// All observations in index order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observation at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> &Observation {
        &self.observations[index]
    }

    /// Entity id of the observation at `index`.
    #[inline]
    pub fn entity_of(&self, index: usize) -> &EntityId {
        &self.entities[self.observations[index].entity]
    }

    /// Keep only the observations of `entity`, ordered by timestamp.
    ///
    /// The sort is stable, so observations sharing a timestamp keep their
    /// input order. Row numbers are preserved.
    ///
    /// # Errors
    ///
    /// - `InputError::UnknownEntity` if `entity` owns no observation
    pub fn filter_entity(&self, entity: &EntityId) -> Result<Dataset, InputError> {
        let Some(&source) = self.entity_lookup.get(entity) else {
            return Err(InputError::UnknownEntity {
                entity: entity.clone(),
            });
        };

        let mut observations: Vec<Observation> = self
            .observations
            .iter()
            .filter(|obs| obs.entity == source)
            .map(|obs| Observation {
                entity: 0,
                ..obs.clone()
            })
            .collect();
        observations.sort_by_key(|obs| obs.timestamp);

        let mut entity_lookup = HashMap::with_capacity(1);
        entity_lookup.insert(entity.clone(), 0);

        Ok(Dataset {
            attributes: self.attributes.clone(),
            entities: vec![entity.clone()],
            entity_lookup,
            observations,
        })
    }

    /// Min-max scale every behavioral attribute to `[0, 1]`.
    ///
    /// A constant attribute scales to 0 for every observation.
    pub fn normalized(&self) -> Dataset {
        let d = self.dimension();
        let mut mins = vec![f64::INFINITY; d];
        let mut maxs = vec![f64::NEG_INFINITY; d];

        for obs in &self.observations {
            for (i, &v) in obs.behavior.iter().enumerate() {
                mins[i] = mins[i].min(v);
                maxs[i] = maxs[i].max(v);
            }
        }

        let observations = self
            .observations
            .iter()
            .map(|obs| {
                let behavior = obs
                    .behavior
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let span = maxs[i] - mins[i];
                        if span > 0.0 {
                            (v - mins[i]) / span
                        } else {
                            0.0
                        }
                    })
                    .collect();
                Observation {
                    behavior,
                    ..obs.clone()
                }
            })
            .collect();

        Dataset {
            observations,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn sample() -> Dataset {
        let mut data = Dataset::new(vec!["flow".into(), "speed".into()]);
        data.push(EntityId::from(2), t0() + Duration::minutes(10), vec![10.0, 1.0])
            .unwrap();
        data.push(EntityId::from(1), t0(), vec![20.0, 1.0]).unwrap();
        data.push(EntityId::from(2), t0(), vec![30.0, 1.0]).unwrap();
        data.push(EntityId::from(2), t0() + Duration::minutes(5), vec![40.0, 1.0])
            .unwrap();
        data
    }

    #[test]
    fn test_push_rejects_wrong_dimension() {
        let mut data = Dataset::new(vec!["flow".into()]);
        let result = data.push(EntityId::from(1), t0(), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(InputError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(data.is_empty());
    }

    #[test]
    fn test_entities_are_interned_in_first_seen_order() {
        let data = sample();
        assert_eq!(data.entities(), &[EntityId::from(2), EntityId::from(1)]);
        assert_eq!(data.get(0).entity(), data.get(2).entity());
        assert_eq!(data.entity_of(1), &EntityId::from(1));
    }

    #[test]
    fn test_filter_entity_sorts_by_timestamp_and_keeps_rows() {
        let data = sample();
        let filtered = data.filter_entity(&EntityId::from(2)).unwrap();

        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.entities(), &[EntityId::from(2)]);
        let rows: Vec<usize> = filtered.observations().iter().map(|o| o.row()).collect();
        assert_eq!(rows, vec![2, 3, 0]);
        assert!(filtered.observations().iter().all(|o| o.entity() == 0));

        println!("[PASS] test_filter_entity_sorts_by_timestamp_and_keeps_rows - rows={:?}", rows);
    }

    #[test]
    fn test_filter_unknown_entity_fails() {
        let data = sample();
        let err = data.filter_entity(&EntityId::from(99)).unwrap_err();
        assert!(matches!(err, InputError::UnknownEntity { .. }));
    }

    #[test]
    fn test_normalized_scales_to_unit_interval() {
        let data = sample().normalized();
        let flows: Vec<f64> = data.observations().iter().map(|o| o.behavior()[0]).collect();
        assert_eq!(flows, vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);

        // Constant column collapses to zero
        assert!(data.observations().iter().all(|o| o.behavior()[1] == 0.0));
    }
}
