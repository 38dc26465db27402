//! Contextual and behavioral metrics with their weights bound.
//!
//! Contextual distance selects neighbors; behavioral distance measures density
//! among them. Both are weighted sums over disjoint attributes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClusterError, MissingDistance};
use crate::types::{Dataset, EntityId, Observation, RunMode};

use super::spatial::SpatialDistanceTable;

/// Seconds per unit of temporal distance (minutes).
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Weight vectors bound for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// One weight per behavioral attribute.
    pub behavioral: Vec<f64>,
    /// Weight of the spatial term.
    pub spatial: f64,
    /// Weight of the temporal term.
    pub temporal: f64,
}

impl Weights {
    /// All weights 1 for a D-dimensional behavioral vector.
    pub fn uniform(dimension: usize) -> Self {
        Self {
            behavioral: vec![1.0; dimension],
            spatial: 1.0,
            temporal: 1.0,
        }
    }

    /// Check that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), ClusterError> {
        let check = |name: &str, w: f64| {
            if !w.is_finite() || w < 0.0 {
                Err(ClusterError::invalid_parameter(format!(
                    "{} weight must be finite and >= 0, got {}",
                    name, w
                )))
            } else {
                Ok(())
            }
        };
        check("spatial", self.spatial)?;
        check("temporal", self.temporal)?;
        for (i, &w) in self.behavioral.iter().enumerate() {
            check(&format!("behavioral[{}]", i), w)?;
        }
        Ok(())
    }
}

/// Distance model over one dataset.
///
/// Entity-to-entity spatial distances are resolved once into a dense matrix
/// indexed like [`Dataset::entities`]; `None` marks an unreachable pair.
#[derive(Debug, Clone)]
pub struct DistanceModel {
    weights: Weights,
    uses_spatial: bool,
    entity_count: usize,
    spatial: Vec<Option<f64>>,
    entity_ids: Vec<EntityId>,
}

impl DistanceModel {
    /// Bind weights and resolve spatial distances for `dataset`.
    ///
    /// # Errors
    ///
    /// - `ClusterError::DimensionMismatch` if there is not one behavioral weight per attribute
    /// - `ClusterError::InvalidParameter` if a weight is negative or not finite
    pub fn new(
        dataset: &Dataset,
        table: &SpatialDistanceTable,
        weights: Weights,
        mode: &RunMode,
    ) -> Result<Self, ClusterError> {
        if weights.behavioral.len() != dataset.dimension() {
            return Err(ClusterError::dimension_mismatch(
                dataset.dimension(),
                weights.behavioral.len(),
            ));
        }
        weights.validate()?;

        let entities = dataset.entities();
        let n = entities.len();
        let mut spatial = vec![None; n * n];
        let mut unreachable = 0usize;

        for i in 0..n {
            spatial[i * n + i] = Some(0.0);
            for j in (i + 1)..n {
                match table.lookup(&entities[i], &entities[j]) {
                    Ok(d) => {
                        spatial[i * n + j] = Some(d);
                        spatial[j * n + i] = Some(d);
                    }
                    Err(missing) => {
                        unreachable += 1;
                        debug!(id1 = %missing.id1, id2 = %missing.id2, "Entity pair unreachable");
                    }
                }
            }
        }

        if mode.uses_spatial() && unreachable > 0 {
            warn!(
                unreachable_pairs = unreachable,
                entities = n,
                "Distance table is missing entity pairs; they are treated as infinitely far apart"
            );
        }

        Ok(Self {
            weights,
            uses_spatial: mode.uses_spatial(),
            entity_count: n,
            spatial,
            entity_ids: entities.to_vec(),
        })
    }

    /// Weights bound to this model.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Spatial distance between two entities (indices into the dataset's entity list).
    ///
    /// # Errors
    ///
    /// - [`MissingDistance`] if the table had no entry for the pair
    pub fn spatial_lookup(&self, a: usize, b: usize) -> Result<f64, MissingDistance> {
        match self.spatial[a * self.entity_count + b] {
            Some(d) => Ok(d),
            None => {
                let (id1, id2) =
                    EntityId::canonical_pair(&self.entity_ids[a], &self.entity_ids[b]);
                Err(MissingDistance { id1, id2 })
            }
        }
    }

    /// Absolute time difference in minutes.
    pub fn temporal_distance(a: &Observation, b: &Observation) -> f64 {
        let millis = (a.timestamp() - b.timestamp()).num_milliseconds().abs();
        millis as f64 / 1000.0 / SECONDS_PER_MINUTE
    }

    /// `sw * spatial + tw * temporal`, or `tw * temporal` in temporal mode.
    ///
    /// Unreachable entity pairs yield `f64::INFINITY`.
    pub fn contextual_distance(&self, a: &Observation, b: &Observation) -> f64 {
        let temporal = self.weights.temporal * Self::temporal_distance(a, b);
        if !self.uses_spatial {
            return temporal;
        }
        match self.spatial_lookup(a.entity(), b.entity()) {
            Ok(d) => self.weights.spatial * d + temporal,
            Err(_) => f64::INFINITY,
        }
    }

    /// Weighted Manhattan distance over the behavioral vectors.
    pub fn behavioral_distance(&self, a: &Observation, b: &Observation) -> f64 {
        a.behavior()
            .iter()
            .zip(b.behavior())
            .zip(&self.weights.behavioral)
            .map(|((x, y), w)| w * (x - y).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn dataset() -> Dataset {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut data = Dataset::new(vec!["flow".into(), "speed".into()]);
        data.push(EntityId::from(1), t0, vec![0.2, 0.4]).unwrap();
        data.push(EntityId::from(2), t0 + Duration::minutes(30), vec![0.5, 0.1])
            .unwrap();
        data.push(EntityId::from(3), t0 + Duration::seconds(90), vec![0.2, 0.4])
            .unwrap();
        data
    }

    fn table() -> SpatialDistanceTable {
        let mut table = SpatialDistanceTable::new();
        table.insert(EntityId::from(1), EntityId::from(2), 100.0).unwrap();
        table
    }

    #[test]
    fn test_contextual_distance_combines_weighted_terms() {
        let data = dataset();
        let weights = Weights {
            behavioral: vec![1.0, 1.0],
            spatial: 0.5,
            temporal: 2.0,
        };
        let model = DistanceModel::new(&data, &table(), weights, &RunMode::SpatioTemporal).unwrap();

        let d = model.contextual_distance(data.get(0), data.get(1));
        assert!((d - (0.5 * 100.0 + 2.0 * 30.0)).abs() < 1e-12, "got {}", d);
        println!("[PASS] test_contextual_distance_combines_weighted_terms - d={}", d);
    }

    #[test]
    fn test_missing_pair_is_infinite() {
        let data = dataset();
        let model =
            DistanceModel::new(&data, &table(), Weights::uniform(2), &RunMode::SpatioTemporal)
                .unwrap();

        assert!(model.spatial_lookup(0, 2).is_err());
        assert_eq!(
            model.contextual_distance(data.get(0), data.get(2)),
            f64::INFINITY
        );
        assert_eq!(
            model.contextual_distance(data.get(2), data.get(0)),
            f64::INFINITY
        );
    }

    #[test]
    fn test_temporal_mode_ignores_spatial_term() {
        let data = dataset();
        let model = DistanceModel::new(
            &data,
            &table(),
            Weights::uniform(2),
            &RunMode::Temporal {
                entity: EntityId::from(1),
            },
        )
        .unwrap();

        // Missing pair no longer matters; only 1.5 minutes remain
        assert!((model.contextual_distance(data.get(0), data.get(2)) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_behavioral_distance_is_weighted_manhattan() {
        let data = dataset();
        let weights = Weights {
            behavioral: vec![2.0, 1.0],
            spatial: 1.0,
            temporal: 1.0,
        };
        let model = DistanceModel::new(&data, &table(), weights, &RunMode::SpatioTemporal).unwrap();

        let d = model.behavioral_distance(data.get(0), data.get(1));
        assert!((d - (2.0 * 0.3 + 0.3)).abs() < 1e-12, "got {}", d);
        assert_eq!(model.behavioral_distance(data.get(0), data.get(2)), 0.0);
    }

    #[test]
    fn test_weight_dimension_must_match() {
        let data = dataset();
        let err = DistanceModel::new(&data, &table(), Weights::uniform(3), &RunMode::SpatioTemporal)
            .unwrap_err();
        assert!(matches!(
            err,
            ClusterError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let data = dataset();
        let weights = Weights {
            behavioral: vec![1.0, -1.0],
            spatial: 1.0,
            temporal: 1.0,
        };
        let err = DistanceModel::new(&data, &table(), weights, &RunMode::SpatioTemporal)
            .unwrap_err();
        assert!(err.to_string().contains("behavioral[1]"));
    }
}
