//! Run mode: full spatio-temporal context or a single entity's time series.

use std::fmt;

use super::entity::EntityId;

/// Which contextual attributes define neighborhoods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Every entity, spatial + temporal context.
    #[default]
    SpatioTemporal,
    /// One entity only; the spatial term is forced to zero.
    Temporal {
        /// The entity whose series is analysed
        entity: EntityId,
    },
}

impl RunMode {
    /// Build the mode from an optional entity filter.
    pub fn from_filter(entity: Option<&str>) -> Self {
        match entity {
            Some(raw) => RunMode::Temporal {
                entity: EntityId::parse(raw),
            },
            None => RunMode::SpatioTemporal,
        }
    }

    /// True when the spatial term contributes to contextual distance.
    #[inline]
    pub fn uses_spatial(&self) -> bool {
        matches!(self, RunMode::SpatioTemporal)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::SpatioTemporal => f.write_str("spatiotemporal"),
            RunMode::Temporal { entity } => write!(f, "temporal({})", entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filter() {
        assert_eq!(RunMode::from_filter(None), RunMode::SpatioTemporal);
        let mode = RunMode::from_filter(Some("S12"));
        assert_eq!(
            mode,
            RunMode::Temporal {
                entity: EntityId::Named("S12".into())
            }
        );
        assert!(!mode.uses_spatial());
        assert_eq!(mode.to_string(), "temporal(S12)");
    }
}
