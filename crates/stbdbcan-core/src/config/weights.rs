//! Distance weight configuration.

use serde::{Deserialize, Serialize};

use crate::distance::Weights;

fn default_weight() -> f64 {
    1.0
}

/// `[weights]` section.
///
/// `behavioral` is positional, aligned with `input.behavioral`; when omitted
/// every behavioral attribute weighs 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Per-attribute behavioral weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral: Option<Vec<f64>>,

    /// Weight of the spatial term of contextual distance.
    #[serde(default = "default_weight")]
    pub spatial: f64,

    /// Weight of the temporal term (per minute).
    #[serde(default = "default_weight")]
    pub temporal: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            behavioral: None,
            spatial: default_weight(),
            temporal: default_weight(),
        }
    }
}

impl WeightConfig {
    /// Validate weight values.
    ///
    /// # Errors
    /// Returns a description of the first negative or non-finite weight, or of
    /// a behavioral vector whose length differs from `dimension`.
    pub fn validate(&self, dimension: usize) -> Result<(), String> {
        let check = |name: String, w: f64| {
            if w.is_finite() && w >= 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be finite and >= 0, got {}", name, w))
            }
        };
        check("spatial".into(), self.spatial)?;
        check("temporal".into(), self.temporal)?;

        if let Some(bw) = &self.behavioral {
            if bw.len() != dimension {
                return Err(format!(
                    "behavioral has {} weights but {} behavioral attributes are configured",
                    bw.len(),
                    dimension
                ));
            }
            for (i, &w) in bw.iter().enumerate() {
                check(format!("behavioral[{}]", i), w)?;
            }
        }
        Ok(())
    }

    /// Bind the configured weights for a D-dimensional behavioral vector.
    pub fn bind(&self, dimension: usize) -> Weights {
        Weights {
            behavioral: self
                .behavioral
                .clone()
                .unwrap_or_else(|| vec![1.0; dimension]),
            spatial: self.spatial,
            temporal: self.temporal,
        }
    }
}
