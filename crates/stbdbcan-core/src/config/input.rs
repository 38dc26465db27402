//! Input and output file configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::RunMode;

fn default_id_column() -> String {
    "id".to_string()
}

fn default_timestamp_column() -> String {
    "timestamp".to_string()
}

fn default_normalize() -> bool {
    true
}

/// `[input]` section: how the dataset CSV is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Behavioral column names, in the order they form the vector.
    #[serde(default)]
    pub behavioral: Vec<String>,

    /// Column holding the entity id.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Column holding the observation timestamp.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Restrict the run to one entity's time series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_entity: Option<String>,

    /// Min-max scale behavioral attributes before computing distances.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            behavioral: Vec::new(),
            id_column: default_id_column(),
            timestamp_column: default_timestamp_column(),
            temporal_entity: None,
            normalize: default_normalize(),
        }
    }
}

impl InputConfig {
    /// Run mode implied by `temporal_entity`.
    pub fn mode(&self) -> RunMode {
        RunMode::from_filter(self.temporal_entity.as_deref())
    }

    /// Validate column selection.
    ///
    /// # Errors
    /// Returns a description of the first problem: no behavioral attributes,
    /// a duplicated attribute, or an attribute naming the id/timestamp column.
    pub fn validate(&self) -> Result<(), String> {
        if self.behavioral.is_empty() {
            return Err("behavioral attribute list is empty".to_string());
        }
        if self.id_column == self.timestamp_column {
            return Err(format!(
                "id_column and timestamp_column are both '{}'",
                self.id_column
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.behavioral {
            if name == &self.id_column || name == &self.timestamp_column {
                return Err(format!(
                    "'{}' is a contextual column and cannot be behavioral",
                    name
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("behavioral attribute '{}' listed twice", name));
            }
        }
        if let Some(entity) = &self.temporal_entity {
            if entity.trim().is_empty() {
                return Err("temporal_entity is empty".to_string());
            }
        }
        Ok(())
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Add a per-observation `stbof` column to the results CSV.
    #[serde(default)]
    pub emit_scores: bool,

    /// Directory for result files. Defaults to the dataset's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}
