use std::fmt;

use serde::{Deserialize, Serialize};

/// How a source field reaches its target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    /// Types are identical after normalization; the value is copied as-is.
    Direct,
    /// Types differ; a conversion expression is required.
    Transformed,
    /// No direct source match; custom logic is required.
    Derived,
}

impl MappingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Transformed => "transformed",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed correspondence from one source field to one target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,
    /// Conversion template with a `{field}` placeholder for the source field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
    /// Always within `0.0..=1.0`.
    pub confidence: f64,
    pub mapping_type: MappingType,
}

impl FieldMapping {
    pub fn direct(
        source_field: impl Into<String>,
        target_field: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            transformation: None,
            confidence: clamp_confidence(confidence),
            mapping_type: MappingType::Direct,
        }
    }

    pub fn transformed(
        source_field: impl Into<String>,
        target_field: impl Into<String>,
        transformation: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            transformation: Some(transformation.into()),
            confidence: clamp_confidence(confidence),
            mapping_type: MappingType::Transformed,
        }
    }

    pub fn has_transformation(&self) -> bool {
        self.transformation.is_some()
    }
}

/// Clamps a confidence into `0.0..=1.0`. NaN collapses to `0.0`.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Concrete conversion text synthesized for an accepted mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationLogic {
    pub mapping: FieldMapping,
    /// Declarative (SQL-style) conversion expression.
    pub declarative: Option<String>,
    /// Imperative (row-oriented) conversion expression.
    pub imperative: Option<String>,
    pub description: String,
}

/// Cache key for a mapping set: the `(source schema id, target schema id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    pub source_id: String,
    pub target_id: String,
}

impl MappingKey {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_id, self.target_id)
    }
}
