//! Confidence scoring for source/target field pairs.
//!
//! Name similarity is the base score. It is then adjusted, in a fixed order,
//! for type compatibility, identical types and nullability, and finally
//! clamped to `0.0..=1.0`. The order is part of the contract: the same inputs
//! must produce bit-identical confidences across runs.

use schemap_model::{Field, FieldMapping, MappingType, clamp_confidence};

use crate::similarity::NameSimilarityScorer;
use crate::types::TypeCompatibilityResolver;

const INCOMPATIBLE_TYPE_FACTOR: f64 = 0.3;
const IDENTICAL_TYPE_BOOST: f64 = 1.2;
const NULLABILITY_MATCH_BOOST: f64 = 1.05;
/// Source is NOT NULL, target accepts NULL.
const NULLABILITY_WIDENED_FACTOR: f64 = 0.95;
/// Source accepts NULL, target is NOT NULL: values may be rejected.
const NULLABILITY_NARROWED_FACTOR: f64 = 0.85;

const TRANSFORMED_RESCORE_FACTOR: f64 = 0.9;
const DERIVED_RESCORE_FACTOR: f64 = 0.7;

/// Final confidence for a field pair with the adjustments that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceScore {
    /// Final confidence (0.0 to 1.0).
    pub value: f64,
    /// Whether the types share a compatibility group.
    pub type_compatible: bool,
    /// Whether the types normalize to the same name.
    pub type_identical: bool,
    /// Adjustments in the order they were applied.
    pub components: Vec<ScoreComponent>,
}

impl ConfidenceScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{}: x{:.2} ({})", c.name, c.factor, c.description))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One adjustment contributing to the final confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    /// Component name (e.g., "Name similarity").
    pub name: &'static str,
    /// Multiplier applied; for the first component, the base similarity.
    pub factor: f64,
    pub description: String,
}

/// Combines name similarity, type compatibility and nullability into one score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    names: NameSimilarityScorer,
    types: TypeCompatibilityResolver,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &TypeCompatibilityResolver {
        &self.types
    }

    /// Confidence from a precomputed similarity and compatibility flag.
    pub fn confidence(
        &self,
        similarity: f64,
        type_compatible: bool,
        source: &Field,
        target: &Field,
    ) -> f64 {
        self.explain(similarity, type_compatible, source, target)
            .value
    }

    /// Scores a field pair from scratch.
    pub fn score_fields(&self, source: &Field, target: &Field) -> ConfidenceScore {
        let similarity = self.names.similarity(&source.name, &target.name);
        let compatible = self.types.compatible(&source.data_type, &target.data_type);
        self.explain(similarity, compatible, source, target)
    }

    /// Same as [`Self::confidence`], keeping the breakdown.
    pub fn explain(
        &self,
        similarity: f64,
        type_compatible: bool,
        source: &Field,
        target: &Field,
    ) -> ConfidenceScore {
        let type_identical = self.types.identical(&source.data_type, &target.data_type);
        let mut components = vec![ScoreComponent {
            name: "Name similarity",
            factor: similarity,
            description: format!("'{}' vs '{}'", source.name, target.name),
        }];

        let mut confidence = similarity;

        if !type_compatible {
            confidence *= INCOMPATIBLE_TYPE_FACTOR;
            components.push(ScoreComponent {
                name: "Type mismatch",
                factor: INCOMPATIBLE_TYPE_FACTOR,
                description: format!("{} cannot convert to {}", source.data_type, target.data_type),
            });
        }

        if type_identical {
            confidence = (confidence * IDENTICAL_TYPE_BOOST).min(1.0);
            components.push(ScoreComponent {
                name: "Identical type",
                factor: IDENTICAL_TYPE_BOOST,
                description: self.types.normalize(&target.data_type),
            });
        }

        let (name, factor, description) = if source.nullable == target.nullable {
            confidence = (confidence * NULLABILITY_MATCH_BOOST).min(1.0);
            ("Nullability match", NULLABILITY_MATCH_BOOST, "same nullability")
        } else if !source.nullable {
            confidence *= NULLABILITY_WIDENED_FACTOR;
            (
                "Nullability widened",
                NULLABILITY_WIDENED_FACTOR,
                "NOT NULL source into nullable target",
            )
        } else {
            confidence *= NULLABILITY_NARROWED_FACTOR;
            (
                "Nullability narrowed",
                NULLABILITY_NARROWED_FACTOR,
                "nullable source into NOT NULL target",
            )
        };
        components.push(ScoreComponent {
            name,
            factor,
            description: description.to_string(),
        });

        ConfidenceScore {
            value: clamp_confidence(confidence),
            type_compatible,
            type_identical,
            components,
        }
    }

    /// Recomputes a confidence for an existing mapping from its names only,
    /// discounted by how much conversion the mapping needs.
    pub fn rescore_mapping(&self, mapping: &FieldMapping) -> f64 {
        let similarity = self
            .names
            .similarity(&mapping.source_field, &mapping.target_field);
        let factor = match mapping.mapping_type {
            MappingType::Direct => 1.0,
            MappingType::Transformed => TRANSFORMED_RESCORE_FACTOR,
            MappingType::Derived => DERIVED_RESCORE_FACTOR,
        };
        clamp_confidence(similarity * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, data_type: &str, nullable: bool) -> Field {
        Field::new(name, data_type, nullable)
    }

    #[test]
    fn incompatible_types_are_penalized() {
        let scorer = ConfidenceScorer::new();
        let confidence = scorer.confidence(
            1.0,
            false,
            &field("a", "INTEGER", false),
            &field("a", "VARCHAR", false),
        );
        assert!((confidence - 0.3 * 1.05).abs() < 1e-12);
    }

    #[test]
    fn identical_types_boost_then_cap() {
        let scorer = ConfidenceScorer::new();
        let confidence = scorer.confidence(
            0.5,
            true,
            &field("a", "VARCHAR(10)", true),
            &field("b", "varchar", true),
        );
        assert!((confidence - 0.5 * 1.2 * 1.05).abs() < 1e-12);

        let capped = scorer.confidence(
            0.95,
            true,
            &field("a", "TEXT", true),
            &field("b", "TEXT", true),
        );
        assert_eq!(capped, 1.0);
    }

    #[test]
    fn nullability_adjustments() {
        let scorer = ConfidenceScorer::new();
        let widened = scorer.confidence(
            0.8,
            true,
            &field("a", "INT", false),
            &field("b", "BIGINT", true),
        );
        assert!((widened - 0.8 * 0.95).abs() < 1e-12);

        let narrowed = scorer.confidence(
            0.8,
            true,
            &field("a", "INT", true),
            &field("b", "BIGINT", false),
        );
        assert!((narrowed - 0.8 * 0.85).abs() < 1e-12);
    }

    #[test]
    fn explanation_lists_adjustments_in_order() {
        let scorer = ConfidenceScorer::new();
        let score = scorer.score_fields(&field("qty", "INTEGER", true), &field("quantity", "TEXT", false));
        let names: Vec<_> = score.components.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["Name similarity", "Type mismatch", "Nullability narrowed"]
        );
        assert!(score.explain().starts_with("Name similarity"));
        assert!(!score.type_compatible);
    }

    #[test]
    fn rescore_discounts_by_mapping_type() {
        let scorer = ConfidenceScorer::new();
        let direct = FieldMapping::direct("email", "email", 0.2);
        assert_eq!(scorer.rescore_mapping(&direct), 1.0);

        let mut derived = direct.clone();
        derived.mapping_type = MappingType::Derived;
        assert!((scorer.rescore_mapping(&derived) - 0.7).abs() < 1e-12);

        let transformed = FieldMapping::transformed("email", "email", "CAST({field} AS VARCHAR)", 0.2);
        assert!((scorer.rescore_mapping(&transformed) - 0.9).abs() < 1e-12);
    }
}
