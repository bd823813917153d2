//! Mapping generation between two full schemas.

use std::collections::BTreeSet;

use schemap_model::{Field, FieldMapping, MappingType, Schema};
use tracing::debug;

use crate::options::MatchingOptions;
use crate::score::ConfidenceScorer;
use crate::transform::conversion_template;

/// Greedy, target-first field mapper.
///
/// Target fields are visited in declared order. Each one takes the
/// best-scoring source field not yet claimed by an earlier target; ties keep
/// the first candidate encountered. The result is order-sensitive and not a
/// globally optimal assignment.
///
/// # Example
///
/// ```ignore
/// use schemap_map::MappingGenerator;
///
/// let generator = MappingGenerator::default();
/// let mappings = generator.generate(&source, &target);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingGenerator {
    scorer: ConfidenceScorer,
    options: MatchingOptions,
}

impl MappingGenerator {
    pub fn new(options: MatchingOptions) -> Self {
        Self {
            scorer: ConfidenceScorer::new(),
            options,
        }
    }

    pub fn options(&self) -> &MatchingOptions {
        &self.options
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    /// Proposes mappings from `source` into `target`.
    ///
    /// Returns accepted mappings in target-field order. Each target and each
    /// source field appears at most once; targets without a candidate above
    /// the generation threshold are absent.
    pub fn generate(&self, source: &Schema, target: &Schema) -> Vec<FieldMapping> {
        let mut claimed: BTreeSet<&str> = BTreeSet::new();
        let mut mappings = Vec::new();

        for target_field in &target.fields {
            let mut best: Option<(&Field, f64)> = None;
            for source_field in &source.fields {
                if claimed.contains(source_field.name.as_str()) {
                    continue;
                }
                let confidence = self.scorer.score_fields(source_field, target_field).value;
                if best.is_none_or(|(_, best_confidence)| confidence > best_confidence) {
                    best = Some((source_field, confidence));
                }
            }

            if let Some((source_field, confidence)) = best
                && confidence > self.options.generation_threshold
            {
                claimed.insert(source_field.name.as_str());
                debug!(
                    source = %source_field.name,
                    target = %target_field.name,
                    confidence,
                    "accepted mapping"
                );
                mappings.push(self.build_mapping(source_field, target_field, confidence));
            }
        }

        mappings
    }

    /// Scores a single pair and builds the mapping it would produce.
    pub fn evaluate(&self, source_field: &Field, target_field: &Field) -> FieldMapping {
        let confidence = self.scorer.score_fields(source_field, target_field).value;
        self.build_mapping(source_field, target_field, confidence)
    }

    /// `Direct` when the types normalize to the same name, otherwise
    /// `Transformed` with a conversion template for the target type.
    pub fn build_mapping(
        &self,
        source_field: &Field,
        target_field: &Field,
        confidence: f64,
    ) -> FieldMapping {
        let types = self.scorer.types();
        let (mapping_type, transformation) =
            if types.identical(&source_field.data_type, &target_field.data_type) {
                (MappingType::Direct, None)
            } else {
                (
                    MappingType::Transformed,
                    Some(conversion_template(&target_field.data_type)),
                )
            };
        FieldMapping {
            source_field: source_field.name.clone(),
            target_field: target_field.name.clone(),
            transformation,
            confidence: schemap_model::clamp_confidence(confidence),
            mapping_type,
        }
    }
}
