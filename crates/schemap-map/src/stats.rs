use std::cmp::Ordering;

use schemap_model::FieldMapping;
use serde::{Deserialize, Serialize};

/// Summary of a mapping set's confidences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingStats {
    pub mapping_count: usize,
    /// Mean confidence, `None` for an empty set.
    pub mean_confidence: Option<f64>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    /// Mappings whose confidence is strictly above the high-confidence threshold.
    pub high_confidence_count: usize,
}

impl MappingStats {
    pub fn from_mappings(mappings: &[FieldMapping], high_confidence_threshold: f64) -> Self {
        let mean_confidence = if mappings.is_empty() {
            None
        } else {
            let sum: f64 = mappings.iter().map(|m| m.confidence).sum();
            Some(sum / mappings.len() as f64)
        };
        Self {
            mapping_count: mappings.len(),
            mean_confidence,
            min_confidence: mappings
                .iter()
                .map(|m| m.confidence)
                .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal)),
            max_confidence: mappings
                .iter()
                .map(|m| m.confidence)
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal)),
            high_confidence_count: mappings
                .iter()
                .filter(|m| m.confidence > high_confidence_threshold)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_no_confidences() {
        let stats = MappingStats::from_mappings(&[], 0.8);
        assert_eq!(stats.mapping_count, 0);
        assert_eq!(stats.mean_confidence, None);
        assert_eq!(stats.high_confidence_count, 0);
    }

    #[test]
    fn high_confidence_is_strict() {
        let mappings = vec![
            FieldMapping::direct("a", "a", 1.0),
            FieldMapping::direct("b", "b", 0.8),
            FieldMapping::direct("c", "c", 0.6),
        ];
        let stats = MappingStats::from_mappings(&mappings, 0.8);
        assert_eq!(stats.high_confidence_count, 1);
        assert_eq!(stats.min_confidence, Some(0.6));
        assert_eq!(stats.max_confidence, Some(1.0));
        let mean = stats.mean_confidence.unwrap();
        assert!((mean - 0.8).abs() < 1e-12);
    }
}
