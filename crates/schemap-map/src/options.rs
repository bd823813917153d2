use serde::{Deserialize, Serialize};

/// Acceptance thresholds for proposed mappings.
///
/// Every threshold is exclusive: a mapping is accepted only when its
/// confidence is strictly greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingOptions {
    /// Minimum confidence for a best candidate during full generation (default: 0.3).
    pub generation_threshold: f64,
    /// Minimum confidence for mapping a newly added source field (default: 0.5).
    pub incremental_threshold: f64,
    /// Confidence above which a mapping counts as high confidence (default: 0.8).
    pub high_confidence_threshold: f64,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            generation_threshold: 0.3,
            incremental_threshold: 0.5,
            high_confidence_threshold: 0.8,
        }
    }
}

impl MatchingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_generation_threshold(mut self, threshold: f64) -> Self {
        self.generation_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_incremental_threshold(mut self, threshold: f64) -> Self {
        self.incremental_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_high_confidence_threshold(mut self, threshold: f64) -> Self {
        self.high_confidence_threshold = threshold;
        self
    }
}
