//! Field-level matching engine for schema mapping.
//!
//! - **Types** (`types`): normalize type strings and classify compatibility
//! - **Similarity** (`similarity`): fuzzy field-name similarity
//! - **Scoring** (`score`): combine similarity, types and nullability into a confidence
//! - **Generation** (`engine`): greedy target-first assignment between two schemas
//! - **Transformation** (`transform`): conversion expressions for accepted mappings
//!
//! Everything here is pure and synchronous; caching and notification live in
//! `schemap-sync`.

#![deny(unsafe_code)]

pub mod engine;
pub mod options;
pub mod score;
pub mod similarity;
pub mod stats;
pub mod transform;
pub mod types;
pub mod utils;

pub use engine::MappingGenerator;
pub use options::MatchingOptions;
pub use score::{ConfidenceScore, ConfidenceScorer, ScoreComponent};
pub use similarity::NameSimilarityScorer;
pub use stats::MappingStats;
pub use transform::{FIELD_PLACEHOLDER, TransformationSynthesizer, conversion_template};
pub use types::{TypeCompatibilityResolver, TypeFamily};
