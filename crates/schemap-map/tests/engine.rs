//! End-to-end mapping generation over realistic schemas.

use schemap_map::{MappingGenerator, MappingStats, MatchingOptions, TransformationSynthesizer};
use schemap_model::{Field, MappingType, Schema};

fn users_source() -> Schema {
    Schema::new(
        "crm_users_v1",
        "crm_users",
        1,
        vec![
            Field::new("user_id", "INTEGER", false),
            Field::new("user_name", "VARCHAR(255)", false),
            Field::new("email_addr", "VARCHAR(255)", true),
        ],
    )
}

fn users_target() -> Schema {
    Schema::new(
        "warehouse_users_v1",
        "warehouse_users",
        1,
        vec![
            Field::new("id", "BIGINT", false),
            Field::new("username", "TEXT", false),
            Field::new("email", "TEXT", true),
        ],
    )
}

#[test]
fn maps_every_user_field_with_conversions() {
    let generator = MappingGenerator::default();
    let mappings = generator.generate(&users_source(), &users_target());

    let pairs: Vec<_> = mappings
        .iter()
        .map(|m| (m.source_field.as_str(), m.target_field.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("user_id", "id"),
            ("user_name", "username"),
            ("email_addr", "email"),
        ]
    );

    for mapping in &mappings {
        assert_eq!(mapping.mapping_type, MappingType::Transformed);
        assert!(mapping.confidence > 0.3, "{mapping:?}");
        assert!(mapping.confidence <= 1.0);
    }
    assert!((mappings[0].confidence - 0.84).abs() < 1e-9);
    assert_eq!(mappings[1].confidence, 1.0);
    assert!((mappings[2].confidence - 0.84).abs() < 1e-9);
    assert_eq!(
        mappings[0].transformation.as_deref(),
        Some("CAST({field} AS INTEGER)")
    );
    assert_eq!(
        mappings[1].transformation.as_deref(),
        Some("CAST({field} AS VARCHAR)")
    );
}

#[test]
fn generated_mappings_synthesize_to_concrete_expressions() {
    let generator = MappingGenerator::default();
    let synthesizer = TransformationSynthesizer::new();
    let mappings = generator.generate(&users_source(), &users_target());

    let logic: Vec<_> = mappings.iter().map(|m| synthesizer.synthesize(m)).collect();
    assert_eq!(
        logic[0].declarative.as_deref(),
        Some("CAST(user_id AS INTEGER)")
    );
    assert_eq!(logic[0].imperative.as_deref(), Some("int(row['user_id'])"));
    assert_eq!(logic[2].imperative.as_deref(), Some("str(row['email_addr'])"));
}

#[test]
fn stricter_threshold_drops_mappings() {
    let generator = MappingGenerator::new(MatchingOptions::default().with_generation_threshold(0.9));
    let mappings = generator.generate(&users_source(), &users_target());
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].target_field, "username");
}

#[test]
fn stats_summarize_generated_set() {
    let generator = MappingGenerator::default();
    let mappings = generator.generate(&users_source(), &users_target());
    let stats = MappingStats::from_mappings(&mappings, generator.options().high_confidence_threshold);
    assert_eq!(stats.mapping_count, 3);
    assert_eq!(stats.high_confidence_count, 3);
    assert_eq!(stats.max_confidence, Some(1.0));
}
