//! Applies schema changes to an existing mapping set without regenerating it.

use schemap_map::{MappingGenerator, MatchingOptions};
use schemap_model::{ChangeType, FieldMapping, Schema, SchemaChange};
use tracing::{debug, warn};

/// Incremental counterpart of [`MappingGenerator`].
///
/// Changes are applied in the order received:
/// - `added`: first-fit over target fields not already used by any mapping,
///   accepting the first candidate above the incremental threshold;
/// - `removed`: drops the mapping for that source field;
/// - `type_changed`: rescores against the same target field;
/// - `modified`: ignored, existing mappings are kept.
///
/// A change naming a field missing from the supplied schemas is skipped and
/// the rest of the batch is still applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalMappingUpdater {
    generator: MappingGenerator,
}

impl IncrementalMappingUpdater {
    pub fn new(options: MatchingOptions) -> Self {
        Self {
            generator: MappingGenerator::new(options),
        }
    }

    /// Returns `mappings` with `changes` applied. Mappings keep their
    /// positions; newly added ones are appended.
    pub fn apply(
        &self,
        mut mappings: Vec<FieldMapping>,
        changes: &[SchemaChange],
        source: &Schema,
        target: &Schema,
    ) -> Vec<FieldMapping> {
        for change in changes {
            match change.change_type {
                ChangeType::Added => self.map_added_field(&mut mappings, change, source, target),
                ChangeType::Removed => {
                    let before = mappings.len();
                    mappings.retain(|m| m.source_field != change.field_name);
                    if mappings.len() == before {
                        debug!(field = %change.field_name, "removed field had no mapping");
                    }
                }
                ChangeType::TypeChanged => self.rescore_field(&mut mappings, change, source, target),
                ChangeType::Modified => {
                    debug!(field = %change.field_name, "nullability change leaves mapping unchanged");
                }
            }
        }
        mappings
    }

    fn map_added_field(
        &self,
        mappings: &mut Vec<FieldMapping>,
        change: &SchemaChange,
        source: &Schema,
        target: &Schema,
    ) {
        let Some(source_field) = source.field(&change.field_name) else {
            warn!(field = %change.field_name, schema = %source.id, "added field not found in source schema, skipping");
            return;
        };
        let threshold = self.generator.options().incremental_threshold;
        let scorer = self.generator.scorer();

        for target_field in &target.fields {
            if mappings.iter().any(|m| m.target_field == target_field.name) {
                continue;
            }
            let confidence = scorer.score_fields(source_field, target_field).value;
            if confidence > threshold {
                let mapping = self.generator.build_mapping(source_field, target_field, confidence);
                debug!(
                    source = %mapping.source_field,
                    target = %mapping.target_field,
                    confidence,
                    "mapped added field"
                );
                upsert(mappings, mapping);
                return;
            }
        }
        debug!(field = %change.field_name, "no target field cleared the incremental threshold");
    }

    fn rescore_field(
        &self,
        mappings: &mut [FieldMapping],
        change: &SchemaChange,
        source: &Schema,
        target: &Schema,
    ) {
        let Some(existing) = mappings
            .iter_mut()
            .find(|m| m.source_field == change.field_name)
        else {
            debug!(field = %change.field_name, "retyped field had no mapping");
            return;
        };
        let Some(source_field) = source.field(&change.field_name) else {
            warn!(field = %change.field_name, schema = %source.id, "retyped field not found in source schema, skipping");
            return;
        };
        let Some(target_field) = target.field(&existing.target_field) else {
            warn!(field = %existing.target_field, schema = %target.id, "mapped target field not found in target schema, skipping");
            return;
        };
        *existing = self.generator.evaluate(source_field, target_field);
    }
}

fn upsert(mappings: &mut Vec<FieldMapping>, mapping: FieldMapping) {
    match mappings
        .iter_mut()
        .find(|m| m.source_field == mapping.source_field)
    {
        Some(existing) => *existing = mapping,
        None => mappings.push(mapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemap_model::{Field, MappingType};

    fn source(fields: Vec<Field>) -> Schema {
        Schema::new("src", "src", 2, fields)
    }

    fn target() -> Schema {
        Schema::new(
            "dst",
            "dst",
            1,
            vec![
                Field::new("id", "BIGINT", false),
                Field::new("quantity", "INTEGER", true),
            ],
        )
    }

    #[test]
    fn added_field_takes_first_free_target() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![
            Field::new("id", "BIGINT", false),
            Field::new("qty", "INTEGER", true),
        ]);
        let existing = vec![FieldMapping::direct("id", "id", 1.0)];
        let changes = [SchemaChange::new("src", ChangeType::Added, "qty")];
        let updated = updater.apply(existing, &changes, &src, &target());
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].source_field, "qty");
        assert_eq!(updated[1].target_field, "quantity");
        assert_eq!(updated[1].mapping_type, MappingType::Direct);
    }

    #[test]
    fn added_field_below_threshold_stays_unmapped() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![Field::new("zzz", "BLOB", true)]);
        let changes = [SchemaChange::new("src", ChangeType::Added, "zzz")];
        assert!(updater.apply(Vec::new(), &changes, &src, &target()).is_empty());
    }

    #[test]
    fn type_change_keeps_the_target() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![Field::new("qty", "VARCHAR", true)]);
        let existing = vec![FieldMapping::direct("qty", "quantity", 0.95)];
        let changes = [SchemaChange::new("src", ChangeType::TypeChanged, "qty")];
        let updated = updater.apply(existing, &changes, &src, &target());
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].target_field, "quantity");
        assert_eq!(updated[0].mapping_type, MappingType::Transformed);
        assert!(updated[0].confidence < 0.95);
    }

    #[test]
    fn type_change_with_vanished_target_leaves_mapping_untouched() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![Field::new("qty", "VARCHAR", true)]);
        let existing = vec![FieldMapping::direct("qty", "legacy_qty", 0.95)];
        let changes = [SchemaChange::new("src", ChangeType::TypeChanged, "qty")];
        let updated = updater.apply(existing.clone(), &changes, &src, &target());
        assert_eq!(updated, existing);
    }

    #[test]
    fn inconsistent_change_does_not_abort_batch() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![Field::new("id", "BIGINT", false)]);
        let existing = vec![FieldMapping::direct("id", "id", 1.0)];
        let changes = [
            SchemaChange::new("src", ChangeType::Added, "ghost"),
            SchemaChange::new("src", ChangeType::Removed, "id"),
        ];
        assert!(updater.apply(existing, &changes, &src, &target()).is_empty());
    }

    #[test]
    fn nullability_change_is_ignored() {
        let updater = IncrementalMappingUpdater::default();
        let src = source(vec![Field::new("id", "BIGINT", true)]);
        let existing = vec![FieldMapping::direct("id", "id", 1.0)];
        let changes = [SchemaChange::new("src", ChangeType::Modified, "id")];
        let updated = updater.apply(existing.clone(), &changes, &src, &target());
        assert_eq!(updated, existing);
    }
}
