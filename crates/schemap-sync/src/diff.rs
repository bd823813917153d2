//! Schema drift detection against the last known snapshot of a source.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use schemap_map::TypeCompatibilityResolver;
use schemap_model::{ChangeType, Field, Schema, SchemaChange};
use tracing::{debug, info, info_span};

use crate::store::{InMemoryStore, SnapshotStore};

/// Changes between two schemas of the same source.
///
/// Added fields come first in `new` order, then removed fields in `old`
/// order, then type and nullability changes for fields present in both, in
/// `old` order. A field whose type and nullability both changed yields two
/// changes. Types are compared and reported in normalized form.
pub fn diff_schemas(source_id: &str, old: &Schema, new: &Schema) -> Vec<SchemaChange> {
    let types = TypeCompatibilityResolver::new();
    let detected_at = Utc::now();
    let old_fields: BTreeMap<&str, &Field> = old.fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let new_fields: BTreeMap<&str, &Field> = new.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut changes = Vec::new();
    let change = |change_type, field: &str| {
        SchemaChange::new(source_id, change_type, field).detected_at(detected_at)
    };

    for field in &new.fields {
        if !old_fields.contains_key(field.name.as_str()) {
            changes.push(change(ChangeType::Added, &field.name).with_new_value(field.data_type.clone()));
        }
    }

    for field in &old.fields {
        if !new_fields.contains_key(field.name.as_str()) {
            changes.push(change(ChangeType::Removed, &field.name).with_old_value(field.data_type.clone()));
        }
    }

    for old_field in &old.fields {
        let Some(new_field) = new_fields.get(old_field.name.as_str()) else {
            continue;
        };

        let old_type = types.normalize(&old_field.data_type);
        let new_type = types.normalize(&new_field.data_type);
        if old_type != new_type {
            changes.push(
                change(ChangeType::TypeChanged, &old_field.name)
                    .with_old_value(old_type)
                    .with_new_value(new_type),
            );
        }

        if old_field.nullable != new_field.nullable {
            changes.push(
                change(ChangeType::Modified, &old_field.name)
                    .with_old_value(nullability(old_field.nullable))
                    .with_new_value(nullability(new_field.nullable)),
            );
        }
    }

    changes
}

fn nullability(nullable: bool) -> String {
    format!("nullable={nullable}")
}

/// Compares each observed schema with the cached snapshot for its source.
///
/// The first observation of a source only seeds the cache. Afterwards the
/// snapshot is replaced only when a comparison finds changes, so an
/// unchanged schema never overwrites the cached one.
pub struct SchemaDiffer {
    snapshots: Arc<SnapshotStore>,
}

impl SchemaDiffer {
    pub fn new(snapshots: Arc<SnapshotStore>) -> Self {
        Self { snapshots }
    }

    /// Differ with a private in-memory snapshot cache.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::<String, Schema>::new()))
    }

    pub fn diff(&self, source_id: &str, new_schema: &Schema) -> Vec<SchemaChange> {
        let span = info_span!("schema_diff", source_id, version = new_schema.version);
        let _guard = span.enter();

        let mut changes = Vec::new();
        self.snapshots.modify(&source_id.to_string(), &mut |snapshot| {
            match snapshot {
                None => {
                    debug!("first observation, caching snapshot");
                    *snapshot = Some(new_schema.clone());
                }
                Some(old_schema) => {
                    changes = diff_schemas(source_id, old_schema, new_schema);
                    if !changes.is_empty() {
                        *old_schema = new_schema.clone();
                    }
                }
            }
        });

        if !changes.is_empty() {
            info!(change_count = changes.len(), "schema changes detected");
        }
        changes
    }

    /// Cached snapshot for `source_id`, if any.
    pub fn snapshot(&self, source_id: &str) -> Option<Schema> {
        self.snapshots.get(&source_id.to_string())
    }
}

impl Default for SchemaDiffer {
    fn default() -> Self {
        Self::in_memory()
    }
}
