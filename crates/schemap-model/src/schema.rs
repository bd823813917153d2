//! Schema and field definitions supplied by catalog/discovery components.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A named, typed attribute within a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its schema.
    pub name: String,
    /// Free-form type string, possibly with a size/precision suffix
    /// (e.g. `VARCHAR(255)`, `DECIMAL(10, 2)`).
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A versioned, ordered set of fields describing one data source at one
/// point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    /// Identifier of the data source this schema describes. Successive
    /// snapshots of the same source share it.
    pub source_id: String,
    /// Monotonically increasing per source.
    pub version: u64,
    pub fields: Vec<Field>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl Schema {
    /// Builds a schema stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        version: u64,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            version,
            fields,
            timestamp: Utc::now(),
            table_name: None,
        }
    }

    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Looks up a field by its exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks that every field has a non-empty, unique name.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ModelError::EmptyFieldName {
                    schema_id: self.id.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::DuplicateField {
                    schema_id: self.id.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}
