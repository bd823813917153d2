//! Turns accepted mappings into concrete conversion expressions.

use schemap_model::{FieldMapping, MappingType, TransformationLogic};
use tracing::debug;

use crate::types::{TypeCompatibilityResolver, TypeFamily};
use crate::utils::field_read;

/// Placeholder substituted with the source field name.
pub const FIELD_PLACEHOLDER: &str = "{field}";

/// Conversion template for a value landing in a column of `target_type`.
///
/// The template contains a [`FIELD_PLACEHOLDER`]. Types outside the known
/// families get a generic cast naming the normalized type.
pub fn conversion_template(target_type: &str) -> String {
    let normalized = TypeCompatibilityResolver::new().normalize(target_type);
    let cast_to = match TypeFamily::of(&normalized) {
        TypeFamily::String => "VARCHAR",
        TypeFamily::Integer => "INTEGER",
        TypeFamily::Numeric => "NUMERIC",
        TypeFamily::Float => "FLOAT",
        TypeFamily::Temporal => "TIMESTAMP",
        TypeFamily::Boolean => "BOOLEAN",
        TypeFamily::Time | TypeFamily::Binary | TypeFamily::Other => normalized.as_str(),
    };
    format!("CAST({FIELD_PLACEHOLDER} AS {cast_to})")
}

/// Produces [`TransformationLogic`] for mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformationSynthesizer {
    types: TypeCompatibilityResolver,
}

impl TransformationSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synthesize(&self, mapping: &FieldMapping) -> TransformationLogic {
        let source = mapping.source_field.as_str();
        let target = mapping.target_field.as_str();

        let (declarative, imperative, description) = match mapping.mapping_type {
            MappingType::Direct => (
                Some(source.to_string()),
                Some(field_read(source)),
                format!("Direct mapping from {source} to {target}"),
            ),
            MappingType::Transformed => {
                let declarative = mapping
                    .transformation
                    .as_deref()
                    .map(|template| template.replace(FIELD_PLACEHOLDER, source));
                let family = mapping
                    .transformation
                    .as_deref()
                    .and_then(cast_target)
                    .map(|cast_to| TypeFamily::of(&self.types.normalize(&cast_to)));
                let imperative = family
                    .and_then(|family| imperative_conversion(family, source))
                    .unwrap_or_else(|| field_read(source));
                (
                    declarative,
                    Some(imperative),
                    format!("Type conversion from {source} to {target}"),
                )
            }
            MappingType::Derived => (
                Some(format!("-- Custom logic needed for {target}")),
                Some(format!("# Custom logic needed for {target}")),
                format!("Derived field {target} requires custom logic"),
            ),
        };

        debug!(source, target, %description, "synthesized transformation");
        TransformationLogic {
            mapping: mapping.clone(),
            declarative,
            imperative,
            description,
        }
    }
}

/// Coercion rule for families that have one.
fn imperative_conversion(family: TypeFamily, field: &str) -> Option<String> {
    let function = match family {
        TypeFamily::Integer => "int",
        TypeFamily::Float => "float",
        TypeFamily::String => "str",
        TypeFamily::Boolean => "bool",
        TypeFamily::Numeric
        | TypeFamily::Temporal
        | TypeFamily::Time
        | TypeFamily::Binary
        | TypeFamily::Other => return None,
    };
    Some(format!("{function}({})", field_read(field)))
}

/// Type named after `AS` in a cast template, e.g. `INTEGER` in
/// `CAST({field} AS INTEGER)`.
fn cast_target(template: &str) -> Option<String> {
    let upper = template.to_uppercase();
    let start = upper.rfind(" AS ")? + " AS ".len();
    let name: String = upper[start..]
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}
