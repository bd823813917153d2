//! Utility functions for mapping operations.

/// Normalizes a field name for comparison: lower-cased with `_` and `-` removed.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|ch| !matches!(ch, '_' | '-'))
        .collect()
}

/// Display form of a field read in row-oriented code.
pub(crate) fn field_read(field: &str) -> String {
    format!("row['{field}']")
}
