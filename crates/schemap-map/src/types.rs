//! Data type normalization and compatibility classification.
//!
//! Type strings arrive free-form from many catalogs (`varchar(255)`,
//! `DECIMAL(10, 2)`, `bigint`). They are normalized to an upper-case base name
//! and classified into compatibility groups. Anything not listed in a group is
//! compatible only with itself.

/// Groups of normalized type names that convert into one another.
///
/// Compatibility is symmetric within each group. A type may sit in more than
/// one group (`NUMERIC` and `DECIMAL` bridge integers and floats), but the
/// relation is not transitive across groups: `INTEGER` and `FLOAT` stay
/// incompatible.
const COMPATIBILITY_GROUPS: &[&[&str]] = &[
    &["VARCHAR", "TEXT", "CHAR", "STRING"],
    &["INTEGER", "BIGINT", "SMALLINT", "INT", "NUMERIC", "DECIMAL"],
    &["FLOAT", "DOUBLE", "NUMERIC", "DECIMAL"],
    &["DATE", "TIMESTAMP", "DATETIME"],
    &["TIME"],
    &["BOOLEAN", "BOOL", "BIT"],
    &["BLOB", "BINARY", "VARBINARY"],
];

/// Family a normalized type resolves to, used to pick conversion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    String,
    Integer,
    /// Exact numerics (`NUMERIC`, `DECIMAL`).
    Numeric,
    Float,
    /// Dates and timestamps.
    Temporal,
    /// Time of day; kept apart from [`TypeFamily::Temporal`].
    Time,
    Boolean,
    Binary,
    Other,
}

impl TypeFamily {
    /// Resolves the family of an already-normalized type name.
    pub fn of(normalized: &str) -> Self {
        match normalized {
            "VARCHAR" | "TEXT" | "CHAR" | "STRING" => Self::String,
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" => Self::Integer,
            "NUMERIC" | "DECIMAL" => Self::Numeric,
            "FLOAT" | "DOUBLE" => Self::Float,
            "DATE" | "TIMESTAMP" | "DATETIME" => Self::Temporal,
            "TIME" => Self::Time,
            "BOOLEAN" | "BOOL" | "BIT" => Self::Boolean,
            "BLOB" | "BINARY" | "VARBINARY" => Self::Binary,
            _ => Self::Other,
        }
    }
}

/// Normalizes and compares data type strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCompatibilityResolver;

impl TypeCompatibilityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Upper-cases, strips every parenthesized size/precision suffix and trims.
    ///
    /// `VARCHAR(255)` and `varchar` both normalize to `VARCHAR`. An unclosed
    /// parenthesis is left in place.
    pub fn normalize(&self, data_type: &str) -> String {
        let upper = data_type.to_uppercase();
        let mut out = String::with_capacity(upper.len());
        let mut rest = upper.as_str();
        while let Some(open) = rest.find('(') {
            let Some(close) = rest[open..].find(')') else {
                break;
            };
            out.push_str(&rest[..open]);
            rest = &rest[open + close + 1..];
        }
        out.push_str(rest);
        out.trim().to_string()
    }

    /// True when both types normalize to the same name.
    pub fn identical(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    /// True when the types are identical or share a compatibility group.
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        let a = self.normalize(a);
        let b = self.normalize(b);
        if a == b {
            return true;
        }
        COMPATIBILITY_GROUPS
            .iter()
            .any(|group| group.contains(&a.as_str()) && group.contains(&b.as_str()))
    }

    pub fn family(&self, data_type: &str) -> TypeFamily {
        TypeFamily::of(&self.normalize(data_type))
    }
}
