use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("schema {schema_id} declares field '{field}' more than once")]
    DuplicateField { schema_id: String, field: String },
    #[error("schema {schema_id} has a field with an empty name")]
    EmptyFieldName { schema_id: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
