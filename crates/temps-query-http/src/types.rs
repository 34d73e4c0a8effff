//! Scalar type vocabulary of endpoint descriptions

use temps_query::{ColumnType, DataError, Result};

/// Type names accepted in `fields` and `arguments`
pub const TYPE_NAMES: [&str; 6] = ["string", "int", "double", "bool", "timestamp", "json"];

/// Map a declared type name to its column type
pub fn resolve(type_name: &str) -> Result<ColumnType> {
    match type_name {
        "string" => Ok(ColumnType::String),
        "int" => Ok(ColumnType::Int),
        "double" => Ok(ColumnType::Double),
        "bool" => Ok(ColumnType::Bool),
        "timestamp" => Ok(ColumnType::Timestamp),
        "json" => Ok(ColumnType::Json),
        other => Err(DataError::UnknownType(other.to_string())),
    }
}
