use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Column data types exposed by tables
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Double,
    /// Boolean true/false
    Bool,
    /// ISO 8601 timestamp
    Timestamp,
    /// Arbitrary JSON value
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::Double => write!(f, "double"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Json => write!(f, "json"),
        }
    }
}

/// Where a column comes from
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnOrigin {
    /// Data column read from the response
    Field,
    /// Filter column bound from a query predicate
    Argument,
}

/// Definition of a single column in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub origin: ColumnOrigin,
    pub description: Option<String>,
}

/// Comparison operators a key column accepts
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq => write!(f, "="),
        }
    }
}

/// Whether a query must constrain a key column
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Required => write!(f, "required"),
            Requirement::Optional => write!(f, "optional"),
        }
    }
}

/// A predicate column advertised to the host query planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyColumn {
    pub name: String,
    pub operators: Vec<Operator>,
    pub require: Requirement,
}

impl KeyColumn {
    /// Key column supporting only equality
    pub fn equality(name: impl Into<String>, require: Requirement) -> Self {
        Self {
            name: name.into(),
            operators: vec![Operator::Eq],
            require,
        }
    }
}

/// Schema of a table exposed by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table identifier
    pub name: String,
    /// Free-text documentation
    pub description: String,
    /// Data columns followed by filter columns
    pub columns: Vec<ColumnDef>,
    /// Filter columns a query may constrain
    pub key_columns: Vec<KeyColumn>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Field)
    }

    pub fn filter_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Argument)
    }

    pub fn required_predicates(&self) -> impl Iterator<Item = &KeyColumn> {
        self.key_columns
            .iter()
            .filter(|k| k.require == Requirement::Required)
    }

    pub fn optional_predicates(&self) -> impl Iterator<Item = &KeyColumn> {
        self.key_columns
            .iter()
            .filter(|k| k.require == Requirement::Optional)
    }
}

/// A row of data as key-value pairs
pub type DataRow = serde_json::Map<String, serde_json::Value>;

/// Equality predicates of a query, keyed by filter column name
pub type Predicates = HashMap<String, String>;

/// Returned by a row sink after each row
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StreamControl {
    /// Keep sending rows
    Continue,
    /// The caller has enough rows
    Stop,
}

/// Statistics about a streamed query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStats {
    /// Number of rows emitted
    pub row_count: usize,
    /// Wall time from request to last emitted row
    pub execution_ms: u64,
    /// Whether the sink stopped the stream before the response was exhausted
    pub stopped_early: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> TableSchema {
        TableSchema {
            name: "users".to_string(),
            description: "Users".to_string(),
            columns: vec![
                ColumnDef {
                    name: "name".to_string(),
                    column_type: ColumnType::String,
                    origin: ColumnOrigin::Field,
                    description: None,
                },
                ColumnDef {
                    name: "_id".to_string(),
                    column_type: ColumnType::String,
                    origin: ColumnOrigin::Argument,
                    description: None,
                },
                ColumnDef {
                    name: "_page".to_string(),
                    column_type: ColumnType::Int,
                    origin: ColumnOrigin::Argument,
                    description: None,
                },
            ],
            key_columns: vec![
                KeyColumn::equality("_id", Requirement::Required),
                KeyColumn::equality("_page", Requirement::Optional),
            ],
        }
    }

    #[test]
    fn test_column_partitions() {
        let schema = users_schema();
        assert_eq!(schema.data_columns().count(), 1);
        assert_eq!(schema.filter_columns().count(), 2);
        assert_eq!(schema.required_predicates().next().unwrap().name, "_id");
        assert_eq!(schema.optional_predicates().next().unwrap().name, "_page");
        assert_eq!(schema.column("_page").unwrap().column_type, ColumnType::Int);
        assert!(schema.column("missing").is_none());
    }

    #[test]
    fn test_key_column_is_equality_only() {
        let key = KeyColumn::equality("_id", Requirement::Required);
        assert_eq!(key.operators, vec![Operator::Eq]);
        assert_eq!(Operator::Eq.to_string(), "=");
    }

    #[test]
    fn test_column_type_serde_lowercase() {
        let json = serde_json::to_string(&ColumnType::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
        assert_eq!(ColumnType::Double.to_string(), "double");
    }
}
