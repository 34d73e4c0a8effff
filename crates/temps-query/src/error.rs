use std::fmt;
use thiserror::Error;

/// Which part of an endpoint description a type name was declared on
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeclarationKind {
    Field,
    Argument,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Field => write!(f, "field"),
            DeclarationKind::Argument => write!(f, "argument"),
        }
    }
}

/// Unified error type for all data source operations
#[derive(Error, Debug, Clone)]
pub enum DataError {
    /// The endpoint description could not be opened or read
    #[error("Endpoint description unavailable ({source_name}): {cause}")]
    SourceUnavailable { source_name: String, cause: String },

    /// The endpoint description does not have the expected shape
    #[error("Malformed endpoint description: {0}")]
    MalformedDescription(String),

    /// A scalar type name outside the supported vocabulary
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// An endpoint declares a field or argument with an unknown type
    #[error("Endpoint '{endpoint}': {kind} '{name}' has unknown type '{type_name}'")]
    SchemaType {
        endpoint: String,
        kind: DeclarationKind,
        name: String,
        type_name: String,
    },

    /// A required predicate was not supplied by the query
    #[error("Required argument '{0}' not provided")]
    MissingArgument(String),

    /// The outbound request could not be completed
    #[error("Request to {url} for table '{endpoint}' failed: {cause}")]
    Request {
        endpoint: String,
        url: String,
        cause: String,
    },

    /// The upstream API answered with a non-2xx status
    #[error("Request to {url} for table '{endpoint}' returned status {status}")]
    RequestStatus {
        endpoint: String,
        url: String,
        status: u16,
    },

    /// The response body is not a JSON array of objects
    #[error("Failed to parse response for table '{endpoint}': {cause}")]
    ResponseParse { endpoint: String, cause: String },

    /// The outbound request exceeded the configured timeout
    #[error("Request for table '{endpoint}' timed out after {ms}ms")]
    Timeout { endpoint: String, ms: u64 },

    /// The caller cancelled the query
    #[error("Query cancelled")]
    Cancelled,

    /// No table with this name is exposed by the source
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// Create a "table not found" error
    pub fn table_not_found(name: impl Into<String>) -> Self {
        DataError::TableNotFound(name.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        DataError::InvalidConfiguration(msg.into())
    }

    /// Errors that remove a table from schema discovery
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DataError::SourceUnavailable { .. }
                | DataError::MalformedDescription(_)
                | DataError::UnknownType(_)
                | DataError::SchemaType { .. }
        )
    }

    /// Errors reported back to the caller of a single query
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            DataError::MissingArgument(_)
                | DataError::Request { .. }
                | DataError::RequestStatus { .. }
                | DataError::ResponseParse { .. }
                | DataError::Timeout { .. }
                | DataError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_type_message_names_everything() {
        let err = DataError::SchemaType {
            endpoint: "users".to_string(),
            kind: DeclarationKind::Argument,
            name: "id".to_string(),
            type_name: "uuid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Endpoint 'users': argument 'id' has unknown type 'uuid'"
        );
        assert!(err.is_schema_error());
        assert!(!err.is_query_error());
    }

    #[test]
    fn test_missing_argument_is_query_error() {
        let err = DataError::MissingArgument("id".to_string());
        assert!(err.is_query_error());
        assert!(err.to_string().contains("'id'"));
    }
}
