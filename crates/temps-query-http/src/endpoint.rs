//! Endpoint description document
//!
//! The document is a JSON object mapping an endpoint key to its definition:
//!
//! ```json
//! {
//!   "users": {
//!     "name": "users",
//!     "description": "Users of the directory API",
//!     "url": "https://api.example.com/users",
//!     "headers": { "Authorization": "Bearer ..." },
//!     "fields": { "name": "string", "age": "int" },
//!     "arguments": { "id": { "type": "string", "optional": false } }
//!   }
//! }
//! ```

use crate::source::ConfigSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use temps_query::{DataError, Result};
use tracing::debug;

/// Endpoint definitions keyed by endpoint key
pub type Endpoints = BTreeMap<String, EndpointDefinition>;

/// One configured HTTP JSON endpoint, exposed as one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    /// Table identifier
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base URL; bound arguments are appended as query parameters
    pub url: String,
    /// Static headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Output field name -> type name
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Argument name -> argument spec
    #[serde(default)]
    pub arguments: BTreeMap<String, ArgumentSpec>,
}

/// A filter argument of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    /// When false the predicate must be supplied on every query
    #[serde(default)]
    pub optional: bool,
}

impl EndpointDefinition {
    /// Iterate over the arguments a query must always supply
    pub fn required_arguments(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .filter(|(_, spec)| !spec.optional)
            .map(|(name, _)| name.as_str())
    }
}

/// Parse a description document
pub fn parse(bytes: &[u8]) -> Result<Endpoints> {
    serde_json::from_slice(bytes).map_err(|e| DataError::MalformedDescription(e.to_string()))
}

/// Read and parse the description document behind `source`
///
/// Nothing is cached here; every call reads the source again.
pub async fn load(source: &dyn ConfigSource) -> Result<Endpoints> {
    let bytes = source.load().await?;
    let endpoints = parse(&bytes)?;
    debug!(
        "Loaded {} endpoint definitions from {}",
        endpoints.len(),
        source.describe()
    );
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    const USERS: &str = r#"{
        "users": {
            "name": "users",
            "description": "Users",
            "url": "http://localhost/users",
            "headers": {"X-Api-Key": "secret"},
            "fields": {"name": "string", "age": "int"},
            "arguments": {
                "id": {"type": "string", "optional": false},
                "page": {"type": "int", "optional": true}
            }
        }
    }"#;

    #[test]
    fn test_parse_full_definition() {
        let endpoints = parse(USERS.as_bytes()).unwrap();
        let users = &endpoints["users"];

        assert_eq!(users.name, "users");
        assert_eq!(users.url, "http://localhost/users");
        assert_eq!(users.headers["X-Api-Key"], "secret");
        assert_eq!(users.fields["age"], "int");
        assert_eq!(users.arguments["id"].type_name, "string");
        assert!(!users.arguments["id"].optional);
        assert!(users.arguments["page"].optional);
        assert_eq!(users.required_arguments().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_parse_defaults_optional_sections() {
        let doc = r#"{"ping": {"name": "ping", "url": "http://localhost/ping"}}"#;
        let endpoints = parse(doc.as_bytes()).unwrap();
        let ping = &endpoints["ping"];

        assert!(ping.description.is_empty());
        assert!(ping.headers.is_empty());
        assert!(ping.fields.is_empty());
        assert!(ping.arguments.is_empty());
    }

    #[test]
    fn test_argument_optional_defaults_to_required() {
        let doc = r#"{"t": {"name": "t", "url": "u", "arguments": {"id": {"type": "int"}}}}"#;
        let endpoints = parse(doc.as_bytes()).unwrap();
        assert!(!endpoints["t"].arguments["id"].optional);
    }

    #[test]
    fn test_parse_malformed() {
        for doc in ["", "[]", "{\"t\": 3}", "{\"t\": {\"name\": \"t\"}}", "not json"] {
            assert!(
                matches!(parse(doc.as_bytes()), Err(DataError::MalformedDescription(_))),
                "document {:?} should be rejected",
                doc
            );
        }
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = StaticSource::new(USERS);
        let endpoints = load(&source).await.unwrap();
        assert_eq!(endpoints.keys().collect::<Vec<_>>(), vec!["users"]);
    }
}
