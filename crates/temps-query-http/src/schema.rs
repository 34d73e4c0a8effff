//! Table schemas derived from endpoint definitions
//!
//! Each endpoint becomes one table: its fields are data columns and its
//! arguments are `_`-prefixed filter columns that only support equality.
//! An endpoint with an unknown type is left out on its own; the other
//! endpoints of the document are unaffected.

use crate::endpoint::{EndpointDefinition, Endpoints};
use crate::types::resolve;
use std::collections::{BTreeMap, HashSet};
use temps_query::{
    ColumnDef, ColumnOrigin, DataError, DeclarationKind, KeyColumn, Requirement, Result,
    TableSchema,
};
use tracing::{debug, warn};

/// Prefix separating filter columns from data columns
pub const ARGUMENT_PREFIX: &str = "_";

/// Filter column name of an argument
pub fn argument_column(argument: &str) -> String {
    format!("{}{}", ARGUMENT_PREFIX, argument)
}

/// An endpoint left out of discovery
#[derive(Debug)]
pub struct Rejection {
    /// Endpoint key in the description document
    pub endpoint: String,
    /// Table name the endpoint declares
    pub table: String,
    pub error: DataError,
}

/// Outcome of building the schemas of a whole document
#[derive(Debug, Default)]
pub struct SchemaSet {
    /// Usable tables keyed by endpoint key
    pub tables: BTreeMap<String, TableSchema>,
    /// Endpoints left out, with the reason
    pub rejected: Vec<Rejection>,
}

impl SchemaSet {
    /// Resolve a table reference to the key of a usable endpoint
    ///
    /// Endpoint keys take precedence over table names. A reference to a
    /// rejected endpoint fails with the reason it was rejected.
    pub fn resolve(&self, table: &str) -> Result<&str> {
        if let Some((key, _)) = self.tables.get_key_value(table) {
            return Ok(key);
        }
        if let Some(error) = self.rejection(table) {
            return Err(error.clone());
        }
        if let Some((key, _)) = self.tables.iter().find(|(_, t)| t.name == table) {
            return Ok(key);
        }
        match self.rejected.iter().find(|r| r.table == table) {
            Some(rejection) => Err(rejection.error.clone()),
            None => Err(DataError::table_not_found(table)),
        }
    }

    /// Find a usable table by endpoint key or by table name
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.resolve(name).ok().and_then(|key| self.tables.get(key))
    }

    /// Why an endpoint was left out, if it was
    pub fn rejection(&self, endpoint: &str) -> Option<&DataError> {
        self.rejected
            .iter()
            .find(|r| r.endpoint == endpoint)
            .map(|r| &r.error)
    }
}

/// Build the schema of every endpoint, isolating failures per endpoint
///
/// Besides unknown types, an endpoint is rejected when its table name is
/// already taken by an earlier endpoint or is the key of another endpoint,
/// so every reference resolves to at most one endpoint.
pub fn build(endpoints: &Endpoints) -> SchemaSet {
    let mut set = SchemaSet::default();
    let mut names = HashSet::new();

    for (key, definition) in endpoints {
        let result = build_table(definition).and_then(|table| {
            if table.name != *key && endpoints.contains_key(&table.name) {
                Err(DataError::MalformedDescription(format!(
                    "Endpoint '{}' uses table name '{}', which is the key of another endpoint",
                    key, table.name
                )))
            } else if !names.insert(table.name.clone()) {
                Err(DataError::MalformedDescription(format!(
                    "Endpoint '{}' reuses table name '{}'",
                    key, table.name
                )))
            } else {
                Ok(table)
            }
        });

        match result {
            Ok(table) => {
                set.tables.insert(key.clone(), table);
            }
            Err(e) => {
                warn!("Skipping endpoint '{}': {}", key, e);
                set.rejected.push(Rejection {
                    endpoint: key.clone(),
                    table: definition.name.clone(),
                    error: e,
                });
            }
        }
    }

    debug!(
        "Built {} tables, rejected {} endpoints",
        set.tables.len(),
        set.rejected.len()
    );
    set
}

/// Build the table schema of one endpoint
pub fn build_table(definition: &EndpointDefinition) -> Result<TableSchema> {
    let mut columns = Vec::with_capacity(definition.fields.len() + definition.arguments.len());
    let mut key_columns = Vec::with_capacity(definition.arguments.len());

    for (name, type_name) in &definition.fields {
        let column_type = resolve(type_name).map_err(|_| {
            schema_type_error(definition, DeclarationKind::Field, name, type_name)
        })?;
        columns.push(ColumnDef {
            name: name.clone(),
            column_type,
            origin: ColumnOrigin::Field,
            description: Some(format!("Field {}", name)),
        });
    }

    for (name, spec) in &definition.arguments {
        let column_type = resolve(&spec.type_name).map_err(|_| {
            schema_type_error(definition, DeclarationKind::Argument, name, &spec.type_name)
        })?;
        let require = if spec.optional {
            Requirement::Optional
        } else {
            Requirement::Required
        };
        let column = argument_column(name);

        columns.push(ColumnDef {
            name: column.clone(),
            column_type,
            origin: ColumnOrigin::Argument,
            description: Some(format!("Filter argument {} ({})", name, require)),
        });
        key_columns.push(KeyColumn::equality(column, require));
    }

    Ok(TableSchema {
        name: definition.name.clone(),
        description: definition.description.clone(),
        columns,
        key_columns,
    })
}

fn schema_type_error(
    definition: &EndpointDefinition,
    kind: DeclarationKind,
    name: &str,
    type_name: &str,
) -> DataError {
    DataError::SchemaType {
        endpoint: definition.name.clone(),
        kind,
        name: name.to_string(),
        type_name: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::parse;
    use temps_query::{ColumnType, Operator};

    const DOCUMENT: &str = r#"{
        "users": {
            "name": "users",
            "description": "Directory users",
            "url": "http://localhost/users",
            "fields": {"name": "string", "age": "int", "meta": "json"},
            "arguments": {
                "id": {"type": "string", "optional": false},
                "since": {"type": "timestamp", "optional": true}
            }
        },
        "broken_field": {
            "name": "broken_field",
            "url": "http://localhost/a",
            "fields": {"score": "float"}
        },
        "broken_argument": {
            "name": "broken_argument",
            "url": "http://localhost/b",
            "fields": {"ok": "bool"},
            "arguments": {"when": {"type": "date", "optional": true}}
        },
        "prices": {
            "name": "prices",
            "url": "http://localhost/prices",
            "fields": {"price": "double"}
        }
    }"#;

    #[test]
    fn test_build_columns_for_fields_and_arguments() {
        let set = build(&parse(DOCUMENT.as_bytes()).unwrap());
        let users = set.table("users").unwrap();

        assert_eq!(users.name, "users");
        assert_eq!(users.description, "Directory users");

        let data: Vec<(&str, ColumnType)> = users
            .data_columns()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect();
        assert_eq!(
            data,
            vec![
                ("age", ColumnType::Int),
                ("meta", ColumnType::Json),
                ("name", ColumnType::String),
            ]
        );

        let filters: Vec<(&str, ColumnType)> = users
            .filter_columns()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect();
        assert_eq!(
            filters,
            vec![("_id", ColumnType::String), ("_since", ColumnType::Timestamp)]
        );
    }

    #[test]
    fn test_key_columns_are_equality_with_requirement() {
        let set = build(&parse(DOCUMENT.as_bytes()).unwrap());
        let users = set.table("users").unwrap();

        let required: Vec<&str> = users.required_predicates().map(|k| k.name.as_str()).collect();
        let optional: Vec<&str> = users.optional_predicates().map(|k| k.name.as_str()).collect();
        assert_eq!(required, vec!["_id"]);
        assert_eq!(optional, vec!["_since"]);
        assert!(users
            .key_columns
            .iter()
            .all(|k| k.operators == vec![Operator::Eq]));
    }

    #[test]
    fn test_unknown_types_reject_only_their_endpoint() {
        let set = build(&parse(DOCUMENT.as_bytes()).unwrap());

        assert_eq!(
            set.tables.keys().collect::<Vec<_>>(),
            vec!["prices", "users"]
        );
        assert_eq!(set.rejected.len(), 2);

        match set.rejection("broken_field") {
            Some(DataError::SchemaType {
                endpoint,
                kind,
                name,
                type_name,
            }) => {
                assert_eq!(endpoint, "broken_field");
                assert_eq!(*kind, DeclarationKind::Field);
                assert_eq!(name, "score");
                assert_eq!(type_name, "float");
            }
            other => panic!("expected SchemaType, got {:?}", other),
        }

        match set.rejection("broken_argument") {
            Some(DataError::SchemaType { kind, name, .. }) => {
                assert_eq!(*kind, DeclarationKind::Argument);
                assert_eq!(name, "when");
            }
            other => panic!("expected SchemaType, got {:?}", other),
        }
    }

    #[test]
    fn test_argument_never_collides_with_field() {
        let doc = r#"{"t": {
            "name": "t",
            "url": "http://localhost",
            "fields": {"id": "int"},
            "arguments": {"id": {"type": "int"}}
        }}"#;
        let set = build(&parse(doc.as_bytes()).unwrap());
        let table = set.table("t").unwrap();

        assert_eq!(table.column("id").unwrap().origin, ColumnOrigin::Field);
        assert_eq!(table.column("_id").unwrap().origin, ColumnOrigin::Argument);
    }

    #[test]
    fn test_lookup_by_name_and_duplicate_names() {
        let doc = r#"{
            "a": {"name": "shared", "url": "http://localhost/a"},
            "b": {"name": "shared", "url": "http://localhost/b"}
        }"#;
        let set = build(&parse(doc.as_bytes()).unwrap());

        assert_eq!(set.table("shared").unwrap().name, "shared");
        assert!(set.table("a").is_some());
        assert!(matches!(
            set.rejection("b"),
            Some(DataError::MalformedDescription(_))
        ));
        assert_eq!(set.resolve("shared").unwrap(), "a");
        assert!(matches!(
            set.resolve("b"),
            Err(DataError::MalformedDescription(_))
        ));
    }

    #[test]
    fn test_table_name_matching_another_key_is_rejected() {
        let doc = r#"{
            "x": {"name": "y", "url": "http://localhost/x"},
            "y": {"name": "z", "url": "http://localhost/y"}
        }"#;
        let set = build(&parse(doc.as_bytes()).unwrap());

        assert_eq!(set.tables.keys().collect::<Vec<_>>(), vec!["y"]);
        assert!(matches!(
            set.rejection("x"),
            Some(DataError::MalformedDescription(_))
        ));
        assert_eq!(set.resolve("y").unwrap(), "y");
        assert_eq!(set.resolve("z").unwrap(), "y");
        assert!(matches!(
            set.resolve("x"),
            Err(DataError::MalformedDescription(_))
        ));
    }

    #[test]
    fn test_resolve_rejected_table_by_name() {
        let doc = r#"{
            "legacy_users": {
                "name": "users",
                "url": "http://localhost/users",
                "fields": {"score": "float"}
            }
        }"#;
        let set = build(&parse(doc.as_bytes()).unwrap());

        assert!(matches!(
            set.resolve("users"),
            Err(DataError::SchemaType { .. })
        ));
        assert!(matches!(
            set.resolve("legacy_users"),
            Err(DataError::SchemaType { .. })
        ));
        assert!(matches!(
            set.resolve("orders"),
            Err(DataError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_argument_column() {
        assert_eq!(argument_column("id"), "_id");
    }
}
