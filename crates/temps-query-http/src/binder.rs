//! Binds query predicates to endpoint arguments

use crate::endpoint::EndpointDefinition;
use crate::schema::argument_column;
use std::collections::BTreeMap;
use temps_query::{DataError, Predicates, Result};
use tracing::debug;

/// Argument values of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    /// Argument name -> value, sent as the request query string
    pub query_params: BTreeMap<String, String>,
    /// Filter column name -> value, written into every returned row
    pub echo_values: BTreeMap<String, String>,
}

/// Validate `predicates` against the endpoint arguments and split them into
/// request parameters and echo values
///
/// Arguments are checked in name order, so the reported missing argument is
/// the first required one by name. Predicates on columns that are not
/// arguments of the endpoint are ignored.
pub fn bind(definition: &EndpointDefinition, predicates: &Predicates) -> Result<BoundArguments> {
    let mut bound = BoundArguments::default();

    for (name, spec) in &definition.arguments {
        let column = argument_column(name);

        match predicates.get(&column) {
            Some(value) => {
                debug!("Bound argument {}={} for {}", name, value, definition.name);
                bound.query_params.insert(name.clone(), value.clone());
                bound.echo_values.insert(column, value.clone());
            }
            None if !spec.optional => {
                return Err(DataError::MissingArgument(name.clone()));
            }
            None => {}
        }
    }

    Ok(bound)
}
