//! HTTP JSON implementation of the temps-query DataSource trait
//!
//! Exposes arbitrary HTTP JSON endpoints as tables. Every endpoint is
//! declared in a description document: its URL, static headers, the fields
//! of the returned objects and the arguments a query can filter on.
//!
//! ## Tables
//!
//! - Every declared field becomes a data column of the declared type
//! - Every declared argument becomes a filter column named `_<argument>`
//!   that supports equality only, and is required unless marked `optional`
//! - A query binds its predicates to the request query string, issues one
//!   GET, and streams the objects of the returned JSON array as rows with
//!   the filter values written back into every row
//!
//! ## Example
//!
//! ```rust,no_run
//! use temps_query::{CancellationToken, Predicates, RowStream};
//! use temps_query_http::{DocumentLocation, HttpSource, HttpSourceConfig};
//!
//! # async fn example() -> temps_query::Result<()> {
//! let config = HttpSourceConfig::new(DocumentLocation::File("endpoints.json".into()));
//! let source = HttpSource::new(config)?;
//!
//! let mut predicates = Predicates::new();
//! predicates.insert("_id".to_string(), "42".to_string());
//!
//! let rows = source
//!     .collect_rows("users", &predicates, Some(10), &CancellationToken::new())
//!     .await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod catalog;
pub mod config;
pub mod endpoint;
pub mod http_source;
pub mod schema;
pub mod source;
pub mod streamer;
pub mod types;

pub use binder::{bind, BoundArguments};
pub use catalog::{EndpointCatalog, ReloadPolicy};
pub use config::{DocumentLocation, HttpSourceConfig, BACKEND_TYPE};
pub use endpoint::{ArgumentSpec, EndpointDefinition, Endpoints};
pub use http_source::{HttpSource, HttpSourceFactory};
pub use schema::{argument_column, Rejection, SchemaSet, ARGUMENT_PREFIX};
pub use source::{ConfigSource, FileSource, StaticSource, UrlSource};
pub use streamer::RowStreamer;
pub use types::TYPE_NAMES;
