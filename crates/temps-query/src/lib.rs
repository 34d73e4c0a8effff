//! # temps-query
//!
//! Core abstractions for exposing external data as queryable tables.
//!
//! A backend describes its tables at runtime (columns, filter columns and
//! whether a query must constrain them) and streams rows for a query given
//! the equality predicates the query supplies.
//!
//! ## Architecture
//!
//! - **DataSource**: Core trait for table discovery and schema lookup
//! - **RowStream**: Streams the rows of a table into a [`RowSink`], with early stop and cancellation
//! - **DataSourceFactory** / **QueryRegistry**: one source per configured connection
//!
//! ## Example
//!
//! ```rust
//! use temps_query::{ConnectionConfig, QueryRegistry};
//!
//! # async fn example() -> temps_query::Result<()> {
//! let registry = QueryRegistry::new();
//!
//! let config = ConnectionConfig::new("http")
//!     .with_option("endpoints_file", "endpoints.json");
//!
//! // Requires factory registration first
//! // let source = registry.create_source("my-api", config).await?;
//! // let tables = source.list_tables().await?;
//! # let _ = (registry, config);
//! # Ok(())
//! # }
//! ```
//!
//! Backend crates:
//! - `temps-query-http` - HTTP JSON endpoints described in a declarative document

pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{DataError, DeclarationKind, Result};
pub use registry::{ConnectionConfig, DataSourceFactory, QueryRegistry};
pub use traits::{DataSource, RowSink, RowStream};
pub use types::{
    ColumnDef, ColumnOrigin, ColumnType, DataRow, KeyColumn, Operator, Predicates, QueryStats,
    Requirement, StreamControl, TableSchema,
};
pub use tokio_util::sync::CancellationToken;
