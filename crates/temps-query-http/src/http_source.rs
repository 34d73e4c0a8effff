use crate::binder::bind;
use crate::catalog::{EndpointCatalog, ReloadPolicy};
use crate::config::{HttpSourceConfig, BACKEND_TYPE};
use crate::endpoint::Endpoints;
use crate::schema::{self, SchemaSet};
use crate::source::ConfigSource;
use crate::streamer::RowStreamer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use temps_query::{
    ConnectionConfig, DataError, DataSource, DataSourceFactory, Predicates, QueryStats, Result,
    RowSink, RowStream, TableSchema,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

/// HTTP JSON data source: one table per configured endpoint
pub struct HttpSource {
    catalog: EndpointCatalog,
    streamer: RowStreamer,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let source = config.config_source()?;
        Self::from_source(source, config.reload, config.timeout)
    }

    /// Build a source around any description document provider
    pub fn from_source(
        source: Arc<dyn ConfigSource>,
        reload: ReloadPolicy,
        timeout: Duration,
    ) -> Result<Self> {
        debug!(
            "Creating HTTP source for {} (reload: {})",
            source.describe(),
            reload
        );

        Ok(Self {
            catalog: EndpointCatalog::new(source, reload),
            streamer: RowStreamer::new(timeout)?,
        })
    }

    /// Build the schemas of all endpoints, including the rejected ones
    pub async fn schema_set(&self) -> Result<SchemaSet> {
        let endpoints = self.catalog.endpoints().await?;
        Ok(schema::build(&endpoints))
    }

    /// Force the next call to read the description document again
    pub async fn invalidate(&self) {
        self.catalog.invalidate().await;
    }

    async fn load_endpoints(&self, cancel: &CancellationToken) -> Result<Arc<Endpoints>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DataError::Cancelled),
            endpoints = self.catalog.endpoints() => endpoints,
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn source_type(&self) -> &'static str {
        BACKEND_TYPE
    }

    async fn list_tables(&self) -> Result<Vec<TableSchema>> {
        let set = self.schema_set().await?;
        Ok(set.tables.into_values().collect())
    }

    async fn get_schema(&self, table: &str) -> Result<TableSchema> {
        let mut set = self.schema_set().await?;
        let key = set.resolve(table)?.to_string();

        set.tables
            .remove(&key)
            .ok_or_else(|| DataError::table_not_found(table))
    }
}

#[async_trait]
impl RowStream for HttpSource {
    async fn stream_rows(
        &self,
        table: &str,
        predicates: &Predicates,
        sink: &mut dyn RowSink,
        cancel: &CancellationToken,
    ) -> Result<QueryStats> {
        let endpoints = self.load_endpoints(cancel).await?;

        // Only tables that discovery exposes are queryable
        let set = schema::build(&endpoints);
        let definition = endpoints
            .get(set.resolve(table)?)
            .ok_or_else(|| DataError::table_not_found(table))?;
        let bound = bind(definition, predicates)?;

        self.streamer
            .stream(definition, &bound, sink, cancel)
            .instrument(info_span!("stream_rows", table = %definition.name))
            .await
    }
}

/// Creates [`HttpSource`]s for connections with backend `http`
pub struct HttpSourceFactory;

impl DataSourceFactory for HttpSourceFactory {
    fn backend_type(&self) -> &'static str {
        BACKEND_TYPE
    }

    fn create_source(&self, config: ConnectionConfig) -> Result<Arc<dyn RowStream>> {
        let settings = HttpSourceConfig::from_connection(&config)?;
        Ok(Arc::new(HttpSource::new(settings)?))
    }
}
