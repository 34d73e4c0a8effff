use crate::error::{DataError, Result};
use crate::traits::RowStream;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Connection configuration for creating data sources
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Backend type identifier (http, ...)
    pub backend: String,
    /// Backend-specific options as key-value pairs
    pub options: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Parse an option, failing with `InvalidConfiguration` when it is present but malformed
    pub fn option_parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.option(key) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|e| {
                DataError::InvalidConfiguration(format!(
                    "Option '{}' has invalid value '{}': {}",
                    key, raw, e
                ))
            }),
        }
    }
}

/// Factory trait for creating data sources from configurations
pub trait DataSourceFactory: Send + Sync {
    /// Get the backend type this factory handles
    fn backend_type(&self) -> &'static str;

    /// Create a data source from configuration
    fn create_source(&self, config: ConnectionConfig) -> Result<Arc<dyn RowStream>>;
}

/// Registry for managing data sources and their factories
///
/// Each connection gets its own source, so several connections backed by
/// different configurations can be queried side by side.
pub struct QueryRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<dyn DataSourceFactory>>>>,
    sources: Arc<RwLock<HashMap<String, Arc<dyn RowStream>>>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
            sources: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a factory for a backend type
    pub async fn register_factory(&self, factory: Arc<dyn DataSourceFactory>) -> Result<()> {
        let backend = factory.backend_type();
        let mut factories = self.factories.write().await;

        if factories.contains_key(backend) {
            warn!("Overwriting existing factory for backend: {}", backend);
        }

        factories.insert(backend.to_string(), factory);
        debug!("Registered factory for backend: {}", backend);
        Ok(())
    }

    /// Create a data source for a connection and keep it for later lookups
    pub async fn create_source(
        &self,
        connection: &str,
        config: ConnectionConfig,
    ) -> Result<Arc<dyn RowStream>> {
        let factories = self.factories.read().await;

        let factory = factories
            .get(&config.backend)
            .ok_or_else(|| {
                DataError::InvalidConfiguration(format!(
                    "No factory registered for backend: {}",
                    config.backend
                ))
            })?
            .clone();

        drop(factories);

        debug!(
            "Creating source for connection {} with backend: {}",
            connection, config.backend
        );

        let source = factory.create_source(config)?;

        let mut sources = self.sources.write().await;
        sources.insert(connection.to_string(), source.clone());

        Ok(source)
    }

    /// Get the source of a connection
    pub async fn get_source(&self, connection: &str) -> Option<Arc<dyn RowStream>> {
        let sources = self.sources.read().await;
        sources.get(connection).cloned()
    }

    /// Remove and close the source of a connection
    pub async fn remove_source(&self, connection: &str) -> Result<()> {
        let mut sources = self.sources.write().await;

        if let Some(source) = sources.remove(connection) {
            debug!("Closing source: {}", connection);
            source.close().await?;
        }

        Ok(())
    }

    /// List connections with a live source
    pub async fn list_sources(&self) -> Vec<String> {
        let sources = self.sources.read().await;
        let mut names: Vec<String> = sources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is registered
    pub async fn has_backend(&self, backend: &str) -> bool {
        let factories = self.factories.read().await;
        factories.contains_key(backend)
    }
}

impl Default for QueryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{DataSource, RowSink};
    use crate::types::{Predicates, QueryStats, TableSchema};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct EmptySource;

    #[async_trait]
    impl DataSource for EmptySource {
        fn source_type(&self) -> &'static str {
            "empty"
        }

        async fn list_tables(&self) -> Result<Vec<TableSchema>> {
            Ok(Vec::new())
        }

        async fn get_schema(&self, table: &str) -> Result<TableSchema> {
            Err(DataError::table_not_found(table))
        }
    }

    #[async_trait]
    impl RowStream for EmptySource {
        async fn stream_rows(
            &self,
            _table: &str,
            _predicates: &Predicates,
            _sink: &mut dyn RowSink,
            _cancel: &CancellationToken,
        ) -> Result<QueryStats> {
            Ok(QueryStats::default())
        }
    }

    struct EmptyFactory;

    impl DataSourceFactory for EmptyFactory {
        fn backend_type(&self) -> &'static str {
            "empty"
        }

        fn create_source(&self, _config: ConnectionConfig) -> Result<Arc<dyn RowStream>> {
            Ok(Arc::new(EmptySource))
        }
    }

    #[test]
    fn test_connection_config_options() {
        let config = ConnectionConfig::new("http")
            .with_option("endpoints_file", "/etc/endpoints.json")
            .with_option("timeout_secs", "5");

        assert_eq!(config.backend, "http");
        assert_eq!(config.option("endpoints_file"), Some("/etc/endpoints.json"));
        assert_eq!(config.option_parse::<u64>("timeout_secs").unwrap(), Some(5));
        assert_eq!(config.option_parse::<u64>("missing").unwrap(), None);
    }

    #[test]
    fn test_connection_config_bad_option() {
        let config = ConnectionConfig::new("http").with_option("timeout_secs", "soon");
        let err = config.option_parse::<u64>("timeout_secs").unwrap_err();
        assert!(matches!(err, DataError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_registry_creation() {
        let registry = QueryRegistry::new();
        assert!(registry.list_sources().await.is_empty());
        assert!(!registry.has_backend("empty").await);
    }

    #[tokio::test]
    async fn test_create_source_per_connection() {
        let registry = QueryRegistry::new();
        registry
            .register_factory(Arc::new(EmptyFactory))
            .await
            .unwrap();

        registry
            .create_source("b", ConnectionConfig::new("empty"))
            .await
            .unwrap();
        registry
            .create_source("a", ConnectionConfig::new("empty"))
            .await
            .unwrap();

        assert_eq!(registry.list_sources().await, vec!["a", "b"]);
        assert!(registry.get_source("a").await.is_some());

        registry.remove_source("a").await.unwrap();
        assert!(registry.get_source("a").await.is_none());
    }

    #[tokio::test]
    async fn test_create_source_unknown_backend() {
        let registry = QueryRegistry::new();
        let result = registry
            .create_source("c", ConnectionConfig::new("nope"))
            .await;
        assert!(matches!(result, Err(DataError::InvalidConfiguration(_))));
    }
}
