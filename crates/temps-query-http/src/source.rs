//! Where endpoint description documents come from

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use temps_query::{DataError, Result};
use tracing::{debug, error};

/// Provides the raw bytes of an endpoint description document
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Read the whole document
    async fn load(&self) -> Result<Vec<u8>>;

    /// Human readable location, used in logs and errors
    fn describe(&self) -> String;
}

/// Document stored on the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    async fn load(&self) -> Result<Vec<u8>> {
        debug!("Reading endpoint description from {}", self.path.display());
        tokio::fs::read(&self.path).await.map_err(|e| {
            error!(
                "Failed to read endpoint description {}: {}",
                self.path.display(),
                e
            );
            DataError::SourceUnavailable {
                source_name: self.describe(),
                cause: e.to_string(),
            }
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Document served over HTTP
pub struct UrlSource {
    client: Client,
    url: String,
}

impl UrlSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            DataError::Internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn unavailable(&self, cause: impl ToString) -> DataError {
        DataError::SourceUnavailable {
            source_name: self.describe(),
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
impl ConfigSource for UrlSource {
    async fn load(&self) -> Result<Vec<u8>> {
        debug!("Fetching endpoint description from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Failed to fetch endpoint description {}: {}", self.url, e);
            self.unavailable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "Endpoint description {} returned status {}",
                self.url, status
            );
            return Err(self.unavailable(format!("status {}", status)));
        }

        let body = response.bytes().await.map_err(|e| self.unavailable(e))?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Document held in memory, for embedding hosts and tests
pub struct StaticSource {
    bytes: Vec<u8>,
}

impl StaticSource {
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: document.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for StaticSource {
    async fn load(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        "<static>".to_string()
    }
}
