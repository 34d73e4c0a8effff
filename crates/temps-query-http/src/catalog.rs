//! Reload policy for the endpoint description document

use crate::endpoint::{self, Endpoints};
use crate::source::ConfigSource;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use temps_query::{DataError, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// When the description document is read again
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ReloadPolicy {
    /// Read the document on every schema discovery and every query
    #[default]
    Always,
    /// Read once and reuse the snapshot until [`EndpointCatalog::invalidate`]
    Manual,
}

impl FromStr for ReloadPolicy {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(ReloadPolicy::Always),
            "manual" => Ok(ReloadPolicy::Manual),
            other => Err(DataError::invalid_configuration(format!(
                "Unknown reload policy '{}', expected 'always' or 'manual'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadPolicy::Always => write!(f, "always"),
            ReloadPolicy::Manual => write!(f, "manual"),
        }
    }
}

/// Hands out immutable snapshots of the endpoint definitions
pub struct EndpointCatalog {
    source: Arc<dyn ConfigSource>,
    policy: ReloadPolicy,
    snapshot: RwLock<Option<Arc<Endpoints>>>,
}

impl EndpointCatalog {
    pub fn new(source: Arc<dyn ConfigSource>, policy: ReloadPolicy) -> Self {
        Self {
            source,
            policy,
            snapshot: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Current endpoint definitions according to the reload policy
    pub async fn endpoints(&self) -> Result<Arc<Endpoints>> {
        match self.policy {
            ReloadPolicy::Always => Ok(Arc::new(endpoint::load(self.source.as_ref()).await?)),
            ReloadPolicy::Manual => {
                if let Some(snapshot) = self.snapshot.read().await.as_ref() {
                    return Ok(snapshot.clone());
                }

                let mut guard = self.snapshot.write().await;
                // Another caller may have loaded while we waited for the lock
                if let Some(snapshot) = guard.as_ref() {
                    return Ok(snapshot.clone());
                }

                let loaded = Arc::new(endpoint::load(self.source.as_ref()).await?);
                *guard = Some(loaded.clone());
                Ok(loaded)
            }
        }
    }

    /// Drop the cached snapshot so the next call reads the document again
    pub async fn invalidate(&self) {
        debug!("Invalidating endpoint snapshot of {}", self.source.describe());
        *self.snapshot.write().await = None;
    }
}
