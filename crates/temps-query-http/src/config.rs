use crate::catalog::ReloadPolicy;
use crate::source::{ConfigSource, FileSource, UrlSource};
use crate::streamer::DEFAULT_TIMEOUT;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use temps_query::{ConnectionConfig, DataError, Result};
use tracing::debug;

pub const BACKEND_TYPE: &str = "http";

const ENDPOINTS_FILE: &str = "endpoints_file";
const ENDPOINTS_URL: &str = "endpoints_url";
const TIMEOUT_SECS: &str = "timeout_secs";
const RELOAD: &str = "reload";

/// Where the endpoint description document lives
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLocation {
    File(PathBuf),
    Url(String),
}

/// Settings of one HTTP connection
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSourceConfig {
    pub document: DocumentLocation,
    /// Timeout of every outbound request
    pub timeout: Duration,
    pub reload: ReloadPolicy,
}

impl HttpSourceConfig {
    pub fn new(document: DocumentLocation) -> Self {
        Self {
            document,
            timeout: DEFAULT_TIMEOUT,
            reload: ReloadPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_reload(mut self, reload: ReloadPolicy) -> Self {
        self.reload = reload;
        self
    }

    /// Read the settings from the options of a connection
    pub fn from_connection(config: &ConnectionConfig) -> Result<Self> {
        if config.backend != BACKEND_TYPE {
            return Err(DataError::invalid_configuration(format!(
                "Expected backend '{}', got '{}'",
                BACKEND_TYPE, config.backend
            )));
        }

        for key in config.options.keys() {
            if ![ENDPOINTS_FILE, ENDPOINTS_URL, TIMEOUT_SECS, RELOAD].contains(&key.as_str()) {
                debug!("Ignoring unknown connection option: {}", key);
            }
        }

        let document = match (config.option(ENDPOINTS_FILE), config.option(ENDPOINTS_URL)) {
            (Some(file), None) => DocumentLocation::File(PathBuf::from(file)),
            (None, Some(url)) => DocumentLocation::Url(url.to_string()),
            (Some(_), Some(_)) => {
                return Err(DataError::invalid_configuration(format!(
                    "Only one of '{}' and '{}' may be set",
                    ENDPOINTS_FILE, ENDPOINTS_URL
                )))
            }
            (None, None) => {
                return Err(DataError::invalid_configuration(format!(
                    "Missing '{}' option",
                    ENDPOINTS_FILE
                )))
            }
        };

        let mut settings = Self::new(document);
        if let Some(secs) = config.option_parse::<u64>(TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(DataError::invalid_configuration(format!(
                    "'{}' must be greater than zero",
                    TIMEOUT_SECS
                )));
            }
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(reload) = config.option(RELOAD) {
            settings.reload = reload.parse()?;
        }

        Ok(settings)
    }

    /// Open the description document source
    pub fn config_source(&self) -> Result<Arc<dyn ConfigSource>> {
        Ok(match &self.document {
            DocumentLocation::File(path) => Arc::new(FileSource::new(path.clone())),
            DocumentLocation::Url(url) => Arc::new(UrlSource::new(url.clone(), self.timeout)?),
        })
    }
}
