pub mod query;
pub mod tables;

pub use query::QueryCommand;
pub use tables::TablesCommand;

use clap::Args;
use std::path::PathBuf;
use temps_query::ConnectionConfig;
use temps_query_http::BACKEND_TYPE;

/// Where to find the endpoint description and how to reach the endpoints
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path of the endpoint description document
    #[arg(long, env = "TEMPS_ENDPOINTS_FILE", conflicts_with = "endpoints_url")]
    pub endpoints_file: Option<PathBuf>,

    /// URL of the endpoint description document
    #[arg(long, env = "TEMPS_ENDPOINTS_URL")]
    pub endpoints_url: Option<String>,

    /// Timeout of every outbound request, in seconds
    #[arg(long, default_value_t = 30, env = "TEMPS_HTTP_TIMEOUT")]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(BACKEND_TYPE)
            .with_option("timeout_secs", self.timeout_secs.to_string());

        if let Some(file) = &self.endpoints_file {
            config = config.with_option("endpoints_file", file.to_string_lossy());
        }
        if let Some(url) = &self.endpoints_url {
            config = config.with_option("endpoints_url", url.clone());
        }

        config
    }
}
