//! Executes the HTTP request of a query and streams the decoded rows

use crate::binder::BoundArguments;
use crate::endpoint::EndpointDefinition;
use reqwest::Client;
use serde_json::value::RawValue;
use serde_json::Value;
use std::time::{Duration, Instant};
use temps_query::{DataError, DataRow, QueryStats, Result, RowSink, StreamControl};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues one GET per query and hands the response rows to a sink
pub struct RowStreamer {
    client: Client,
    timeout: Duration,
}

impl RowStreamer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            DataError::Internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request URL of an endpoint with the bound query parameters appended
    pub fn request_url(
        definition: &EndpointDefinition,
        bound: &BoundArguments,
    ) -> Result<String> {
        if bound.query_params.is_empty() {
            return Ok(definition.url.clone());
        }

        let query = serde_urlencoded::to_string(&bound.query_params).map_err(|e| {
            DataError::Internal(format!("Failed to encode query parameters: {}", e))
        })?;
        let separator = if definition.url.contains('?') { '&' } else { '?' };

        Ok(format!("{}{}{}", definition.url, separator, query))
    }

    /// Run the request for `definition` and emit every row of the response
    ///
    /// Rows are emitted in response order with the echo values merged in;
    /// an echo value replaces a response field of the same name. Emission
    /// stops before the next element once the sink returns
    /// [`StreamControl::Stop`], and elements after that point are never
    /// decoded.
    pub async fn stream(
        &self,
        definition: &EndpointDefinition,
        bound: &BoundArguments,
        sink: &mut dyn RowSink,
        cancel: &CancellationToken,
    ) -> Result<QueryStats> {
        let start = Instant::now();
        let url = Self::request_url(definition, bound)?;

        debug!("GET {} for table {}", url, definition.name);

        let mut request = self.client.get(&url);
        for (name, value) in &definition.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DataError::Cancelled),
            response = request.send() => {
                response.map_err(|e| self.request_error(definition, &url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("GET {} returned status {}", url, status);
            return Err(DataError::RequestStatus {
                endpoint: definition.name.clone(),
                url,
                status: status.as_u16(),
            });
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DataError::Cancelled),
            body = response.bytes() => {
                body.map_err(|e| self.request_error(definition, &url, e))?
            }
        };

        let elements = split_array(&definition.name, &body)?;
        let total = elements.len();
        let mut stats = QueryStats::default();

        for (index, element) in elements.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DataError::Cancelled);
            }

            let mut row = decode_row(&definition.name, index, element)?;
            for (column, value) in &bound.echo_values {
                row.insert(column.clone(), Value::String(value.clone()));
            }

            stats.row_count += 1;
            if sink.emit(row) == StreamControl::Stop {
                stats.stopped_early = index + 1 < total;
                break;
            }
        }

        stats.execution_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Streamed {} of {} rows for {} in {}ms",
            stats.row_count, total, definition.name, stats.execution_ms
        );

        Ok(stats)
    }

    fn request_error(
        &self,
        definition: &EndpointDefinition,
        url: &str,
        e: reqwest::Error,
    ) -> DataError {
        error!("GET {} failed: {}", url, e);
        if e.is_timeout() {
            DataError::Timeout {
                endpoint: definition.name.clone(),
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            DataError::Request {
                endpoint: definition.name.clone(),
                url: url.to_string(),
                cause: e.to_string(),
            }
        }
    }
}

/// Split a response body into its array elements without decoding them
///
/// A `null` body counts as an empty array.
fn split_array(endpoint: &str, body: &[u8]) -> Result<Vec<Box<RawValue>>> {
    let elements: Option<Vec<Box<RawValue>>> =
        serde_json::from_slice(body).map_err(|e| DataError::ResponseParse {
            endpoint: endpoint.to_string(),
            cause: format!("expected a JSON array of objects: {}", e),
        })?;
    Ok(elements.unwrap_or_default())
}

fn decode_row(endpoint: &str, index: usize, element: &RawValue) -> Result<DataRow> {
    serde_json::from_str(element.get()).map_err(|e| DataError::ResponseParse {
        endpoint: endpoint.to_string(),
        cause: format!("element {} is not an object: {}", index, e),
    })
}
