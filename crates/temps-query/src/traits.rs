use crate::error::Result;
use crate::types::*;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Core trait that all data sources must implement
/// Provides table discovery and schema inspection
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Get the type name of this data source
    fn source_type(&self) -> &'static str;

    /// Discover every table this source currently exposes
    /// Tables whose definition is invalid are left out rather than failing the call
    async fn list_tables(&self) -> Result<Vec<TableSchema>>;

    /// Get the schema of one table
    async fn get_schema(&self, table: &str) -> Result<TableSchema>;

    /// Close the source gracefully
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Receives rows one at a time and decides whether more are wanted
pub trait RowSink: Send {
    fn emit(&mut self, row: DataRow) -> StreamControl;
}

impl<F> RowSink for F
where
    F: FnMut(DataRow) -> StreamControl + Send,
{
    fn emit(&mut self, row: DataRow) -> StreamControl {
        self(row)
    }
}

/// Optional trait for sources that stream rows filtered by equality predicates
#[async_trait]
pub trait RowStream: DataSource {
    /// Stream the rows of `table` matching `predicates` into `sink`
    ///
    /// `predicates` maps filter column names to the value they must equal.
    /// Streaming stops as soon as the sink returns [`StreamControl::Stop`];
    /// cancelling `cancel` aborts the query with no further rows.
    async fn stream_rows(
        &self,
        table: &str,
        predicates: &Predicates,
        sink: &mut dyn RowSink,
        cancel: &CancellationToken,
    ) -> Result<QueryStats>;

    /// Collect up to `limit` rows into memory
    async fn collect_rows(
        &self,
        table: &str,
        predicates: &Predicates,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<DataRow>> {
        let mut rows = Vec::new();
        if limit == Some(0) {
            return Ok(rows);
        }
        let mut sink = |row: DataRow| {
            rows.push(row);
            match limit {
                Some(limit) if rows.len() >= limit => StreamControl::Stop,
                _ => StreamControl::Continue,
            }
        };
        self.stream_rows(table, predicates, &mut sink, cancel).await?;
        Ok(rows)
    }
}
