use super::ConnectionArgs;
use anyhow::bail;
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use temps_query::{
    CancellationToken, DataError, DataRow, DataSource, Predicates, QueryRegistry, RowStream,
    StreamControl, TableSchema,
};
use temps_query_http::HttpSourceFactory;
use tracing::{info, warn};

#[derive(Args)]
pub struct QueryCommand {
    /// Table to query
    table: String,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Equality predicate on a filter column, e.g. `--where _id=42`
    #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_predicate)]
    predicates: Vec<(String, String)>,

    /// Stop after this many rows
    #[arg(long)]
    limit: Option<usize>,
}

fn parse_predicate(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", raw))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }
    Ok((column.to_string(), value.to_string()))
}

/// Reject predicates on columns the table does not filter on
fn check_predicates(schema: &TableSchema, predicates: &Predicates) -> anyhow::Result<()> {
    for column in predicates.keys() {
        if !schema.key_columns.iter().any(|k| &k.name == column) {
            let known: Vec<&str> = schema.key_columns.iter().map(|k| k.name.as_str()).collect();
            bail!(
                "Column '{}' is not a filter column of table '{}' (filter columns: {})",
                column,
                schema.name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            );
        }
    }
    Ok(())
}

/// Attach which stage of the query failed to a source error
fn describe_failure(table: &str, err: DataError) -> anyhow::Error {
    let stage = if err.is_schema_error() {
        "is not available"
    } else if err.is_query_error() {
        "could not be queried"
    } else {
        "failed"
    };
    anyhow::Error::new(err).context(format!("Table '{}' {}", table, stage))
}

fn write_row(out: &mut impl Write, row: &DataRow) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, row)?;
    writeln!(out)?;
    Ok(())
}

impl QueryCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let registry = QueryRegistry::new();
        registry
            .register_factory(Arc::new(HttpSourceFactory))
            .await?;
        let source = registry
            .create_source("cli", self.connection.connection_config())
            .await?;

        let schema = source
            .get_schema(&self.table)
            .await
            .map_err(|e| describe_failure(&self.table, e))?;
        let predicates: Predicates = self.predicates.into_iter().collect();
        check_predicates(&schema, &predicates)?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling query");
                on_interrupt.cancel();
            }
        });

        if self.limit == Some(0) {
            return Ok(());
        }

        let mut out = std::io::BufWriter::new(std::io::stdout());
        let mut write_error = None;
        let limit = self.limit;
        let mut emitted = 0usize;

        let mut sink = |row: DataRow| {
            if let Err(e) = write_row(&mut out, &row) {
                write_error = Some(e);
                return StreamControl::Stop;
            }
            emitted += 1;
            match limit {
                Some(limit) if emitted >= limit => StreamControl::Stop,
                _ => StreamControl::Continue,
            }
        };

        let stats = source
            .stream_rows(&self.table, &predicates, &mut sink, &cancel)
            .await
            .map_err(|e| describe_failure(&self.table, e))?;

        if let Some(e) = write_error {
            return Err(e);
        }
        out.flush()?;

        info!(
            "{} rows from {} in {}ms{}",
            stats.row_count,
            schema.name,
            stats.execution_ms,
            if stats.stopped_early { " (limit reached)" } else { "" }
        );
        Ok(())
    }
}
