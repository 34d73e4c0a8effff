use super::ConnectionArgs;
use clap::Args;
use colored::Colorize;
use temps_query::{ColumnOrigin, DataError, TableSchema};
use temps_query_http::{HttpSource, HttpSourceConfig, TYPE_NAMES};
use tracing::debug;

#[derive(Args)]
pub struct TablesCommand {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Print the schemas as JSON instead of a listing
    #[arg(long)]
    json: bool,
}

impl TablesCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = HttpSourceConfig::from_connection(&self.connection.connection_config())?;
        let source = HttpSource::new(settings)?;

        let rt = tokio::runtime::Runtime::new()?;
        let set = rt.block_on(source.schema_set())?;
        debug!(
            "Discovered {} tables, {} rejected",
            set.tables.len(),
            set.rejected.len()
        );

        if self.json {
            let tables: Vec<&TableSchema> = set.tables.values().collect();
            println!("{}", serde_json::to_string_pretty(&tables)?);
        } else {
            for table in set.tables.values() {
                print_table(table);
            }
        }

        for rejection in &set.rejected {
            eprintln!(
                "{} {}: {}",
                "Skipped endpoint".bright_yellow().bold(),
                rejection.endpoint,
                rejection.error
            );
        }
        if set
            .rejected
            .iter()
            .any(|r| matches!(r.error, DataError::SchemaType { .. }))
        {
            eprintln!("{}", supported_types_hint().bright_black());
        }

        Ok(())
    }
}

fn supported_types_hint() -> String {
    format!("Supported types: {}", TYPE_NAMES.join(", "))
}

fn print_table(table: &TableSchema) {
    println!();
    println!("{}", table.name.bright_white().bold());
    if !table.description.is_empty() {
        println!("  {}", table.description);
    }

    for column in &table.columns {
        let marker = match column.origin {
            ColumnOrigin::Field => String::new(),
            ColumnOrigin::Argument => table
                .key_columns
                .iter()
                .find(|k| k.name == column.name)
                .map(|k| format!("  [= {}]", k.require))
                .unwrap_or_default(),
        };
        println!(
            "  {:<24} {:<10}{}",
            column.name,
            column.column_type.to_string().bright_cyan(),
            marker.bright_black()
        );
    }
}
