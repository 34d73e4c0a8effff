//! temps-query CLI - query HTTP JSON endpoints as tables
//!
//! Loads an endpoint description document, lists the tables it defines and
//! runs equality-filtered queries against them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{QueryCommand, TablesCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "TEMPS_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "TEMPS_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables defined by an endpoint description
    Tables(TablesCommand),
    /// Stream the rows of a table as JSON lines
    Query(QueryCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        _ => tracing_subscriber::EnvFilter::new(format!(
            "temps_query={level},\
             temps_query_http={level},\
             reqwest=warn,\
             hyper=warn,\
             hyper_util=warn",
            level = cli.log_level
        )),
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Tables(tables_cmd) => tables_cmd.execute(),
        Commands::Query(query_cmd) => query_cmd.execute(),
    }
}
