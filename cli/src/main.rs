mod query_cmd;
mod scan_cmd;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use query_cmd::QueryArgs;
use scan_cmd::ScanArgs;
use tracing_subscriber::EnvFilter;
use typeindex_model::IndexKind;

/// Build and query type-relationship indexes.
#[derive(Debug, Parser)]
#[command(name = "typeindex", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a type manifest and write both index artifacts
    Scan(ScanArgs),

    /// List indexed subtypes of a type
    Subclasses(QueryArgs),

    /// List indexed types carrying an annotation
    Annotated(QueryArgs),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => scan_cmd::run_scan(args),
        Command::Subclasses(args) => query_cmd::run_query(IndexKind::Subclass, args),
        Command::Annotated(args) => query_cmd::run_query(IndexKind::Annotation, args),
    }
}
