use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use toolhost_mcp::config::{DocumentsConfig, SheetsConfig};
use toolhost_mcp::session::serve_stdio;

#[derive(Parser)]
#[command(name = "toolhost-mcp")]
#[command(version)]
#[command(about = "MCP tool servers for a spreadsheet Q&A log and a text knowledge base")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "TOOLHOST_LOG",
        default_value = "info",
        help = "Log filter when RUST_LOG is unset"
    )]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Q&A tools backed by a Google Sheets spreadsheet
    Sheets(SheetsConfig),
    /// Serve the knowledge-base tools over a directory of .txt files
    Documents(DocumentsConfig),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    // Built before the runtime: the Sheets client owns a blocking HTTP
    // client, which must not be created or dropped inside async context.
    let server = Arc::new(match &cli.command {
        Commands::Sheets(config) => config.build_server(),
        Commands::Documents(config) => config.build_server(),
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let result = runtime.block_on(serve_stdio(Arc::clone(&server)));
    drop(runtime);
    drop(server);

    result
}
