//! ethicist - MCP server for ethical analysis of AI systems
//!
//! Subcommands:
//! - `ethicist stdio` - Serve MCP over stdin/stdout (default)
//! - `ethicist serve` - Serve MCP over Streamable HTTP

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ethicist::config::EthicistConfig;
use ethicist::{serve, telemetry, Ethicist};

#[derive(Parser)]
#[command(name = "ethicist")]
#[command(about = "MCP server for ethical analysis of AI systems")]
#[command(version)]
struct Cli {
    /// Config file, used in place of ./ethicist.toml
    #[arg(short, long, global = true, env = "ETHICIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout
    Stdio,

    /// Serve MCP over Streamable HTTP
    Serve {
        /// Address to bind (default from config, 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config, 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = EthicistConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let telemetry = telemetry::init(&config.telemetry)?;
    info!(
        files = ?sources.files,
        env_overrides = ?sources.env_overrides,
        "configuration loaded"
    );

    let service = Arc::new(Ethicist::from_config(&config.llm).context("Tool registry is inconsistent")?);

    let result = match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => {
            info!("serving MCP over stdio");
            baton::serve_stdio(service).await.context("stdio transport failed")
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.http_port);
            serve::run(service, &host, port).await
        }
    };

    telemetry.shutdown();
    result
}
