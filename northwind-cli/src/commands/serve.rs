//! HTTP server command
//!
//! Runs the northwind HTTP server with the QueryMultiple routes.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use northwind_core::NorthwindConfig;
use northwind_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: [server].bind, else 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &NorthwindConfig) -> Result<()> {
    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
    };

    tracing::info!("Starting northwind server on {}", server_config.bind_addr);

    let pool = super::connect(args.database_url, config).await?;

    // Blocks until shutdown
    run_server(pool, server_config).await.context("Server error")?;

    Ok(())
}
