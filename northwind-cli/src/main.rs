//! northwind CLI - product / order-detail query service
//!
//! Entry point for the `northwind` binary:
//! - `serve`: run the HTTP API
//! - `product`: run a product lookup once and print the JSON
//! - `bench`: compare the two join strategies
//! - `config`: inspect the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use northwind_core::NorthwindConfig;

mod commands;
mod env;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "northwind",
    author,
    version,
    about = "Product and order-detail queries with client-side joins",
    long_about = "Serve and benchmark product lookups that read two result sets from one \
                  SQL batch, or group a single joined query, into product/order-detail graphs."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP
    #[cfg(feature = "telemetry")]
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Look up products and print them as JSON
    Product(commands::product::ProductArgs),
    /// Time the join strategies against the database
    Bench(commands::bench::BenchArgs),
    /// Show config file location or effective config
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = env::load_dotenv();

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        #[cfg(feature = "telemetry")]
        otel: cli.otel,
    };
    tracing_setup::init(&tracing_config)?;
    dotenv.log();

    let config = NorthwindConfig::load().context("Failed to load northwind config")?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config).await,
        Commands::Product(args) => commands::run_product(args, &config).await,
        Commands::Bench(args) => commands::run_bench(args, &config).await,
        Commands::Config(args) => commands::run_config(args, &config),
    };

    tracing_setup::shutdown_otel();
    result
}
