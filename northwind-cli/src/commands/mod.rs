pub mod bench;
pub mod config;
pub mod product;
pub mod serve;

pub use bench::run_bench;
pub use config::run_config;
pub use product::run_product;
pub use serve::run_serve;

use anyhow::{Context, Result};
use clap::ValueEnum;

use northwind_core::config::DEFAULT_CONNECTION;
use northwind_core::{JoinStrategy, NorthwindConfig};
use northwind_server::db::{create_pool_with_options, PgPool};

/// Join strategy as a CLI value
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Two result sets from one batch, joined by product id
    QueryMultiple,
    /// One joined query, grouped while iterating
    MultiMapping,
}

impl From<StrategyArg> for JoinStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::QueryMultiple => JoinStrategy::QueryMultiple,
            StrategyArg::MultiMapping => JoinStrategy::MultiMapping,
        }
    }
}

const NO_DATABASE_HINT: &str =
    "No database configured. Set --database-url, DATABASE_URL, or [connection_strings] in northwind.toml";

/// Open a pool from `--database-url`, falling back to DATABASE_URL and the
/// configured default connection.
pub async fn connect(database_url: Option<String>, config: &NorthwindConfig) -> Result<PgPool> {
    let url = match database_url {
        Some(url) => url,
        None => config
            .connection_string(DEFAULT_CONNECTION)
            .context(NO_DATABASE_HINT)?,
    };

    create_pool_with_options(&url, config.server.max_connections)
        .await
        .context("Failed to create database pool")
}
