//! One-shot product lookups printed as JSON

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use northwind_core::NorthwindConfig;
use northwind_server::db::ProductRepo;

use super::StrategyArg;

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("lookup").required(true).args(["id", "name"])))]
pub struct ProductArgs {
    /// Product id (prints one product with its order details)
    #[arg(long)]
    pub id: Option<i32>,

    /// Substring of the product name (prints every match)
    #[arg(long)]
    pub name: Option<String>,

    /// Join strategy for name lookups
    #[arg(long, value_enum, default_value = "query-multiple")]
    pub strategy: StrategyArg,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_product(args: ProductArgs, config: &NorthwindConfig) -> Result<()> {
    let pool = super::connect(args.database_url, config).await?;
    let repo = ProductRepo::new(&pool);

    let value = if let Some(id) = args.id {
        let product = repo
            .get_with_orders(id)
            .await
            .with_context(|| format!("Failed to load product {}", id))?;
        serde_json::to_value(product)?
    } else {
        let name = args.name.context("Either --id or --name is required")?;
        let products = repo
            .find(args.strategy.into(), &name)
            .await
            .with_context(|| format!("Failed to search products for '{}'", name))?;
        serde_json::to_value(products)?
    };

    let out = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", out);

    pool.close().await;
    Ok(())
}
