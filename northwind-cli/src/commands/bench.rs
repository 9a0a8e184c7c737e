//! Join-strategy benchmark command

use anyhow::{Context, Result};
use clap::Parser;

use northwind_core::{JoinStrategy, NorthwindConfig};
use northwind_server::run_benchmark;

use super::StrategyArg;

#[derive(Parser, Debug)]
pub struct BenchArgs {
    /// Strategy to time (default: both, one after the other)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Lookups per strategy (default: [benchmark].iterations)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: Option<u32>,

    /// Product name substring to look up (default: [benchmark].name)
    #[arg(long)]
    pub name: Option<String>,

    /// Print reports as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_bench(args: BenchArgs, config: &NorthwindConfig) -> Result<()> {
    let iterations = args.iterations.unwrap_or(config.benchmark.iterations);
    let name = args.name.unwrap_or_else(|| config.benchmark.name.clone());
    let strategies: Vec<JoinStrategy> = match args.strategy {
        Some(s) => vec![s.into()],
        None => JoinStrategy::ALL.to_vec(),
    };

    let pool = super::connect(args.database_url, config).await?;

    for strategy in strategies {
        let report = run_benchmark(&pool, strategy, iterations, &name)
            .await
            .with_context(|| format!("Benchmark '{}' failed", strategy))?;

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "{:<15} {:>8} ms  ({} iterations, {} products, {} order details)",
                report.strategy.as_str(),
                report.elapsed_ms,
                report.iterations,
                report.products,
                report.order_details
            );
        }
    }

    pool.close().await;
    Ok(())
}
