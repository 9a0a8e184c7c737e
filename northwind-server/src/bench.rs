//! Join-strategy micro-benchmarks
//!
//! Runs one name lookup many times in a tight sequential loop. Every
//! iteration acquires and releases its own connection. Reports total wall
//! time only; there is no warm-up or variance reporting.

use std::time::Instant;

use serde::Serialize;
use sqlx::PgPool;

use northwind_core::JoinStrategy;

use crate::db::{DbError, ProductRepo};

/// Iterations used by the HTTP benchmark endpoints
pub const HTTP_BENCHMARK_ITERATIONS: u32 = 5000;

/// Name fragment used by the HTTP benchmark endpoints
pub const HTTP_BENCHMARK_NAME: &str = "chef";

/// Outcome of one benchmark run
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub strategy: JoinStrategy,
    pub iterations: u32,
    pub elapsed_ms: u64,
    /// Products returned by the last iteration
    pub products: usize,
    /// Order details returned by the last iteration
    pub order_details: usize,
}

/// Run `strategy` for `iterations` lookups of `name`.
///
/// Read-only: the queries never modify stored data.
pub async fn run_benchmark(
    pool: &PgPool,
    strategy: JoinStrategy,
    iterations: u32,
    name: &str,
) -> Result<BenchmarkReport, DbError> {
    let repo = ProductRepo::new(pool);
    let mut products = 0;
    let mut order_details = 0;

    tracing::info!(%strategy, iterations, name, "benchmark started");
    let started = Instant::now();

    for _ in 0..iterations {
        let found = repo.find(strategy, name).await?;
        products = found.len();
        order_details = found.iter().map(|p| p.order_count()).sum();
    }

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(%strategy, iterations, elapsed_ms, products, "benchmark finished");

    Ok(BenchmarkReport {
        strategy,
        iterations,
        elapsed_ms,
        products,
        order_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_serializes_strategy_name() {
        let report = BenchmarkReport {
            strategy: JoinStrategy::MultiMapping,
            iterations: 5000,
            elapsed_ms: 1234,
            products: 2,
            order_details: 31,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["strategy"], json!("multi-mapping"));
        assert_eq!(value["elapsed_ms"], json!(1234));
    }
}
