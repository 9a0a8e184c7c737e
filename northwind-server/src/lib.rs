//! northwind-server: product / order-detail queries over HTTP
//!
//! Runs fixed SQL against the `products` and `order_details` tables and
//! rebuilds product graphs client-side, either from a two-statement batch
//! (split-key join) or from one joined query (row-group mapping). Also
//! exposes micro-benchmarks comparing the two.

pub mod bench;
pub mod db;
pub mod http;

pub use bench::{run_benchmark, BenchmarkReport};
pub use db::{create_pool, DbError, ProductRepo};
pub use http::{run_server, ApiError, ServerConfig};
