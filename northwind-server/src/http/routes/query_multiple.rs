//! `/QueryMultiple` endpoints
//!
//! Product lookups that join order details client-side, plus the two
//! join-strategy benchmarks.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use northwind_core::{JoinStrategy, Product};

use crate::bench::{run_benchmark, HTTP_BENCHMARK_ITERATIONS, HTTP_BENCHMARK_NAME};
use crate::db::ProductRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// `?id=<int>`
#[derive(Debug, Deserialize)]
pub struct ProductIdParams {
    pub id: i32,
}

/// `?name=<string>`, defaulting to "chef"
#[derive(Debug, Deserialize)]
pub struct ProductNameParams {
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    "chef".to_string()
}

/// GET /QueryMultiple/GetProductAndOrderByProductId?id=
async fn get_product_and_order_by_product_id(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductIdParams>,
) -> Result<Json<Product>, ApiError> {
    let product = ProductRepo::new(&state.pool).get_with_orders(params.id).await?;
    Ok(Json(product))
}

/// GET /QueryMultiple/GetProductsByName?name=
async fn get_products_by_name(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductNameParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = ProductRepo::new(&state.pool).find_by_name(&params.name).await?;
    Ok(Json(products))
}

async fn benchmark(state: &AppState, strategy: JoinStrategy) -> Result<Json<u64>, ApiError> {
    let report = run_benchmark(
        &state.pool,
        strategy,
        HTTP_BENCHMARK_ITERATIONS,
        HTTP_BENCHMARK_NAME,
    )
    .await?;
    Ok(Json(report.elapsed_ms))
}

/// GET /QueryMultiple/QueryMultiplePerformance
async fn query_multiple_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<u64>, ApiError> {
    benchmark(&state, JoinStrategy::QueryMultiple).await
}

/// GET /QueryMultiple/MultiMappingMultiplePerformance
async fn multi_mapping_multiple_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<u64>, ApiError> {
    benchmark(&state, JoinStrategy::MultiMapping).await
}

/// QueryMultiple routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/QueryMultiple/GetProductAndOrderByProductId",
            get(get_product_and_order_by_product_id),
        )
        .route("/QueryMultiple/GetProductsByName", get(get_products_by_name))
        .route(
            "/QueryMultiple/QueryMultiplePerformance",
            get(query_multiple_performance),
        )
        .route(
            "/QueryMultiple/MultiMappingMultiplePerformance",
            get(multi_mapping_multiple_performance),
        )
}
