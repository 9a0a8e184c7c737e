//! Database-backed tests for the product repository, benchmarks and routes.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p northwind-server -- --ignored

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tower::ServiceExt;

use northwind_core::{JoinStrategy, OrderDetail, Product};
use northwind_server::db::{create_pool, DbError, ProductRepo, SqlBatch};
use northwind_server::http::build_router;
use northwind_server::run_benchmark;

// Schema + seed run once per test binary; concurrent CREATE TABLE races otherwise
static SEEDED: OnceCell<()> = OnceCell::const_new();

async fn seeded_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.expect("pool creation failed");

    SEEDED
        .get_or_init(|| async {
            sqlx::raw_sql(include_str!("fixtures/schema.sql"))
                .execute(&pool)
                .await
                .expect("schema failed");
            sqlx::raw_sql(include_str!("fixtures/seed.sql"))
                .execute(&pool)
                .await
                .expect("seed failed");
        })
        .await;
    pool
}

static SMALLINT_SCHEMA: OnceCell<()> = OnceCell::const_new();

/// Pool whose connections resolve `products` / `order_details` to the
/// smallint/real/integer variant of the schema.
async fn smallint_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");

    SMALLINT_SCHEMA
        .get_or_init(|| async {
            let setup = create_pool(&url).await.expect("pool creation failed");
            sqlx::raw_sql(include_str!("fixtures/smallint_schema.sql"))
                .execute(&setup)
                .await
                .expect("smallint schema failed");
        })
        .await;

    PgPoolOptions::new()
        .max_connections(2)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET search_path TO northwind_smallint")
                    .execute(conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .expect("pool creation failed")
}

async fn get_json(pool: PgPool, uri: &str) -> serde_json::Value {
    let response = build_router(pool, false)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn row_counts(pool: &PgPool) -> (i64, i64) {
    let products: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .unwrap();
    let details: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_details")
        .fetch_one(pool)
        .await
        .unwrap();
    (products.0, details.0)
}

#[tokio::test]
#[ignore = "requires database"]
async fn product_by_id_has_all_its_details() {
    let pool = seeded_pool().await;
    let product = ProductRepo::new(&pool).get_with_orders(90001).await.unwrap();

    assert_eq!(product.product_name, "Fixture Chef Anton's Seasoning");
    let details = product.order_details.expect("details populated");
    assert_eq!(details.len(), 3);
    assert!(details.iter().all(|d| d.product_id == 90001));
}

#[tokio::test]
#[ignore = "requires database"]
async fn product_without_orders_has_empty_list() {
    let pool = seeded_pool().await;
    let product = ProductRepo::new(&pool).get_with_orders(90003).await.unwrap();

    assert_eq!(product.order_details, Some(vec![]));
    assert_eq!(product.unit_price, None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_id_is_not_found() {
    let pool = seeded_pool().await;
    let err = ProductRepo::new(&pool).get_with_orders(-1).await.unwrap_err();

    assert!(matches!(err, DbError::NotFound { resource: "product", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn read_single_rejects_several_rows() {
    let pool = seeded_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let mut grid = SqlBatch::new(
        "SELECT * FROM products WHERE product_name ILIKE $1 ORDER BY product_id;
         SELECT * FROM order_details WHERE false;",
    )
    .bind("%Fixture Chef Anton%")
    .query_multiple(&mut conn)
    .await
    .unwrap();
    assert_eq!(grid.remaining(), 2);

    let err = grid.read_single::<Product>().unwrap_err();
    assert!(matches!(err, DbError::Ambiguous { rows: 2 }), "got {:?}", err);

    let details = grid.read::<OrderDetail>().unwrap();
    assert!(details.is_empty());

    let err = grid.read::<OrderDetail>().unwrap_err();
    assert!(matches!(err, DbError::Consumed { sets: 2 }), "got {:?}", err);
}

#[tokio::test]
#[ignore = "requires database"]
async fn smallint_schema_decodes() {
    let pool = smallint_pool().await;
    let repo = ProductRepo::new(&pool);

    let seasoning = repo.get_with_orders(4).await.unwrap();
    assert_eq!(seasoning.product_name, "Chef Anton's Cajun Seasoning");
    assert_eq!(seasoning.unit_price, Some(22.0));
    assert_eq!(seasoning.units_in_stock, Some(53));
    assert!(!seasoning.discontinued);
    let details = seasoning.order_details.expect("details populated");
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].order_id, 10250);
    assert_eq!(details[0].unit_price, 17.5);
    assert_eq!(details[1].discount, 0.25);

    let gumbo = repo.get_with_orders(5).await.unwrap();
    assert!(gumbo.discontinued);
    assert_eq!(gumbo.unit_price, Some(21.25));
}

#[tokio::test]
#[ignore = "requires database"]
async fn smallint_schema_strategies_agree() {
    let pool = smallint_pool().await;
    let repo = ProductRepo::new(&pool);

    let split = repo.find(JoinStrategy::QueryMultiple, "chef").await.unwrap();
    let grouped = repo.find(JoinStrategy::MultiMapping, "chef").await.unwrap();
    assert_eq!(split, grouped);

    let ids: Vec<i32> = split.iter().map(|p| p.product_id).collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(split[0].order_count(), 2);
    assert_eq!(split[1].order_count(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn backslash_in_name_matches_literally() {
    let pool = seeded_pool().await;
    let repo = ProductRepo::new(&pool);

    for strategy in JoinStrategy::ALL {
        let found = repo.find(strategy, "\\").await.unwrap();
        assert!(
            found.iter().any(|p| p.product_id == 90005),
            "{} missed the backslash product",
            strategy
        );
        assert!(found.iter().all(|p| p.product_name.contains('\\')));
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn unmatched_name_is_empty_list() {
    let pool = seeded_pool().await;
    let repo = ProductRepo::new(&pool);

    for strategy in JoinStrategy::ALL {
        let found = repo.find(strategy, "no product is called this").await.unwrap();
        assert!(found.is_empty(), "{} returned products", strategy);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn name_match_is_case_insensitive_substring() {
    let pool = seeded_pool().await;
    let found = ProductRepo::new(&pool)
        .find_by_name("fixture chef anton")
        .await
        .unwrap();

    let ids: Vec<i32> = found.iter().map(|p| p.product_id).collect();
    assert_eq!(ids, vec![90001, 90002]);
    assert_eq!(found[0].order_count(), 3);
    assert_eq!(found[1].order_count(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn quotes_in_name_are_bound_safely() {
    let pool = seeded_pool().await;
    let found = ProductRepo::new(&pool)
        .find_by_name("Anton's Gumbo")
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].product_id, 90002);
}

#[tokio::test]
#[ignore = "requires database"]
async fn strategies_build_identical_products() {
    let pool = seeded_pool().await;
    let repo = ProductRepo::new(&pool);

    for name in ["Fixture", "Fixture Chef", "Pavlova", "Empty Shelf"] {
        let split = repo.find(JoinStrategy::QueryMultiple, name).await.unwrap();
        let grouped = repo.find(JoinStrategy::MultiMapping, name).await.unwrap();
        assert_eq!(split, grouped, "strategies disagree for '{}'", name);
    }

    let all = repo.find(JoinStrategy::MultiMapping, "Fixture").await.unwrap();
    let mut ids: Vec<i32> = all.iter().map(|p| p.product_id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
#[ignore = "requires database"]
async fn benchmarks_do_not_mutate_data() {
    let pool = seeded_pool().await;
    let before = row_counts(&pool).await;

    for strategy in JoinStrategy::ALL {
        let report = run_benchmark(&pool, strategy, 3, "Fixture Chef").await.unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.products, 3);
        assert_eq!(report.order_details, 5);
    }

    assert_eq!(row_counts(&pool).await, before);
}

#[tokio::test]
#[ignore = "requires database"]
async fn product_route_serializes_camel_case() {
    let pool = seeded_pool().await;
    let response = build_router(pool, false)
        .oneshot(
            Request::get("/QueryMultiple/GetProductAndOrderByProductId?id=90002")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["productId"], 90002);
    assert_eq!(value["discontinued"], true);
    assert_eq!(value["orderDetails"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_product_route_is_404() {
    let pool = seeded_pool().await;
    let response = build_router(pool, false)
        .oneshot(
            Request::get("/QueryMultiple/GetProductAndOrderByProductId?id=-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn query_multiple_benchmark_route_returns_milliseconds() {
    let pool = seeded_pool().await;
    let value = get_json(pool, "/QueryMultiple/QueryMultiplePerformance").await;
    assert!(value.is_u64(), "expected a bare integer, got {}", value);
}

#[tokio::test]
#[ignore = "requires database"]
async fn multi_mapping_benchmark_route_returns_milliseconds() {
    let pool = seeded_pool().await;
    let value = get_json(pool, "/QueryMultiple/MultiMappingMultiplePerformance").await;
    assert!(value.is_u64(), "expected a bare integer, got {}", value);
}
