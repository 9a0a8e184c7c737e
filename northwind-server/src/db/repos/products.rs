//! Product repository
//!
//! Three read paths over `products` and `order_details`:
//! - `get_with_orders`: two-statement batch, exactly one product expected
//! - `find_by_name`: two-statement batch, split-key join
//! - `find_by_name_joined`: one LEFT JOIN query, row-group mapping

use futures::TryStreamExt;
use sqlx::PgPool;

use northwind_core::{attach_order_details, JoinStrategy, OrderDetail, Product, RowGrouper};

use crate::db::batch::SqlBatch;
use crate::db::error::DbError;
use crate::db::mapping::{split_on, FromRowSlice};

const PRODUCT_WITH_ORDERS_SQL: &str = r#"
SELECT * FROM products WHERE product_id = $1;
SELECT * FROM order_details WHERE product_id = $1 ORDER BY order_id;
"#;

const PRODUCTS_BY_NAME_SQL: &str = r#"
SELECT * FROM products WHERE product_name ILIKE $1 ESCAPE '' ORDER BY product_id;
SELECT order_details.*
FROM order_details
JOIN products ON order_details.product_id = products.product_id
WHERE products.product_name ILIKE $1 ESCAPE ''
ORDER BY order_details.product_id, order_details.order_id;
"#;

const PRODUCTS_BY_NAME_JOINED_SQL: &str = r#"
SELECT *
FROM products
LEFT JOIN order_details ON order_details.product_id = products.product_id
WHERE products.product_name ILIKE $1 ESCAPE ''
ORDER BY products.product_id, order_details.order_id
"#;

/// First column of the `order_details` side of a joined row
const SPLIT_COLUMN: &str = "order_id";

/// Wrap a name fragment for a substring `ILIKE` match
pub fn name_pattern(name: &str) -> String {
    format!("%{}%", name)
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get one product with all of its order details.
    ///
    /// Fails with `NotFound` when no product has this id, and `Ambiguous`
    /// when the first statement returns several rows.
    pub async fn get_with_orders(&self, id: i32) -> Result<Product, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut grid = SqlBatch::new(PRODUCT_WITH_ORDERS_SQL)
            .bind(id)
            .query_multiple(&mut conn)
            .await?;

        let mut product: Product = grid.read_single().map_err(|e| match e {
            DbError::NoRows => DbError::NotFound {
                resource: "product",
                id: id.to_string(),
            },
            other => other,
        })?;
        product.order_details = Some(grid.read::<OrderDetail>()?);

        tracing::debug!(id, orders = product.order_count(), "loaded product");
        Ok(product)
    }

    /// Products whose name contains `name`, each with its order details.
    ///
    /// Reads two result sets from one batch and joins them by product id.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut grid = SqlBatch::new(PRODUCTS_BY_NAME_SQL)
            .bind(name_pattern(name))
            .query_multiple(&mut conn)
            .await?;

        let mut products: Vec<Product> = grid.read()?;
        let details: Vec<OrderDetail> = grid.read()?;
        attach_order_details(&mut products, details);

        Ok(products)
    }

    /// Same result as [`find_by_name`](Self::find_by_name), from one joined
    /// query grouped while the rows stream in.
    pub async fn find_by_name_joined(&self, name: &str) -> Result<Vec<Product>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut rows = sqlx::query(PRODUCTS_BY_NAME_JOINED_SQL)
            .bind(name_pattern(name))
            .fetch(&mut *conn);

        let mut grouper: RowGrouper<i32, Product, OrderDetail> = RowGrouper::new();
        while let Some(row) = rows.try_next().await? {
            let (parent, child) = split_on(&row, SPLIT_COLUMN)?;
            let product_id: i32 = parent.required_int("product_id")?;

            // LEFT JOIN: no order detail for this product
            let detail = if child.is_null(SPLIT_COLUMN)? {
                None
            } else {
                Some(OrderDetail::from_row_slice(&child)?)
            };
            grouper.try_push_with(product_id, || Product::from_row_slice(&parent), detail)?;
        }

        Ok(grouper.finish(|p, details| p.order_details = Some(details)))
    }

    /// Dispatch a name lookup to the given strategy
    pub async fn find(&self, strategy: JoinStrategy, name: &str) -> Result<Vec<Product>, DbError> {
        match strategy {
            JoinStrategy::QueryMultiple => self.find_by_name(name).await,
            JoinStrategy::MultiMapping => self.find_by_name_joined(name).await,
        }
    }
}
