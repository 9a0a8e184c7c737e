//! Product and order-detail records.
//!
//! Records are built fresh from each query response. A product's detail
//! list stays `None` until a join populates it.

use serde::{Deserialize, Serialize};

/// A row of the `products` table, optionally enriched with its order details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    pub quantity_per_unit: Option<String>,
    pub unit_price: Option<f64>,
    pub units_in_stock: Option<i16>,
    pub units_on_order: Option<i16>,
    pub reorder_level: Option<i16>,
    pub discontinued: bool,
    /// Populated only by a join; `None` means "not loaded", not "no orders"
    pub order_details: Option<Vec<OrderDetail>>,
}

impl Product {
    /// Bare product with only the required columns set
    pub fn new(product_id: i32, product_name: impl Into<String>) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            supplier_id: None,
            category_id: None,
            quantity_per_unit: None,
            unit_price: None,
            units_in_stock: None,
            units_on_order: None,
            reorder_level: None,
            discontinued: false,
            order_details: None,
        }
    }

    /// Number of attached order details (0 when not loaded)
    pub fn order_count(&self) -> usize {
        self.order_details.as_ref().map_or(0, Vec::len)
    }
}

/// A row of the `order_details` table. Identity is `(product_id, order_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: i32,
    pub product_id: i32,
    pub unit_price: f64,
    pub quantity: i16,
    pub discount: f32,
}

impl OrderDetail {
    /// Composite identity of the detail row
    pub fn key(&self) -> (i32, i32) {
        (self.product_id, self.order_id)
    }
}
