pub mod config;
pub mod error;
pub mod join;
pub mod model;

pub use config::{BenchmarkSection, ConnectionStrings, NorthwindConfig, ServerSection};
pub use error::{NorthwindError, Result};
pub use join::{
    attach_children, attach_order_details, group_product_rows, group_rows, JoinStrategy, RowGrouper,
};
pub use model::{OrderDetail, Product};
