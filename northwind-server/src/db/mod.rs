//! Database layer - connection pool, batches, row mapping, repositories
//!
//! # Design Principles
//!
//! - Every operation acquires its own pooled connection and releases it on drop
//! - Multi-statement batches are read as ordered result sets
//! - Joins between result sets happen client-side (see `northwind_core::join`)

pub mod batch;
pub mod error;
pub mod mapping;
pub mod pool;
pub mod repos;

pub use batch::{GridReader, SqlBatch, SqlParam};
pub use error::DbError;
pub use mapping::{split_on, FromRowSlice, RowSlice};
pub use pool::{create_pool, create_pool_with_options};
pub use sqlx::PgPool;
pub use repos::*;
