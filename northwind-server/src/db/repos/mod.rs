//! Repository implementations for database access
//!
//! Each repository call:
//! - acquires its own connection and releases it on every exit path
//! - runs fixed SQL with bound parameters
//! - rebuilds parent/child graphs client-side

pub mod products;

pub use products::{name_pattern, ProductRepo};
