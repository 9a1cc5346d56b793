//! Shared types for the order management service.

pub mod types;

pub use types::{CategoryId, OrderId, ProductId, ReportId, UserId};
