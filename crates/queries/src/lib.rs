//! Read side for listing screens and the dashboard.
//!
//! This crate never mutates state:
//! - [`Page`] and [`SearchTerm`] implement the shared filter and pagination rules
//! - `views` turn domain entities into display rows and details
//! - `stats` computes the dashboard figures
//! - [`QueryService`] loads from the store and applies visibility rules

pub mod page;
pub mod query_service;
pub mod search;
pub mod stats;
pub mod views;

pub use page::Page;
pub use query_service::QueryService;
pub use search::SearchTerm;
pub use stats::{InventoryStats, OrderStats, StateCount};
pub use views::{
    CategoryListQuery, OrderDetail, OrderLineView, OrderListQuery, OrderSummary, ProductListQuery,
    ProductView, ReportListQuery, ReportView, RoleView, UserListQuery,
};
