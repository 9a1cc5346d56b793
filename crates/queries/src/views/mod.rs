//! Display rows and details built from domain entities.

pub mod catalog;
pub mod orders;
pub mod reports;
pub mod users;

pub use catalog::{CategoryListQuery, ProductListQuery, ProductView};
pub use orders::{OrderDetail, OrderLineView, OrderListQuery, OrderSummary};
pub use reports::{ReportListQuery, ReportView, RoleView};
pub use users::UserListQuery;
