//! Application services.
//!
//! Every write goes through a service: it evaluates the caller's
//! capabilities once, runs domain validation, and hands atomic work to the
//! store. Concurrent modifications of an order are retried once.

pub mod catalog_service;
pub mod error;
pub mod order_service;
pub mod report_service;
pub mod user_service;

pub use catalog_service::CatalogService;
pub use error::{ErrorKind, Result, ServiceError};
pub use order_service::{ChangeState, CreateOrder, OrderService};
pub use report_service::ReportService;
pub use user_service::UserService;
