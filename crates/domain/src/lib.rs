//! Domain layer for the order management service.
//!
//! This crate holds the business rules and nothing else:
//! - Catalog entities (categories, products) and their validation
//! - The order aggregate, built once from requested lines with price snapshots
//! - The order state machine, which yields [`StateChange`]s for the store to apply
//! - Users, roles and capability checks
//! - Customer reports

pub mod catalog;
pub mod error;
pub mod order;
pub mod report;
pub mod user;

pub use catalog::{
    CatalogError, Category, CategoryChanges, MAX_PRICE, NewCategory, NewProduct, Product,
    ProductChanges,
};
pub use error::DomainError;
pub use order::{
    LineRequest, MAX_LINE_QUANTITY, Money, Order, OrderDraft, OrderError, OrderLineItem,
    OrderParts, OrderState, PaymentType, StateChange, StockRelease,
};
pub use report::{NewReport, Report, ReportChanges, ReportError, ReportType};
pub use user::{Actor, NewUser, Role, User, UserChanges, UserError, UserRecord};
