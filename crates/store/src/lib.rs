//! Persistence for the catalog, orders, users and reports.
//!
//! The store is the only place stock is decided: reservations and releases
//! are atomic checks-and-updates, and both order placement and order state
//! changes run as a single unit together with their stock effects.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{
    CatalogStore, CatalogStoreExt, OrderFilter, OrderStore, ReportStore, Store, UserStore,
};
