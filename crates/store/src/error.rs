use common::{CategoryId, OrderId, ProductId};
use domain::OrderState;
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A reservation asked for more units than the product has.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product exists but has been deactivated.
    #[error("Product {0} is inactive")]
    ProductInactive(ProductId),

    /// The category exists but has been deactivated.
    #[error("Category {0} is inactive")]
    CategoryInactive(CategoryId),

    /// The category still has active products and cannot be deactivated.
    #[error("Category {category_id} still has {active_products} active product(s)")]
    CategoryInUse {
        category_id: CategoryId,
        active_products: i64,
    },

    /// Another user already registered this email address.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// The persisted order state differs from the state the change was computed from.
    #[error("Concurrency conflict for order {order_id}: expected state {expected}, found {actual}")]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: OrderState,
        actual: OrderState,
    },

    /// A stored value could not be mapped back into the domain.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn category_not_found(id: CategoryId) -> Self {
        Self::NotFound {
            entity: "Category",
            id: id.as_i64(),
        }
    }

    pub(crate) fn product_not_found(id: ProductId) -> Self {
        Self::NotFound {
            entity: "Product",
            id: id.as_i64(),
        }
    }

    pub(crate) fn order_not_found(id: OrderId) -> Self {
        Self::NotFound {
            entity: "Order",
            id: id.as_i64(),
        }
    }

    pub(crate) fn user_not_found(id: common::UserId) -> Self {
        Self::NotFound {
            entity: "User",
            id: id.as_i64(),
        }
    }

    pub(crate) fn report_not_found(id: common::ReportId) -> Self {
        Self::NotFound {
            entity: "Report",
            id: id.as_i64(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
