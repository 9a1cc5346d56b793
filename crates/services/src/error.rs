//! Service error types.

use common::{OrderId, ProductId};
use domain::{CatalogError, DomainError, OrderError, ReportError, UserError};
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

/// Failure classes callers react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Client input was malformed or broke a business rule; never retried.
    Validation,
    /// Not enough stock; the caller may adjust quantities.
    InsufficientStock,
    /// The order state machine refused the move.
    InvalidTransition,
    /// Someone else changed the order first; safe to retry.
    ConcurrentModification,
    NotFound,
    Inactive,
    /// A referential or uniqueness rule was violated.
    Conflict,
    Forbidden,
    /// Storage failed; nothing was partially applied.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::InvalidTransition => "INVALID_TRANSITION",
            ErrorKind::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Inactive => "INACTIVE",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Persistence => "PERSISTENCE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain rule rejected the request.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, only {available} available"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Order {order_id} was modified concurrently, please retry")]
    ConcurrentModification { order_id: OrderId },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} is inactive")]
    Inactive { entity: &'static str, id: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Persistence(#[source] StoreError),
}

impl ServiceError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(DomainError::Order(OrderError::InvalidTransition { .. })) => {
                ErrorKind::InvalidTransition
            }
            ServiceError::Domain(DomainError::Order(OrderError::ProductNotFound { .. })) => {
                ErrorKind::NotFound
            }
            ServiceError::Domain(DomainError::Order(OrderError::ProductInactive { .. })) => {
                ErrorKind::Inactive
            }
            ServiceError::Domain(_) => ErrorKind::Validation,
            ServiceError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            ServiceError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Inactive { .. } => ErrorKind::Inactive,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Returns true if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ConcurrentModification
    }

    /// Builds a `Forbidden` error for an action the caller may not perform.
    pub fn forbidden(action: &str) -> Self {
        ServiceError::Forbidden(format!("not allowed to {action}"))
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            StoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => ServiceError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            StoreError::ProductInactive(id) => ServiceError::Inactive {
                entity: "Product",
                id: id.as_i64(),
            },
            StoreError::CategoryInactive(id) => ServiceError::Inactive {
                entity: "Category",
                id: id.as_i64(),
            },
            e @ (StoreError::CategoryInUse { .. } | StoreError::DuplicateEmail(_)) => {
                ServiceError::Conflict(e.to_string())
            }
            StoreError::ConcurrencyConflict { order_id, .. } => {
                ServiceError::ConcurrentModification { order_id }
            }
            e @ (StoreError::Corrupt(_) | StoreError::Database(_) | StoreError::Migration(_)) => {
                ServiceError::Persistence(e)
            }
        }
    }
}

impl From<OrderError> for ServiceError {
    fn from(e: OrderError) -> Self {
        ServiceError::Domain(e.into())
    }
}

impl From<CatalogError> for ServiceError {
    fn from(e: CatalogError) -> Self {
        ServiceError::Domain(e.into())
    }
}

impl From<UserError> for ServiceError {
    fn from(e: UserError) -> Self {
        ServiceError::Domain(e.into())
    }
}

impl From<ReportError> for ServiceError {
    fn from(e: ReportError) -> Self {
        ServiceError::Domain(e.into())
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
