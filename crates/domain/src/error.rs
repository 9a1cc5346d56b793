//! Domain error types.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::order::OrderError;
use crate::report::ReportError;
use crate::user::UserError;

/// Any rule violation detected by the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An error occurred in the order aggregate.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Catalog input was rejected.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// User input was rejected.
    #[error(transparent)]
    User(#[from] UserError),

    /// Report input was rejected.
    #[error(transparent)]
    Report(#[from] ReportError),
}
