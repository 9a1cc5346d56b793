//! Order aggregate, its state machine and related types.

mod aggregate;
mod machine;
mod state;
mod value_objects;

pub use aggregate::{MAX_LINE_QUANTITY, Order, OrderDraft, OrderParts, merge_lines, order_code};
pub use machine::{StateChange, StockRelease};
pub use state::{OrderState, ParseOrderStateError};
pub use value_objects::{
    LineRequest, Money, OrderLineItem, ParsePaymentTypeError, PaymentType,
};

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// An order needs at least one line.
    #[error("Order has no line items")]
    EmptyOrder,

    /// Invalid quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be at least 1)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// Merged quantity is above [`MAX_LINE_QUANTITY`].
    #[error("Quantity for product {product_id} exceeds the maximum of {MAX_LINE_QUANTITY} per order")]
    QuantityOverflow { product_id: ProductId },

    /// A line subtotal does not fit in a money amount.
    #[error("Amount for product {product_id} is too large")]
    AmountOverflow { product_id: ProductId },

    /// The order total does not fit in a money amount.
    #[error("Order total is too large")]
    TotalOverflow,

    /// A requested product does not exist.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// A requested product is no longer sold.
    #[error("Product {product_id} is inactive")]
    ProductInactive { product_id: ProductId },

    /// The state machine does not allow the move.
    #[error("Operation not allowed in current state: cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderState, to: OrderState },
}
