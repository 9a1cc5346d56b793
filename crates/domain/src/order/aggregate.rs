//! Order aggregate implementation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::Serialize;

use crate::catalog::Product;

use super::{LineRequest, Money, OrderError, OrderLineItem, OrderState, PaymentType};

/// Largest quantity of a single product one order may hold.
pub const MAX_LINE_QUANTITY: u32 = 1_000_000;

/// Validates requested lines and merges those referencing the same product.
///
/// Merged lines keep the position of the first occurrence of their product
/// and never exceed [`MAX_LINE_QUANTITY`].
pub fn merge_lines(requested: &[LineRequest]) -> Result<Vec<LineRequest>, OrderError> {
    if requested.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    let mut merged: Vec<LineRequest> = Vec::with_capacity(requested.len());
    for line in requested {
        if line.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        let overflow = OrderError::QuantityOverflow {
            product_id: line.product_id,
        };
        let quantity = match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| overflow.clone())?;
                existing.quantity
            }
            None => {
                merged.push(*line);
                line.quantity
            }
        };
        if quantity > MAX_LINE_QUANTITY {
            return Err(overflow);
        }
    }

    Ok(merged)
}

/// A validated order that has not been persisted yet.
///
/// Built from the requested lines and the products they reference. The
/// store turns a draft into an [`Order`] while reserving its stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    user_id: UserId,
    payment_type: PaymentType,
    line_items: Vec<OrderLineItem>,
    total: Money,
    created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Builds a draft, snapshotting the current price of every product.
    ///
    /// `products` must contain every requested product that exists; missing
    /// entries are reported as not found.
    pub fn build(
        user_id: UserId,
        payment_type: PaymentType,
        requested: &[LineRequest],
        products: &HashMap<ProductId, Product>,
    ) -> Result<Self, OrderError> {
        let merged = merge_lines(requested)?;

        let mut line_items = Vec::with_capacity(merged.len());
        for line in merged {
            let product = products
                .get(&line.product_id)
                .ok_or(OrderError::ProductNotFound {
                    product_id: line.product_id,
                })?;
            if !product.active {
                return Err(OrderError::ProductInactive {
                    product_id: line.product_id,
                });
            }
            line_items.push(OrderLineItem::new(
                line.product_id,
                line.quantity,
                product.price,
            )?);
        }

        let total = Money::checked_sum(line_items.iter().map(OrderLineItem::subtotal))
            .ok_or(OrderError::TotalOverflow)?;

        Ok(Self {
            user_id,
            payment_type,
            line_items,
            total,
            created_at: Utc::now(),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Persisted fields of an order, used by stores to rebuild it.
#[derive(Debug, Clone)]
pub struct OrderParts {
    pub id: OrderId,
    pub code: String,
    pub user_id: UserId,
    pub payment_type: PaymentType,
    pub state: OrderState,
    pub line_items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order aggregate root.
///
/// Line items and total are fixed when the order is placed; only the state
/// changes afterwards, through [`Order::transition`] and [`Order::cancel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    code: String,
    user_id: UserId,
    payment_type: PaymentType,
    state: OrderState,
    line_items: Vec<OrderLineItem>,
    total: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Turns a draft into a pending order with the given identifier.
    pub fn place(id: OrderId, draft: OrderDraft) -> Self {
        Self {
            id,
            code: order_code(id, draft.created_at),
            user_id: draft.user_id,
            payment_type: draft.payment_type,
            state: OrderState::Pending,
            line_items: draft.line_items,
            total: draft.total,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }

    /// Rebuilds an order from storage. The total is recomputed from the lines.
    pub fn restore(parts: OrderParts) -> Result<Self, OrderError> {
        let total = Money::checked_sum(parts.line_items.iter().map(OrderLineItem::subtotal))
            .ok_or(OrderError::TotalOverflow)?;
        Ok(Self {
            id: parts.id,
            code: parts.code,
            user_id: parts.user_id,
            payment_type: parts.payment_type,
            state: parts.state,
            line_items: parts.line_items,
            total,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the human-readable order code.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Returns the line item for a product, if any.
    pub fn line_item(&self, product_id: ProductId) -> Option<&OrderLineItem> {
        self.line_items
            .iter()
            .find(|item| item.product_id() == product_id)
    }

    /// Returns the total amount.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.line_items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub(super) fn set_state(&mut self, state: OrderState, at: DateTime<Utc>) {
        self.state = state;
        self.updated_at = at;
    }
}

/// Formats the order code, e.g. `ORD-20240131-000042`.
pub fn order_code(id: OrderId, created_at: DateTime<Utc>) -> String {
    format!("ORD-{}-{:06}", created_at.format("%Y%m%d"), id.as_i64())
}
