//! State changes computed by the order state machine.
//!
//! The aggregate decides whether a change is legal and which stock it gives
//! back; the store applies the resulting [`StateChange`] atomically, checking
//! that the persisted state still equals [`StateChange::from`].

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId};

use super::{Order, OrderError, OrderState};

/// Stock to hand back to a product when a change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRelease {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A validated transition of one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub order_id: OrderId,
    pub from: OrderState,
    pub to: OrderState,
    pub releases: Vec<StockRelease>,
    pub at: DateTime<Utc>,
}

impl StateChange {
    /// Returns true if applying the change returns stock.
    pub fn is_cancellation(&self) -> bool {
        self.to == OrderState::Cancelled
    }
}

impl Order {
    /// Validates a move to `target`.
    ///
    /// Moving to `Cancelled` is delegated to [`Order::cancel`] so the stock
    /// release always comes with it.
    pub fn transition(&self, target: OrderState) -> Result<StateChange, OrderError> {
        if target == OrderState::Cancelled {
            return self.cancel();
        }

        if !self.state().can_transition_to(target) {
            return Err(OrderError::InvalidTransition {
                from: self.state(),
                to: target,
            });
        }

        Ok(StateChange {
            order_id: self.id(),
            from: self.state(),
            to: target,
            releases: Vec::new(),
            at: Utc::now(),
        })
    }

    /// Validates a cancellation, returning every reserved quantity.
    pub fn cancel(&self) -> Result<StateChange, OrderError> {
        if !self.state().can_cancel() {
            return Err(OrderError::InvalidTransition {
                from: self.state(),
                to: OrderState::Cancelled,
            });
        }

        let releases = self
            .line_items()
            .iter()
            .map(|item| StockRelease {
                product_id: item.product_id(),
                quantity: item.quantity(),
            })
            .collect();

        Ok(StateChange {
            order_id: self.id(),
            from: self.state(),
            to: OrderState::Cancelled,
            releases,
            at: Utc::now(),
        })
    }

    /// Applies a change produced by [`Order::transition`] or [`Order::cancel`].
    ///
    /// Stores call this after persisting the change.
    pub fn apply(&mut self, change: &StateChange) -> Result<(), OrderError> {
        if change.order_id != self.id() || change.from != self.state() {
            return Err(OrderError::InvalidTransition {
                from: self.state(),
                to: change.to,
            });
        }
        self.set_state(change.to, change.at);
        Ok(())
    }
}
