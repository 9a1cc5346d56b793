//! Order service: creation, state changes and cancellation.

use std::collections::HashMap;
use std::time::Instant;

use common::{OrderId, UserId};
use domain::{
    Actor, LineRequest, Order, OrderDraft, OrderState, PaymentType, StateChange, order::merge_lines,
};
use serde::Deserialize;
use store::{CatalogStoreExt, Store, StoreError};

use crate::error::{Result, ServiceError};

/// How many times a state change is re-read and re-validated after losing a race.
const MAX_CONFLICT_RETRIES: u32 = 1;

/// Request to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOrder {
    #[serde(alias = "userId")]
    pub user_id: UserId,
    #[serde(alias = "paymentType")]
    pub payment_type: PaymentType,
    pub lines: Vec<LineRequest>,
}

impl CreateOrder {
    pub fn new(user_id: UserId, payment_type: PaymentType, lines: Vec<LineRequest>) -> Self {
        Self {
            user_id,
            payment_type,
            lines,
        }
    }
}

/// Request to move an order to another state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChangeState {
    #[serde(alias = "estado")]
    pub state: OrderState,
}

/// Service for managing orders.
///
/// The service loads what it needs, lets the aggregate decide, and hands the
/// decision to the store, which applies it atomically with its stock effects.
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order: validates the lines, snapshots prices and reserves
    /// stock for every line, all or nothing.
    #[tracing::instrument(
        skip(self, request),
        fields(actor = %actor.user_id, user_id = %request.user_id, lines = request.lines.len())
    )]
    pub async fn create_order(&self, actor: Actor, request: CreateOrder) -> Result<Order> {
        let started = Instant::now();

        if !actor.can_create_order_for(request.user_id) {
            return Err(ServiceError::forbidden("place orders for another user"));
        }

        let user = self
            .store
            .get_user(request.user_id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "User",
                id: request.user_id.as_i64(),
            })?;
        if !user.active {
            return Err(ServiceError::Inactive {
                entity: "User",
                id: user.id.as_i64(),
            });
        }

        let lines = merge_lines(&request.lines)?;
        let mut products = HashMap::with_capacity(lines.len());
        for line in &lines {
            let product = self.store.find_active_product(line.product_id).await?;
            products.insert(product.id, product);
        }

        let draft = OrderDraft::build(request.user_id, request.payment_type, &lines, &products)?;

        let order = match self.store.place_order(draft).await {
            Ok(order) => order,
            Err(e @ StoreError::InsufficientStock { .. }) => {
                metrics::counter!("stock_conflicts_total").increment(1);
                tracing::warn!(error = %e, "order rejected for insufficient stock");
                return Err(e.into());
            }
            Err(e) => return Err(log_store_failure(e)),
        };

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id(),
            code = order.code(),
            total = %order.total(),
            "order created"
        );

        Ok(order)
    }

    /// Moves an order to `target`.
    ///
    /// Only staff may drive the fulfillment pipeline. Moving to `CANCELLED`
    /// is a cancellation and follows [`Self::cancel_order`]'s rules.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn change_state(
        &self,
        actor: Actor,
        order_id: OrderId,
        target: OrderState,
    ) -> Result<Order> {
        if target == OrderState::Cancelled {
            return self.cancel_order(actor, order_id).await;
        }
        if !actor.role.can_manage_orders() {
            return Err(ServiceError::forbidden("change the state of orders"));
        }

        self.execute(order_id, |order| Ok(order.transition(target)?))
            .await
    }

    /// Cancels a pending order and returns its reserved stock.
    ///
    /// Staff may cancel any order; customers only their own.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn cancel_order(&self, actor: Actor, order_id: OrderId) -> Result<Order> {
        self.execute(order_id, |order| {
            if !actor.can_cancel_order(order.user_id()) {
                return Err(ServiceError::forbidden("cancel this order"));
            }
            Ok(order.cancel()?)
        })
        .await
    }

    /// Loads an order the actor is allowed to see.
    pub async fn get_order(&self, actor: Actor, order_id: OrderId) -> Result<Order> {
        let order = self.load(order_id).await?;
        if !actor.can_view_order(order.user_id()) {
            return Err(ServiceError::forbidden("view this order"));
        }
        Ok(order)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Order",
                id: order_id.as_i64(),
            })
    }

    /// Reads the current order, lets `decide` compute a change and applies it.
    ///
    /// If the store reports that the order changed in between, the order is
    /// re-read and `decide` runs again, at most [`MAX_CONFLICT_RETRIES`] times.
    async fn execute<F>(&self, order_id: OrderId, decide: F) -> Result<Order>
    where
        F: Fn(&Order) -> Result<StateChange> + Send + Sync,
    {
        let mut retries = 0;
        loop {
            let order = self.load(order_id).await?;
            let change = decide(&order)?;

            match self.store.apply_state_change(&change).await {
                Ok(updated) => {
                    record_change(&change);
                    return Ok(updated);
                }
                Err(StoreError::ConcurrencyConflict {
                    expected, actual, ..
                }) if retries < MAX_CONFLICT_RETRIES => {
                    retries += 1;
                    metrics::counter!("order_retries_total").increment(1);
                    tracing::warn!(
                        %order_id,
                        %expected,
                        %actual,
                        "order modified concurrently, retrying"
                    );
                }
                Err(e @ StoreError::ConcurrencyConflict { .. }) => {
                    tracing::warn!(%order_id, error = %e, "order modified concurrently, giving up");
                    return Err(e.into());
                }
                Err(e) => return Err(log_store_failure(e)),
            }
        }
    }
}

fn record_change(change: &StateChange) {
    metrics::counter!("order_transitions_total", "to" => change.to.as_str()).increment(1);
    if change.is_cancellation() {
        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(
            order_id = %change.order_id,
            released_lines = change.releases.len(),
            "order cancelled"
        );
    } else {
        tracing::info!(
            order_id = %change.order_id,
            from = %change.from,
            to = %change.to,
            "order state changed"
        );
    }
}

fn log_store_failure(e: StoreError) -> ServiceError {
    let err = ServiceError::from(e);
    if matches!(err, ServiceError::Persistence(_)) {
        tracing::error!(error = %err, "order write failed, nothing was applied");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_accepts_camel_case_body() {
        let request: CreateOrder = serde_json::from_str(
            r#"{"userId": 7, "paymentType": "EFECTIVO", "lines": [{"productId": 1, "quantity": 2}]}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, UserId::new(7));
        assert_eq!(request.payment_type, PaymentType::Cash);
        assert_eq!(request.lines.len(), 1);
    }

    #[test]
    fn test_change_state_accepts_estado() {
        let request: ChangeState = serde_json::from_str(r#"{"estado": "PROCESANDO"}"#).unwrap();
        assert_eq!(request.state, OrderState::Processing);

        let request: ChangeState = serde_json::from_str(r#"{"state": "DELIVERED"}"#).unwrap();
        assert_eq!(request.state, OrderState::Delivered);
    }
}
