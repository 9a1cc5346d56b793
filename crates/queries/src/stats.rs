//! Dashboard statistics.

use domain::{Money, Order, OrderState, Product};
use serde::Serialize;

/// How many orders are in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateCount {
    pub state: OrderState,
    pub count: usize,
}

/// Order figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    /// Sum of the totals of every order that was not cancelled, clamped at the maximum amount.
    pub total_sales: Money,
    /// Orders still being worked on (pending or processing).
    pub active_orders: usize,
    /// One entry per state, in lifecycle order, zero counts included.
    pub by_state: Vec<StateCount>,
}

impl OrderStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut counts = [0usize; OrderState::ALL.len()];
        let mut total_orders = 0;
        let mut total_sales = Money::zero();

        for order in orders {
            total_orders += 1;
            if let Some(slot) = OrderState::ALL.iter().position(|s| *s == order.state()) {
                counts[slot] += 1;
            }
            if order.state() != OrderState::Cancelled {
                total_sales = total_sales.saturating_add(order.total());
            }
        }

        let by_state: Vec<StateCount> = OrderState::ALL
            .iter()
            .zip(counts)
            .map(|(state, count)| StateCount {
                state: *state,
                count,
            })
            .collect();
        let active_orders = by_state
            .iter()
            .filter(|c| c.state.is_active())
            .map(|c| c.count)
            .sum();

        Self {
            total_orders,
            total_sales,
            active_orders,
            by_state,
        }
    }

    pub fn count(&self, state: OrderState) -> usize {
        self.by_state
            .iter()
            .find(|c| c.state == state)
            .map_or(0, |c| c.count)
    }
}

/// Inventory figures for the dashboard. Untracked stock is never low or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub active_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub low_stock_threshold: u32,
}

impl InventoryStats {
    pub fn from_products<'a>(
        products: impl IntoIterator<Item = &'a Product>,
        low_stock_threshold: u32,
    ) -> Self {
        let mut stats = Self {
            total_products: 0,
            active_products: 0,
            low_stock: 0,
            out_of_stock: 0,
            low_stock_threshold,
        };
        for product in products {
            stats.total_products += 1;
            stats.active_products += usize::from(product.active);
            stats.low_stock += usize::from(product.is_low_stock(low_stock_threshold));
            stats.out_of_stock += usize::from(product.is_out_of_stock());
        }
        stats
    }
}
