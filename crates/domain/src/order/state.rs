//! Order state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Processing ──┬──► Completed ──► Delivered
///    │                     └──────────────────► Delivered
///    └──► Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Stock is only touched when the
/// order is placed and when it is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Order placed, stock reserved, awaiting staff.
    #[default]
    #[serde(alias = "PENDIENTE")]
    Pending,

    /// Staff is preparing the order.
    #[serde(alias = "PROCESANDO")]
    Processing,

    /// Order is ready.
    #[serde(alias = "COMPLETADO")]
    Completed,

    /// Order was handed over to the customer (terminal state).
    #[serde(alias = "ENTREGADO")]
    Delivered,

    /// Order was cancelled and its stock returned (terminal state).
    #[serde(alias = "CANCELADO")]
    Cancelled,
}

impl OrderState {
    /// Every state, in lifecycle order.
    pub const ALL: [OrderState; 5] = [
        OrderState::Pending,
        OrderState::Processing,
        OrderState::Completed,
        OrderState::Delivered,
        OrderState::Cancelled,
    ];

    /// Returns the states reachable from this one in a single step.
    pub fn allowed_transitions(&self) -> &'static [OrderState] {
        match self {
            OrderState::Pending => &[OrderState::Processing, OrderState::Cancelled],
            OrderState::Processing => &[OrderState::Completed, OrderState::Delivered],
            OrderState::Completed => &[OrderState::Delivered],
            OrderState::Delivered | OrderState::Cancelled => &[],
        }
    }

    /// Returns true if `target` is reachable from this state in a single step.
    pub fn can_transition_to(&self, target: OrderState) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderState::Pending)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Returns true for orders staff still has to work on.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderState::Pending | OrderState::Processing)
    }

    /// Returns the wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "PENDING",
            OrderState::Processing => "PROCESSING",
            OrderState::Completed => "COMPLETED",
            OrderState::Delivered => "DELIVERED",
            OrderState::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not a known order state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order state: {0}")]
pub struct ParseOrderStateError(pub String);

impl FromStr for OrderState {
    type Err = ParseOrderStateError;

    /// Parses a state name case-insensitively, accepting the legacy Spanish names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => Ok(OrderState::Pending),
            "PROCESSING" | "PROCESANDO" => Ok(OrderState::Processing),
            "COMPLETED" | "COMPLETADO" => Ok(OrderState::Completed),
            "DELIVERED" | "ENTREGADO" => Ok(OrderState::Delivered),
            "CANCELLED" | "CANCELADO" => Ok(OrderState::Cancelled),
            _ => Err(ParseOrderStateError(s.to_string())),
        }
    }
}
