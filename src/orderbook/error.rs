use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orderbook::types::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OrderBookError {
    /// An order with this id is already resting
    #[error("Order {order_id} already exists")]
    DuplicateOrder { order_id: OrderId },

    /// No resting order carries this id
    #[error("Unknown order {order_id}")]
    UnknownOrder { order_id: OrderId },

    /// Order rejected at construction (zero price or quantity, missing field)
    #[error("Invalid order: {reason}")]
    InvalidOrder { reason: String },
}

impl OrderBookError {
    /// Short stable label, used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OrderBookError::DuplicateOrder { .. } => "duplicate_order",
            OrderBookError::UnknownOrder { .. } => "unknown_order",
            OrderBookError::InvalidOrder { .. } => "invalid_order",
        }
    }

    pub(crate) fn duplicate(order_id: &str) -> Self {
        OrderBookError::DuplicateOrder {
            order_id: order_id.to_string(),
        }
    }

    pub(crate) fn unknown(order_id: &str) -> Self {
        OrderBookError::UnknownOrder {
            order_id: order_id.to_string(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        OrderBookError::InvalidOrder {
            reason: reason.into(),
        }
    }
}

/// Result type for order book operations
pub type OrderBookResult<T> = Result<T, OrderBookError>;
