use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::orderbook::error::{OrderBookError, OrderBookResult};

pub type OrderId = String;
pub type Instrument = String;
pub type Price = u64; // Price in ticks, never fractional
pub type Quantity = u64;

/// Owning store of resting orders; price levels hold keys into it
pub type OrderStore = HashMap<OrderId, Order>;

/// Fresh order id for callers without their own id scheme
pub fn generate_order_id() -> OrderId {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A resting limit order.
///
/// Construction goes through [`Order::new`] (or serde, which routes through
/// the same checks), so a live `Order` always has a non-empty id and
/// instrument and a positive price and quantity. Only the quantity changes
/// afterwards, and only through the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderRequest")]
pub struct Order {
    order_id: OrderId,
    instrument: Instrument,
    side: Side,
    price: Price,
    quantity: Quantity,
}

impl Order {
    pub fn new(
        order_id: impl Into<OrderId>,
        instrument: impl Into<Instrument>,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> OrderBookResult<Self> {
        let order_id = order_id.into();
        let instrument = instrument.into();

        if order_id.is_empty() {
            return Err(OrderBookError::invalid("order id is required"));
        }
        if instrument.is_empty() {
            return Err(OrderBookError::invalid("instrument is required"));
        }
        if price == 0 {
            return Err(OrderBookError::invalid("price must be positive"));
        }
        if quantity == 0 {
            return Err(OrderBookError::invalid("quantity must be positive"));
        }

        Ok(Self {
            order_id,
            instrument,
            side,
            price,
            quantity,
        })
    }

    /// Same as [`Order::new`] with a generated UUID id
    pub fn with_generated_id(
        instrument: impl Into<Instrument>,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> OrderBookResult<Self> {
        Self::new(generate_order_id(), instrument, side, price, quantity)
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// quantity × price for this order, saturating at `u64::MAX`
    pub fn volume(&self) -> u64 {
        self.quantity.saturating_mul(self.price)
    }

    pub(crate) fn set_quantity(&mut self, quantity: Quantity) -> OrderBookResult<()> {
        if quantity == 0 {
            return Err(OrderBookError::invalid("quantity must be positive"));
        }
        self.quantity = quantity;
        Ok(())
    }
}

/// Unvalidated order payload as received from a service layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub instrument: Instrument,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl TryFrom<OrderRequest> for Order {
    type Error = OrderBookError;

    fn try_from(request: OrderRequest) -> Result<Self, Self::Error> {
        Order::new(
            request.order_id,
            request.instrument,
            request.side,
            request.price,
            request.quantity,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevelInfo {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: Instrument,
    pub timestamp: DateTime<Utc>,
    pub bids: Vec<PriceLevelInfo>,
    pub asks: Vec<PriceLevelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_creation() {
        let order = Order::new("order1", "TEST.0", Side::Buy, 200, 10).unwrap();

        assert_eq!(order.order_id(), "order1");
        assert_eq!(order.instrument(), "TEST.0");
        assert_eq!(order.side(), Side::Buy);
        assert_eq!(order.price(), 200);
        assert_eq!(order.quantity(), 10);
        assert_eq!(order.volume(), 2000);
    }

    #[test]
    fn test_invalid_orders_rejected() {
        let zero_price = Order::new("a", "TEST", Side::Buy, 0, 10);
        assert!(matches!(zero_price, Err(OrderBookError::InvalidOrder { .. })));

        let zero_quantity = Order::new("a", "TEST", Side::Sell, 100, 0);
        assert!(matches!(zero_quantity, Err(OrderBookError::InvalidOrder { .. })));

        let no_id = Order::new("", "TEST", Side::Buy, 100, 10);
        assert!(matches!(no_id, Err(OrderBookError::InvalidOrder { .. })));

        let no_instrument = Order::new("a", "", Side::Buy, 100, 10);
        assert!(matches!(no_instrument, Err(OrderBookError::InvalidOrder { .. })));
    }

    #[test]
    fn test_set_quantity_rejects_zero() {
        let mut order = Order::new("a", "TEST", Side::Buy, 100, 10).unwrap();
        assert!(order.set_quantity(0).is_err());
        assert_eq!(order.quantity(), 10);

        order.set_quantity(25).unwrap();
        assert_eq!(order.quantity(), 25);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Order::with_generated_id("TEST", Side::Buy, 100, 1).unwrap();
        let b = Order::with_generated_id("TEST", Side::Buy, 100, 1).unwrap();
        assert_ne!(a.order_id(), b.order_id());
        assert!(Uuid::parse_str(a.order_id()).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"order_id":"x1","instrument":"BTC-USD","side":"Sell","price":300,"quantity":10}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.side(), Side::Sell);
        assert_eq!(order.volume(), 3000);

        let json = r#"{"order_id":"x1","instrument":"BTC-USD","side":"Sell","price":0,"quantity":10}"#;
        assert!(serde_json::from_str::<Order>(json).is_err());

        let json = r#"{"order_id":"x1","side":"Sell","price":300,"quantity":10}"#;
        assert!(serde_json::from_str::<Order>(json).is_err());
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }
}
