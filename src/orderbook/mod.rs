//! Core order book implementation module
//!
//! Price-sorted books per instrument, FIFO price levels, and the manager
//! that routes orders and owns the id-keyed order store.

pub mod book;
pub mod error;
pub mod manager;
pub mod price_level;
pub mod shared;
pub mod types;

// Re-export main types for convenience
pub use book::{OrderBook, OrderBookStats};
pub use error::{OrderBookError, OrderBookResult};
pub use manager::OrderBookManager;
pub use price_level::PriceLevel;
pub use shared::SharedOrderBookManager;
pub use types::{
    generate_order_id, BookSnapshot, Instrument, Order, OrderId, OrderRequest, OrderStore, Price,
    PriceLevelInfo, Quantity, Side,
};
