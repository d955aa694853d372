//! In-memory Limit Order Book Manager
//!
//! Tracks resting limit orders for any number of instruments and answers
//! price-level queries. Orders are kept in strict price-time priority; there
//! is no matching, so buy and sell sides never trade against each other.
//!
//! # Features
//!
//! - **Lazy Books**: an instrument's book appears with its first order
//! - **Price-Time Priority**: FIFO within a price level; a quantity increase
//!   sends the order to the back of its level, a decrease keeps its place
//! - **Single Order Store**: levels queue ids into one id-keyed store, so a
//!   quantity change is visible from every query path
//! - **Thread Safe Handle**: [`SharedOrderBookManager`] serializes mutations
//!   behind one `RwLock` while queries share read access
//! - **Monitoring**: `tracing` logs and `metrics` counters/gauges
//!
//! # Quick Start
//!
//! ```rust
//! use orderbook_manager::{Order, OrderBookManager, Side};
//!
//! let mut manager = OrderBookManager::new();
//!
//! manager.add_order(Order::new("o1", "BTC-USD", Side::Buy, 200, 10)?)?;
//! manager.add_order(Order::new("o2", "BTC-USD", Side::Buy, 200, 12)?)?;
//!
//! // Increasing o1 forfeits its place in the queue
//! manager.modify_order("o1", 1000)?;
//!
//! let queue: Vec<_> = manager
//!     .orders_at_level("BTC-USD", Side::Buy, 200)
//!     .iter()
//!     .map(|o| o.order_id())
//!     .collect();
//! assert_eq!(queue, ["o2", "o1"]);
//! assert_eq!(manager.best_price("BTC-USD", Side::Buy), Some(200));
//! assert_eq!(manager.best_price("ETH-USD", Side::Sell), None);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! 1. **Manager**: `HashMap<Instrument, OrderBook>` plus the order store
//!    `HashMap<OrderId, Order>`
//! 2. **Book**: one `BTreeMap<Price, PriceLevel>` per side
//! 3. **Level**: `VecDeque<OrderId>` in arrival order

pub mod config;
pub mod metrics;
pub mod orderbook;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigError, ManagerConfig};
pub use orderbook::{
    error::{OrderBookError, OrderBookResult},
    types::{BookSnapshot, Order, OrderId, Price, PriceLevelInfo, Quantity, Side},
    OrderBook, OrderBookManager, OrderBookStats, SharedOrderBookManager,
};

pub use crate::metrics::OrderBookMetrics;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::thread;

    fn order(id: &str, instrument: &str, side: Side, price: Price, quantity: Quantity) -> Order {
        Order::new(id, instrument, side, price, quantity).unwrap()
    }

    #[test]
    fn test_order_lifecycle() {
        let mut manager = OrderBookManager::new();

        manager.add_order(order("s1", "TEST", Side::Sell, 300, 10)).unwrap();
        manager.add_order(order("s2", "TEST", Side::Sell, 300, 10)).unwrap();
        manager.add_order(order("b1", "TEST", Side::Buy, 250, 5)).unwrap();

        assert_eq!(manager.total_quantity_at_level("TEST", Side::Sell, 300), 20);
        assert_eq!(manager.total_volume_at_level("TEST", Side::Sell, 300), 6000);
        assert_eq!(manager.spread("TEST"), Some(50));

        // Decrease in place, then increase to lose priority
        assert_eq!(manager.modify_order("s1", 4), Ok(true));
        assert_eq!(
            manager.orders_at_level("TEST", Side::Sell, 300)[0].order_id(),
            "s1"
        );
        assert_eq!(manager.modify_order("s1", 40), Ok(true));
        assert_eq!(
            manager.orders_at_level("TEST", Side::Sell, 300)[0].order_id(),
            "s2"
        );
        assert_eq!(manager.total_volume_at_level("TEST", Side::Sell, 300), 15000);

        assert_eq!(manager.delete_order("s2"), Ok(true));
        assert_eq!(manager.modify_order("s1", 0), Ok(true));
        assert_eq!(manager.best_price("TEST", Side::Sell), None);
        assert_eq!(manager.best_price("TEST", Side::Buy), Some(250));
        assert_eq!(manager.total_orders(), 1);
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut manager = OrderBookManager::new();
        manager.add_order(order("a", "TEST", Side::Buy, 100, 3)).unwrap();
        manager.add_order(order("b", "TEST", Side::Buy, 100, 4)).unwrap();

        for _ in 0..3 {
            assert_eq!(manager.best_price("TEST", Side::Buy), Some(100));
            assert_eq!(manager.order_num_at_level("TEST", Side::Buy, 100), 2);
            assert_eq!(manager.total_quantity_at_level("TEST", Side::Buy, 100), 7);
            assert_eq!(manager.total_volume_at_level("TEST", Side::Buy, 100), 700);
        }
    }

    #[test]
    fn test_metrics_around_manager_calls() {
        let metrics = OrderBookMetrics::new();
        let mut manager = OrderBookManager::new();

        let result = metrics.time_add_order(|| manager.add_order(order("a", "X", Side::Buy, 1, 1)));
        assert!(result.is_ok());
        metrics.increment_orders_added();

        if let Err(e) = metrics.time_add_order(|| manager.add_order(order("a", "X", Side::Buy, 1, 1))) {
            metrics.record_rejection(&e);
        }

        assert_eq!(metrics.get_orders_added(), 1);
        assert_eq!(metrics.get_orders_rejected(), 1);
        assert_eq!(metrics.get_latency_stats().add_order.samples, 2);
    }

    #[test]
    fn test_concurrent_order_flow() {
        let shared = SharedOrderBookManager::default();
        let mut handles = vec![];

        // One instrument per thread, with a shared one every thread touches
        for thread_id in 0..4u64 {
            let shared_clone = shared.clone();
            let handle = thread::spawn(move || {
                let own = format!("INST{}", thread_id);
                for i in 0..50u64 {
                    let id = format!("{}-{}", own, i);
                    shared_clone
                        .add_order(order(&id, &own, Side::Sell, 500 + i, 10))
                        .unwrap();
                    shared_clone
                        .add_order(order(&format!("c-{}", id), "COMMON", Side::Buy, 100, 1))
                        .unwrap();
                    if i % 2 == 0 {
                        shared_clone.modify_order(&id, 20).unwrap();
                    } else {
                        shared_clone.delete_order(&id).unwrap();
                    }
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.order_num_at_level("COMMON", Side::Buy, 100), 200);
        for thread_id in 0..4 {
            let instrument = format!("INST{}", thread_id);
            let stats = shared.stats(&instrument).unwrap();
            assert_eq!(stats.total_orders, 25);
            assert_eq!(stats.best_ask, Some(500));
        }
        assert_eq!(shared.total_orders(), 300);
    }
}
