use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::ManagerConfig;
use crate::orderbook::book::OrderBookStats;
use crate::orderbook::error::OrderBookResult;
use crate::orderbook::manager::OrderBookManager;
use crate::orderbook::types::{BookSnapshot, Order, Price, Quantity, Side};

/// Cloneable, thread-safe handle to one [`OrderBookManager`].
///
/// Every mutation holds the write lock for its whole duration, so no reader
/// ever sees a level halfway through a requeue. Queries share the read lock
/// and hand back owned data.
#[derive(Debug, Clone, Default)]
pub struct SharedOrderBookManager {
    inner: Arc<RwLock<OrderBookManager>>,
}

impl SharedOrderBookManager {
    pub fn new(manager: OrderBookManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::new(OrderBookManager::with_config(config))
    }

    pub fn add_order(&self, order: Order) -> OrderBookResult<()> {
        self.inner.write().add_order(order)
    }

    pub fn modify_order(&self, order_id: &str, new_quantity: Quantity) -> OrderBookResult<bool> {
        self.inner.write().modify_order(order_id, new_quantity)
    }

    pub fn delete_order(&self, order_id: &str) -> OrderBookResult<bool> {
        self.inner.write().delete_order(order_id)
    }

    pub fn best_price(&self, instrument: &str, side: Side) -> Option<Price> {
        self.inner.read().best_price(instrument, side)
    }

    pub fn order_num_at_level(&self, instrument: &str, side: Side, price: Price) -> usize {
        self.inner.read().order_num_at_level(instrument, side, price)
    }

    pub fn total_quantity_at_level(&self, instrument: &str, side: Side, price: Price) -> Quantity {
        self.inner
            .read()
            .total_quantity_at_level(instrument, side, price)
    }

    pub fn total_volume_at_level(&self, instrument: &str, side: Side, price: Price) -> u64 {
        self.inner.read().total_volume_at_level(instrument, side, price)
    }

    /// Owned copies of the level's orders, in time priority
    pub fn orders_at_level(&self, instrument: &str, side: Side, price: Price) -> Vec<Order> {
        self.inner
            .read()
            .orders_at_level(instrument, side, price)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.inner.read().order(order_id).cloned()
    }

    pub fn total_orders(&self) -> usize {
        self.inner.read().total_orders()
    }

    pub fn instruments(&self) -> Vec<String> {
        self.inner
            .read()
            .instruments()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn stats(&self, instrument: &str) -> Option<OrderBookStats> {
        self.inner.read().stats(instrument)
    }

    pub fn snapshot(&self, instrument: &str, depth: usize) -> Option<BookSnapshot> {
        self.inner.read().snapshot(instrument, depth)
    }

    pub fn default_snapshot(&self, instrument: &str) -> Option<BookSnapshot> {
        self.inner.read().default_snapshot(instrument)
    }

    /// Run several operations under one write lock
    pub fn with_manager_mut<R>(&self, f: impl FnOnce(&mut OrderBookManager) -> R) -> R {
        f(&mut *self.inner.write())
    }

    /// Run several queries against one consistent view
    pub fn with_manager<R>(&self, f: impl FnOnce(&OrderBookManager) -> R) -> R {
        f(&*self.inner.read())
    }
}
