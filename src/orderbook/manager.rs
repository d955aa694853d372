use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::ManagerConfig;
use crate::orderbook::book::{OrderBook, OrderBookStats};
use crate::orderbook::error::{OrderBookError, OrderBookResult};
use crate::orderbook::price_level::PriceLevel;
use crate::orderbook::types::{
    BookSnapshot, Instrument, Order, OrderStore, Price, Quantity, Side,
};

/// Routes orders to per-instrument books and owns every resting order.
///
/// Orders live in a single id-keyed store; price levels queue ids into it.
/// A quantity change made through the store is therefore what every level
/// query sees, without copies to keep in sync.
///
/// Mutations take `&mut self` and either apply fully or fail with no change.
/// Wrap in [`SharedOrderBookManager`](crate::orderbook::SharedOrderBookManager)
/// to serve several threads.
#[derive(Debug, Clone)]
pub struct OrderBookManager {
    config: ManagerConfig,
    books: HashMap<Instrument, OrderBook>,
    orders: OrderStore,
}

impl OrderBookManager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            orders: OrderStore::with_capacity(config.order_capacity),
            books: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Rest a new order at the tail of its price level
    pub fn add_order(&mut self, order: Order) -> OrderBookResult<()> {
        debug!("Adding order: {:?}", order);

        if self.orders.contains_key(order.order_id()) {
            return Err(OrderBookError::duplicate(order.order_id()));
        }

        self.insert_resting(order);
        Ok(())
    }

    /// Change an order's quantity.
    ///
    /// Zero deletes the order. An increase forfeits time priority: the order
    /// leaves its queue and is re-added at the tail of the same level. A
    /// decrease (or no change) is applied in place.
    ///
    /// Returns whether the order now carries `new_quantity` (for zero, the
    /// result of the deletion).
    pub fn modify_order(&mut self, order_id: &str, new_quantity: Quantity) -> OrderBookResult<bool> {
        debug!("Modifying order {} to quantity {}", order_id, new_quantity);

        let current = self
            .orders
            .get(order_id)
            .map(Order::quantity)
            .ok_or_else(|| OrderBookError::unknown(order_id))?;

        if new_quantity == 0 {
            return self.delete_order(order_id);
        }

        if new_quantity > current {
            let (mut order, _) = self.remove_resting(order_id)?;
            order.set_quantity(new_quantity)?;
            self.insert_resting(order);
            debug!("Order {} requeued at the back of its level", order_id);
        } else {
            self.orders
                .get_mut(order_id)
                .ok_or_else(|| OrderBookError::unknown(order_id))?
                .set_quantity(new_quantity)?;
        }

        Ok(self
            .orders
            .get(order_id)
            .is_some_and(|order| order.quantity() == new_quantity))
    }

    /// Remove an order from its level and the store.
    ///
    /// `Ok(false)` means the store knew the order but its level did not,
    /// which only an internal inconsistency can produce.
    pub fn delete_order(&mut self, order_id: &str) -> OrderBookResult<bool> {
        debug!("Deleting order: {}", order_id);

        let (_, removed) = self.remove_resting(order_id)?;
        Ok(removed)
    }

    /// Highest bid or lowest ask, `None` if the instrument or side is empty
    pub fn best_price(&self, instrument: &str, side: Side) -> Option<Price> {
        self.books.get(instrument)?.best_price(side)
    }

    pub fn order_num_at_level(&self, instrument: &str, side: Side, price: Price) -> usize {
        self.level(instrument, side, price)
            .map_or(0, |level| level.resting_count(&self.orders))
    }

    pub fn total_quantity_at_level(&self, instrument: &str, side: Side, price: Price) -> Quantity {
        self.level(instrument, side, price)
            .map_or(0, |level| level.total_quantity(&self.orders))
    }

    /// Σ quantity × price over the level's orders
    pub fn total_volume_at_level(&self, instrument: &str, side: Side, price: Price) -> u64 {
        self.level(instrument, side, price)
            .map_or(0, |level| level.total_volume(&self.orders))
    }

    /// Orders at a level in time priority, empty if the level never existed
    pub fn orders_at_level(&self, instrument: &str, side: Side, price: Price) -> Vec<&Order> {
        self.level(instrument, side, price)
            .map(|level| level.orders(&self.orders).collect())
            .unwrap_or_default()
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn contains_order(&self, order_id: &str) -> bool {
        self.orders.contains_key(order_id)
    }

    /// Resting orders across all instruments
    pub fn total_orders(&self) -> usize {
        self.orders.len()
    }

    /// Instruments that have a book, sorted
    pub fn instruments(&self) -> Vec<&str> {
        let mut instruments: Vec<&str> = self.books.keys().map(String::as_str).collect();
        instruments.sort_unstable();
        instruments
    }

    pub fn book(&self, instrument: &str) -> Option<&OrderBook> {
        self.books.get(instrument)
    }

    pub fn spread(&self, instrument: &str) -> Option<Price> {
        self.books.get(instrument)?.spread()
    }

    pub fn stats(&self, instrument: &str) -> Option<OrderBookStats> {
        self.books.get(instrument).map(OrderBook::stats)
    }

    /// Generate order book snapshot with up to `depth` levels per side
    pub fn snapshot(&self, instrument: &str, depth: usize) -> Option<BookSnapshot> {
        let book = self.books.get(instrument)?;

        Some(BookSnapshot {
            instrument: book.instrument.clone(),
            timestamp: Utc::now(),
            bids: book.depth(Side::Buy, depth, &self.orders),
            asks: book.depth(Side::Sell, depth, &self.orders),
        })
    }

    pub fn default_snapshot(&self, instrument: &str) -> Option<BookSnapshot> {
        self.snapshot(instrument, self.config.snapshot_depth)
    }

    // Private helper methods

    fn level(&self, instrument: &str, side: Side, price: Price) -> Option<&PriceLevel> {
        self.books.get(instrument)?.level(side, price)
    }

    fn insert_resting(&mut self, order: Order) {
        let order_id = order.order_id().to_string();
        let side = order.side();
        let price = order.price();

        let book = self
            .books
            .entry(order.instrument().to_string())
            .or_insert_with_key(|instrument| OrderBook::new(instrument.clone()));

        book.level_mut_or_insert(side, price)
            .push_back(order_id.clone());

        debug!(
            "Order {} added to {} book at price {} on {} side",
            order_id, book.instrument, price, side
        );

        self.orders.insert(order_id, order);
    }

    fn remove_resting(&mut self, order_id: &str) -> OrderBookResult<(Order, bool)> {
        let order = self
            .orders
            .remove(order_id)
            .ok_or_else(|| OrderBookError::unknown(order_id))?;

        let (side, price) = (order.side(), order.price());

        let removed = match self.books.get_mut(order.instrument()) {
            Some(book) => {
                let removed = book
                    .level_mut(side, price)
                    .is_some_and(|level| level.remove(order_id));

                if self.config.prune_empty_levels {
                    book.remove_level_if_empty(side, price);
                }
                removed
            }
            None => false,
        };

        if !removed {
            warn!(
                "Order {} was indexed but missing from {} {} level {}",
                order_id,
                order.instrument(),
                side,
                price
            );
        }

        Ok((order, removed))
    }
}

impl Default for OrderBookManager {
    fn default() -> Self {
        Self::new()
    }
}
