use std::collections::VecDeque;

use crate::orderbook::types::{Order, OrderId, OrderStore, Price, PriceLevelInfo, Quantity};

/// Represents a price level in the order book
/// All orders at this price level maintain time priority (FIFO)
///
/// The level only queues order ids; the orders themselves live in the
/// manager's [`OrderStore`], so aggregates are resolved through it.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Price,
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Append an order id to the back of the queue (newest, lowest priority)
    pub fn push_back(&mut self, order_id: OrderId) {
        self.orders.push_back(order_id);
    }

    /// Remove an order id from this price level, keeping the rest in order
    pub fn remove(&mut self, order_id: &str) -> bool {
        match self.position(order_id) {
            Some(pos) => self.orders.remove(pos).is_some(),
            None => false,
        }
    }

    /// Queue position of an order (0 = front)
    pub fn position(&self, order_id: &str) -> Option<usize> {
        self.orders.iter().position(|id| id == order_id)
    }

    /// Get number of orders at this price level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Orders in the queue that resolve against the store
    pub fn resting_count(&self, store: &OrderStore) -> usize {
        self.orders(store).count()
    }

    /// Check if this price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &OrderId> + '_ {
        self.orders.iter()
    }

    /// Resolve queued ids against the store, front to back
    pub fn orders<'a>(&'a self, store: &'a OrderStore) -> impl Iterator<Item = &'a Order> + 'a {
        self.orders.iter().filter_map(move |id| store.get(id))
    }

    /// Get total quantity at this price level
    pub fn total_quantity(&self, store: &OrderStore) -> Quantity {
        self.orders(store)
            .fold(0, |acc: Quantity, order| acc.saturating_add(order.quantity()))
    }

    /// Sum of quantity × price, taken per order
    pub fn total_volume(&self, store: &OrderStore) -> u64 {
        self.orders(store)
            .fold(0, |acc: u64, order| acc.saturating_add(order.volume()))
    }

    /// Get depth information for this level
    pub fn depth_info(&self, store: &OrderStore) -> PriceLevelInfo {
        PriceLevelInfo {
            price: self.price,
            quantity: self.total_quantity(store),
            order_count: self.resting_count(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::types::Side;

    fn level_with(store: &mut OrderStore, price: Price, orders: &[(&str, Quantity)]) -> PriceLevel {
        let mut level = PriceLevel::new(price);
        for (id, quantity) in orders {
            let order = Order::new(*id, "TEST", Side::Sell, price, *quantity).unwrap();
            store.insert(id.to_string(), order);
            level.push_back(id.to_string());
        }
        level
    }

    #[test]
    fn test_price_level_push_back() {
        let mut store = OrderStore::new();
        let level = level_with(&mut store, 10000, &[("a", 100)]);

        assert_eq!(level.total_quantity(&store), 100);
        assert_eq!(level.order_count(), 1);
        assert!(!level.is_empty());
    }

    #[test]
    fn test_price_level_time_priority() {
        let mut store = OrderStore::new();
        let level = level_with(&mut store, 10000, &[("first", 100), ("second", 200)]);

        let ids: Vec<_> = level.order_ids().cloned().collect();
        assert_eq!(ids, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(level.position("first"), Some(0));
        assert_eq!(level.position("second"), Some(1));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut store = OrderStore::new();
        let mut level = level_with(&mut store, 300, &[("a", 1), ("b", 2), ("c", 3)]);

        assert!(level.remove("b"));
        assert!(!level.remove("b"));

        let ids: Vec<_> = level.order_ids().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_last_order_empties_level() {
        let mut store = OrderStore::new();
        let mut level = level_with(&mut store, 10000, &[("a", 100)]);

        assert!(level.remove("a"));
        assert!(level.is_empty());
        assert_eq!(level.order_count(), 0);
    }

    #[test]
    fn test_totals_follow_store() {
        let mut store = OrderStore::new();
        let level = level_with(&mut store, 300, &[("a", 10), ("b", 10)]);

        assert_eq!(level.total_quantity(&store), 20);
        assert_eq!(level.total_volume(&store), 6000);

        store.get_mut("a").unwrap().set_quantity(5).unwrap();
        assert_eq!(level.total_quantity(&store), 15);
        assert_eq!(level.total_volume(&store), 4500);

        let info = level.depth_info(&store);
        assert_eq!(
            info,
            PriceLevelInfo {
                price: 300,
                quantity: 15,
                order_count: 2
            }
        );
    }

    #[test]
    fn test_counts_agree_with_totals_when_store_misses_an_id() {
        let mut store = OrderStore::new();
        let mut level = level_with(&mut store, 300, &[("a", 10)]);
        level.push_back("ghost".to_string());

        assert_eq!(level.order_count(), 2);
        assert_eq!(level.resting_count(&store), 1);
        assert_eq!(level.total_quantity(&store), 10);
        assert_eq!(level.depth_info(&store).order_count, 1);

        store.remove("a");
        assert_eq!(level.resting_count(&store), 0);
        assert_eq!(level.total_quantity(&store), 0);
    }
}
