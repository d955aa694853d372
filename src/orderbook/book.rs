use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::orderbook::price_level::PriceLevel;
use crate::orderbook::types::{Instrument, OrderStore, Price, PriceLevelInfo, Side};

/// Both sides of the book for a single instrument.
///
/// Each side is a price-sorted map of FIFO levels. Bids are read from the
/// top of their map, asks from the bottom. The book does not validate
/// orders; the manager does that before routing here.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub instrument: Instrument,

    bids: BTreeMap<Price, PriceLevel>, // Buy orders (highest price best)
    asks: BTreeMap<Price, PriceLevel>, // Sell orders (lowest price best)
}

impl OrderBook {
    pub fn new(instrument: Instrument) -> Self {
        info!("Creating new order book for instrument: {}", instrument);

        Self {
            instrument,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    fn levels(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Get or create the price level for (side, price)
    pub fn level_mut_or_insert(&mut self, side: Side, price: Price) -> &mut PriceLevel {
        self.levels_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Level at exactly this price, empty levels included
    pub fn level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        self.levels(side).get(&price)
    }

    pub fn level_mut(&mut self, side: Side, price: Price) -> Option<&mut PriceLevel> {
        self.levels_mut(side).get_mut(&price)
    }

    /// Drop the level at (side, price) if it holds no orders
    pub fn remove_level_if_empty(&mut self, side: Side, price: Price) -> bool {
        let levels = self.levels_mut(side);
        if levels.get(&price).is_some_and(PriceLevel::is_empty) {
            levels.remove(&price);
            return true;
        }
        false
    }

    /// Non-empty levels of one side, best price first
    pub fn iter_levels(&self, side: Side) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        let levels = self.levels(side).values().filter(|level| !level.is_empty());
        match side {
            Side::Buy => Box::new(levels.rev()),
            Side::Sell => Box::new(levels),
        }
    }

    /// Highest non-empty bid or lowest non-empty ask
    pub fn best_price(&self, side: Side) -> Option<Price> {
        self.iter_levels(side).next().map(|level| level.price)
    }

    /// Get current best bid price
    pub fn best_bid(&self) -> Option<Price> {
        self.best_price(Side::Buy)
    }

    /// Get current best ask price
    pub fn best_ask(&self) -> Option<Price> {
        self.best_price(Side::Sell)
    }

    /// Get current spread; `None` when a side is empty or the book is
    /// crossed (nothing here matches resting orders against each other)
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of non-empty price levels on one side
    pub fn level_count(&self, side: Side) -> usize {
        self.iter_levels(side).count()
    }

    /// Top `depth` levels of one side, best price first
    pub fn depth(&self, side: Side, depth: usize, store: &OrderStore) -> Vec<PriceLevelInfo> {
        self.iter_levels(side)
            .take(depth)
            .map(|level| level.depth_info(store))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.level_count(Side::Buy) == 0 && self.level_count(Side::Sell) == 0
    }

    /// Get statistics
    pub fn stats(&self) -> OrderBookStats {
        let resting = |side: Side| -> usize {
            self.iter_levels(side).map(PriceLevel::order_count).sum()
        };

        OrderBookStats {
            instrument: self.instrument.clone(),
            total_orders: resting(Side::Buy) + resting(Side::Sell),
            bid_levels: self.level_count(Side::Buy),
            ask_levels: self.level_count(Side::Sell),
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            spread: self.spread(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBookStats {
    pub instrument: Instrument,
    pub total_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub spread: Option<Price>,
}
