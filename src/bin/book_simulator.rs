//! Order Book Simulator
//!
//! Drives a shared order book manager with synthetic order flow for a few
//! instruments and exposes the resulting metrics.
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `BOOK_CONFIG`: optional path to a JSON `ManagerConfig`

use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use orderbook_manager::{
    metrics::MetricsReporter, utils::format_level, utils::format_price, ManagerConfig, Order,
    OrderBookMetrics, Price, PriceLevelInfo, SharedOrderBookManager, Side,
};

const INSTRUMENTS: [&str; 3] = ["BTC-USD", "ETH-USD", "SOL-USD"];
const PRICE_DECIMALS: u32 = 2;
const MAX_LIVE_ORDERS: usize = 500; // per instrument

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting order book simulator...");

    let config = match std::env::var("BOOK_CONFIG") {
        Ok(path) => {
            info!("Loading manager config from {}", path);
            ManagerConfig::from_json_file(&path)?
        }
        Err(_) => ManagerConfig::default(),
    };
    info!("Manager config: {:?}", config);

    let addr: SocketAddr = "0.0.0.0:9090".parse()?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus metrics available at http://{}/metrics", addr);

    let manager = SharedOrderBookManager::with_config(config);
    let metrics = Arc::new(OrderBookMetrics::new());

    let reporter = MetricsReporter::new(Arc::clone(&metrics), Duration::from_secs(5));
    tokio::spawn(async move {
        reporter.run().await;
    });

    for (i, instrument) in INSTRUMENTS.into_iter().enumerate() {
        let manager = manager.clone();
        let metrics = Arc::clone(&metrics);
        let base_price = 10_000 * (i as Price + 1);
        tokio::spawn(async move {
            simulate_order_flow(manager, metrics, instrument, base_price).await;
        });
    }

    // Periodic book summaries
    let summary_manager = manager.clone();
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(10));
        loop {
            interval.tick().await;
            log_books(&summary_manager);
        }
    });

    info!("Simulator is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down simulator...");

    for instrument in manager.instruments() {
        if let Some(stats) = manager.stats(&instrument) {
            info!(
                "Final stats for {}: {} resting orders, {} bid levels, {} ask levels",
                instrument, stats.total_orders, stats.bid_levels, stats.ask_levels
            );
        }
    }

    Ok(())
}

/// Synthetic order flow for one instrument: mostly new orders, with
/// decreases, priority-losing increases and deletions of live orders
async fn simulate_order_flow(
    manager: SharedOrderBookManager,
    metrics: Arc<OrderBookMetrics>,
    instrument: &'static str,
    base_price: Price,
) {
    let mut interval = interval(Duration::from_millis(10));
    let mut live: VecDeque<String> = VecDeque::new();
    let mut counter: u64 = 0;

    loop {
        interval.tick().await;
        counter += 1;

        match counter % 10 {
            // New orders (50% of activity)
            0..=4 => {
                let side = if counter % 2 == 0 { Side::Buy } else { Side::Sell };
                let offset = 1 + counter % 25;
                let price = match side {
                    Side::Buy => base_price - offset,
                    Side::Sell => base_price + offset,
                };
                let quantity = 10 + counter % 90;

                let order = match Order::with_generated_id(instrument, side, price, quantity) {
                    Ok(order) => order,
                    Err(e) => {
                        warn!("Rejected synthetic order for {}: {}", instrument, e);
                        continue;
                    }
                };
                let order_id = order.order_id().to_string();

                match metrics.time_add_order(|| manager.add_order(order)) {
                    Ok(()) => {
                        metrics.increment_orders_added();
                        live.push_back(order_id);
                    }
                    Err(e) => metrics.record_rejection(&e),
                }

                // Retire the oldest orders so the book stays bounded
                for oldest in retire_oldest(&mut live, MAX_LIVE_ORDERS) {
                    delete(&manager, &metrics, &oldest);
                }
            }

            // Quantity decreases keep priority (20%)
            5 | 6 => {
                if let Some(order_id) = live.front().cloned() {
                    modify(&manager, &metrics, &order_id, |q| (q / 2).max(1));
                }
            }

            // Quantity increases lose priority (10%)
            7 => {
                if let Some(order_id) = live.back().cloned() {
                    modify(&manager, &metrics, &order_id, |q| q + 25);
                }
            }

            // Deletions (10%)
            8 => {
                if let Some(order_id) = live.pop_front() {
                    delete(&manager, &metrics, &order_id);
                }
            }

            // Book state (10%)
            9 => {
                if let Some(stats) = metrics.time_query(|| manager.stats(instrument)) {
                    metrics.record_book(&stats);
                }
                metrics.set_resting_orders(manager.total_orders() as u64);
            }

            _ => unreachable!(),
        }
    }
}

/// Pop ids from the front until at most `max` remain
fn retire_oldest(live: &mut VecDeque<String>, max: usize) -> Vec<String> {
    let excess = live.len().saturating_sub(max);
    live.drain(..excess).collect()
}

fn delete(manager: &SharedOrderBookManager, metrics: &OrderBookMetrics, order_id: &str) {
    match metrics.time_delete_order(|| manager.delete_order(order_id)) {
        Ok(true) => metrics.increment_orders_deleted(),
        Ok(false) => error!("Order {} was not found in its level", order_id),
        Err(e) => metrics.record_rejection(&e),
    }
}

fn modify(
    manager: &SharedOrderBookManager,
    metrics: &OrderBookMetrics,
    order_id: &str,
    new_quantity: impl FnOnce(u64) -> u64,
) {
    let Some(current) = manager.order(order_id).map(|o| o.quantity()) else {
        return;
    };
    let target = new_quantity(current);

    match metrics.time_modify_order(|| manager.modify_order(order_id, target)) {
        Ok(applied) => {
            debug!("Order {} {} -> {} (applied: {})", order_id, current, target, applied);
            metrics.increment_orders_modified(target > current);
        }
        Err(e) => metrics.record_rejection(&e),
    }
}

fn log_books(manager: &SharedOrderBookManager) {
    let top = |levels: &[PriceLevelInfo]| {
        levels
            .first()
            .map(|level| format_level(level, PRICE_DECIMALS))
            .unwrap_or_else(|| "-".to_string())
    };

    for instrument in manager.instruments() {
        let (Some(snapshot), Some(stats)) =
            (manager.snapshot(&instrument, 1), manager.stats(&instrument))
        else {
            continue;
        };

        info!(
            "{} | Bid: {} | Ask: {} | Spread: {:?} | Resting: {}",
            instrument,
            top(&snapshot.bids),
            top(&snapshot.asks),
            stats.spread.map(|spread| format_price(spread, PRICE_DECIMALS)),
            stats.total_orders
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retire_oldest_bounds_live_orders() {
        let manager = SharedOrderBookManager::default();
        let metrics = OrderBookMetrics::new();
        let mut live = VecDeque::new();

        for i in 0..8u64 {
            let order = Order::new(format!("o{}", i), "SIM", Side::Buy, 100 + i, 1).unwrap();
            live.push_back(order.order_id().to_string());
            manager.add_order(order).unwrap();

            for oldest in retire_oldest(&mut live, 5) {
                delete(&manager, &metrics, &oldest);
            }
        }

        assert_eq!(live.len(), 5);
        assert_eq!(live.front().map(String::as_str), Some("o3"));
        assert_eq!(manager.total_orders(), 5);
        assert_eq!(metrics.get_orders_deleted(), 3);
        assert!(retire_oldest(&mut live, 10).is_empty());
    }
}
