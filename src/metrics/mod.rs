use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::info;

use crate::orderbook::{OrderBookError, OrderBookStats};

/// Metrics collector for order book operations
#[derive(Debug)]
pub struct OrderBookMetrics {
    // Latency tracking
    add_order_latency: LatencyTracker,
    modify_order_latency: LatencyTracker,
    delete_order_latency: LatencyTracker,
    query_latency: LatencyTracker,

    // Throughput counters
    orders_added: AtomicU64,
    orders_modified: AtomicU64,
    orders_requeued: AtomicU64,
    orders_deleted: AtomicU64,
    orders_rejected: AtomicU64,

    // Book state
    resting_orders: AtomicU64,
}

impl OrderBookMetrics {
    pub fn new() -> Self {
        // Register metric descriptions
        describe_counter!("orderbook_orders_total", "Order operations applied to the books");
        describe_counter!("orderbook_rejections_total", "Order operations rejected");
        describe_histogram!(
            "orderbook_operation_duration_seconds",
            "Duration of order book operations"
        );
        describe_gauge!(
            "orderbook_levels_total",
            "Number of non-empty price levels in the book"
        );
        describe_gauge!(
            "orderbook_orders_current",
            "Current number of resting orders"
        );

        Self {
            add_order_latency: LatencyTracker::new("add_order"),
            modify_order_latency: LatencyTracker::new("modify_order"),
            delete_order_latency: LatencyTracker::new("delete_order"),
            query_latency: LatencyTracker::new("query"),
            orders_added: AtomicU64::new(0),
            orders_modified: AtomicU64::new(0),
            orders_requeued: AtomicU64::new(0),
            orders_deleted: AtomicU64::new(0),
            orders_rejected: AtomicU64::new(0),
            resting_orders: AtomicU64::new(0),
        }
    }

    // Latency measurement methods
    pub fn time_add_order<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.add_order_latency.time(f)
    }

    pub fn time_modify_order<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.modify_order_latency.time(f)
    }

    pub fn time_delete_order<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.delete_order_latency.time(f)
    }

    pub fn time_query<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.query_latency.time(f)
    }

    // Counter methods
    pub fn increment_orders_added(&self) {
        self.orders_added.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_orders_total", "operation" => "add").increment(1);
    }

    /// `requeued` marks an increase that sent the order to the back of its level
    pub fn increment_orders_modified(&self, requeued: bool) {
        self.orders_modified.fetch_add(1, Ordering::Relaxed);
        if requeued {
            self.orders_requeued.fetch_add(1, Ordering::Relaxed);
            counter!("orderbook_orders_total", "operation" => "requeue").increment(1);
        } else {
            counter!("orderbook_orders_total", "operation" => "modify").increment(1);
        }
    }

    pub fn increment_orders_deleted(&self) {
        self.orders_deleted.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_orders_total", "operation" => "delete").increment(1);
    }

    pub fn record_rejection(&self, error: &OrderBookError) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_rejections_total", "reason" => error.kind()).increment(1);
    }

    // Gauge methods
    pub fn set_resting_orders(&self, count: u64) {
        self.resting_orders.store(count, Ordering::Relaxed);
        gauge!("orderbook_orders_current").set(count as f64);
    }

    /// Publish per-instrument book gauges
    pub fn record_book(&self, stats: &OrderBookStats) {
        let instrument = stats.instrument.clone();

        gauge!("orderbook_levels_total", "side" => "bid", "instrument" => instrument.clone())
            .set(stats.bid_levels as f64);
        gauge!("orderbook_levels_total", "side" => "ask", "instrument" => instrument.clone())
            .set(stats.ask_levels as f64);

        if let Some(bid) = stats.best_bid {
            gauge!("orderbook_best_bid", "instrument" => instrument.clone()).set(bid as f64);
        }
        if let Some(ask) = stats.best_ask {
            gauge!("orderbook_best_ask", "instrument" => instrument.clone()).set(ask as f64);
        }
        if let Some(spread) = stats.spread {
            gauge!("orderbook_spread_ticks", "instrument" => instrument).set(spread as f64);
        }
    }

    // Getters for current values
    pub fn get_orders_added(&self) -> u64 {
        self.orders_added.load(Ordering::Relaxed)
    }

    pub fn get_orders_modified(&self) -> u64 {
        self.orders_modified.load(Ordering::Relaxed)
    }

    pub fn get_orders_requeued(&self) -> u64 {
        self.orders_requeued.load(Ordering::Relaxed)
    }

    pub fn get_orders_deleted(&self) -> u64 {
        self.orders_deleted.load(Ordering::Relaxed)
    }

    pub fn get_orders_rejected(&self) -> u64 {
        self.orders_rejected.load(Ordering::Relaxed)
    }

    pub fn get_resting_orders(&self) -> u64 {
        self.resting_orders.load(Ordering::Relaxed)
    }

    pub fn get_latency_stats(&self) -> LatencyStats {
        LatencyStats {
            add_order: self.add_order_latency.get_stats(),
            modify_order: self.modify_order_latency.get_stats(),
            delete_order: self.delete_order_latency.get_stats(),
            query: self.query_latency.get_stats(),
        }
    }
}

impl Default for OrderBookMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency tracker for individual operations
#[derive(Debug)]
struct LatencyTracker {
    operation: &'static str,
    samples: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl LatencyTracker {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            samples: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record_latency(start.elapsed());
        result
    }

    fn record_latency(&self, duration: Duration) {
        let nanos = duration.as_nanos() as u64;

        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);

        histogram!("orderbook_operation_duration_seconds", "operation" => self.operation)
            .record(duration.as_secs_f64());
    }

    fn get_stats(&self) -> OperationLatencyStats {
        let samples = self.samples.load(Ordering::Relaxed);
        let total = self.total_nanos.load(Ordering::Relaxed);
        let min = self.min_nanos.load(Ordering::Relaxed);
        let max = self.max_nanos.load(Ordering::Relaxed);

        let avg = if samples > 0 { total / samples } else { 0 };

        OperationLatencyStats {
            operation: self.operation,
            samples,
            avg_nanos: avg,
            min_nanos: if min == u64::MAX { 0 } else { min },
            max_nanos: max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub add_order: OperationLatencyStats,
    pub modify_order: OperationLatencyStats,
    pub delete_order: OperationLatencyStats,
    pub query: OperationLatencyStats,
}

#[derive(Debug, Clone)]
pub struct OperationLatencyStats {
    pub operation: &'static str,
    pub samples: u64,
    pub avg_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
}

impl OperationLatencyStats {
    pub fn avg_micros(&self) -> f64 {
        self.avg_nanos as f64 / 1_000.0
    }

    pub fn min_micros(&self) -> f64 {
        self.min_nanos as f64 / 1_000.0
    }

    pub fn max_micros(&self) -> f64 {
        self.max_nanos as f64 / 1_000.0
    }
}

/// Background metrics reporter
pub struct MetricsReporter {
    metrics: Arc<OrderBookMetrics>,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<OrderBookMetrics>, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    pub async fn run(&self) {
        let mut interval = interval(self.interval);

        loop {
            interval.tick().await;

            let stats = self.metrics.get_latency_stats();

            info!(
                "OrderBook Metrics - Orders: +{} ~{} (requeued {}) -{} rejected {} | resting {} | Latency (μs): add={:.2} modify={:.2} delete={:.2} query={:.2}",
                self.metrics.get_orders_added(),
                self.metrics.get_orders_modified(),
                self.metrics.get_orders_requeued(),
                self.metrics.get_orders_deleted(),
                self.metrics.get_orders_rejected(),
                self.metrics.get_resting_orders(),
                stats.add_order.avg_micros(),
                stats.modify_order.avg_micros(),
                stats.delete_order.avg_micros(),
                stats.query.avg_micros()
            );
        }
    }
}
