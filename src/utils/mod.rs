use crate::orderbook::{Price, PriceLevelInfo};

/// Render integer ticks with `decimals` implied decimal places,
/// e.g. `format_price(12550, 2)` is `"125.50"`. Scales past `u64` print the
/// raw tick count.
pub fn format_price(price: Price, decimals: u32) -> String {
    let scale = match 10u64.checked_pow(decimals) {
        Some(scale) if decimals > 0 => scale,
        _ => return price.to_string(),
    };
    format!(
        "{}.{:0width$}",
        price / scale,
        price % scale,
        width = decimals as usize
    )
}

/// One-line summary of a price level for logs
pub fn format_level(level: &PriceLevelInfo, decimals: u32) -> String {
    format!(
        "{} x {} ({} orders)",
        format_price(level.price, decimals),
        level.quantity,
        level.order_count
    )
}
