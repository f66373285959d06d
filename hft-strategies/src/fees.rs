//! Exchange fee constants and fee-aware spread helpers, in basis points
//! (1 bp = 0.0001). Ported from the teacher's u64-fixed-point version to
//! plain `f64`, matching `hft_core::core::types`'s price representation.

/// Maker fee paid when a quote rests and gets joined.
pub const MAKER_FEE_BPS: f64 = 0.0;

/// Taker fee paid when an order crosses the book.
pub const TAKER_FEE_BPS: f64 = 2.0;

/// Round-trip cost of a post-then-exit cycle: one maker fill, one taker fill.
pub const ROUND_TRIP_COST_BPS: f64 = MAKER_FEE_BPS + TAKER_FEE_BPS;

/// Minimum spread, in bps, needed to break even after fees.
pub const MIN_PROFITABLE_SPREAD_BPS: f64 = ROUND_TRIP_COST_BPS;

/// Fee amount for a fill of `price` at `fee_bps`.
#[inline]
pub fn calculate_fee(price: f64, fee_bps: f64) -> f64 {
    price * fee_bps / 10_000.0
}

/// Spread, in bps, required to clear fees and still keep `target_profit_bps`.
#[inline]
pub fn calculate_required_spread(target_profit_bps: f64) -> f64 {
    ROUND_TRIP_COST_BPS + target_profit_bps
}

/// Bid/ask around `mid_price` for a `target_spread_bps` total spread.
#[inline]
pub fn calculate_quotes(mid_price: f64, target_spread_bps: f64) -> (f64, f64) {
    let half_spread = mid_price * (target_spread_bps / 2.0) / 10_000.0;
    (mid_price - half_spread, mid_price + half_spread)
}
