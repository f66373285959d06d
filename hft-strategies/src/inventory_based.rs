//! Inventory-aware market maker: an Avellaneda-Stoikov-flavored alternative
//! to `hft_core::strategy::MarketMaker`, carried as a non-default supplement
//! (see the crate's `lib.rs` doc comment).
//!
//! Grounded on the teacher's `bog-strategies::inventory_based` (which was
//! itself an unfinished stub) plus `bog-strategies::simple_spread`'s
//! volatility-driven spread widening; this is a from-scratch implementation
//! of the formula the teacher's doc comments described but never wired up.

use crate::fees::MIN_PROFITABLE_SPREAD_BPS;
use crate::volatility::EwmaVolatility;
use hft_core::core::ids::IdGenerator;
use hft_core::core::types::{MarketDataTick, Order, Side};
use hft_core::position::Position;
use std::sync::Arc;

pub struct InventoryParams {
    /// Net position, in base units, the strategy tries to mean-revert toward.
    pub target_inventory: f64,
    /// Higher values skew quotes harder away from `target_inventory`.
    pub risk_aversion: f64,
    pub quantity: f64,
    pub instrument_id: i64,
}

/// Reservation-price/inventory-skew market maker. Unlike
/// `hft_core::strategy::MarketMaker`'s step-function skew past a fixed
/// threshold, the skew here scales continuously with how far net position is
/// from `target_inventory`, and the spread widens with recent volatility.
pub struct InventoryMaker {
    params: InventoryParams,
    order_ids: IdGenerator,
    position: Arc<Position>,
    volatility: EwmaVolatility,
}

impl InventoryMaker {
    pub fn new(params: InventoryParams, position: Arc<Position>) -> Self {
        Self {
            params,
            order_ids: IdGenerator::new(),
            position,
            volatility: EwmaVolatility::new(0.2),
        }
    }

    /// Reservation price: the mid, shifted away from the side we're already
    /// overexposed to. A long position pulls the reservation price down
    /// (encouraging sells); a short position pushes it up.
    fn reservation_price(&self, mid: f64) -> f64 {
        let inventory_gap = self.position.net_position() - self.params.target_inventory;
        mid - inventory_gap * self.params.risk_aversion
    }

    /// Half-spread in price units: a volatility-scaled floor, never below
    /// the fee-aware minimum so a quote is never submitted at a loss.
    fn half_spread(&self, mid: f64) -> f64 {
        let vol_bps = self.volatility.volatility_bps();
        let spread_bps = (MIN_PROFITABLE_SPREAD_BPS + vol_bps).max(MIN_PROFITABLE_SPREAD_BPS);
        mid * (spread_bps / 10_000.0)
    }

    /// Returns `(buy, sell)` candidates for this tick, or `None` for either
    /// side if the book isn't two-sided. Mirrors
    /// `hft_core::strategy::MarketMaker::on_tick`'s mark-to-market timing:
    /// called once per tick, before quote calculation.
    pub fn on_tick(&mut self, tick: &MarketDataTick) -> (Option<Order>, Option<Order>) {
        let (Some(best_bid), Some(best_ask)) = (tick.best_bid(), tick.best_ask()) else {
            return (None, None);
        };
        let mid = (best_bid.price + best_ask.price) / 2.0;
        self.position.mark_to_market(mid);
        self.volatility.add_price(mid);

        let reservation = self.reservation_price(mid);
        let half_spread = self.half_spread(mid);
        let timestamp = tick.receive_ts;
        let sequence = tick.sequence;

        let buy = Order {
            version: Order::CURRENT_VERSION,
            order_id: self.order_ids.next(),
            instrument_id: self.params.instrument_id,
            side: Side::Buy as u8,
            price: reservation - half_spread,
            quantity: self.params.quantity,
            timestamp,
            sequence,
        };
        let sell = Order {
            version: Order::CURRENT_VERSION,
            order_id: self.order_ids.next(),
            instrument_id: self.params.instrument_id,
            side: Side::Sell as u8,
            price: reservation + half_spread,
            quantity: self.params.quantity,
            timestamp,
            sequence,
        };

        (Some(buy), Some(sell))
    }

    pub fn reset(&mut self) {
        self.volatility.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hft_core::core::types::{PriceLevel, BOOK_DEPTH};

    fn tick(bid: f64, ask: f64, sequence: i64) -> MarketDataTick {
        MarketDataTick {
            version: 1,
            sequence,
            instrument_id: 1,
            send_ts: sequence,
            receive_ts: sequence,
            bids: [PriceLevel { price: bid, size: 1.0 }; BOOK_DEPTH],
            asks: [PriceLevel { price: ask, size: 1.0 }; BOOK_DEPTH],
        }
    }

    fn params() -> InventoryParams {
        InventoryParams {
            target_inventory: 0.0,
            risk_aversion: 0.001,
            quantity: 10.0,
            instrument_id: 1,
        }
    }

    #[test]
    fn quotes_straddle_mid_with_zero_inventory() {
        let position = Arc::new(Position::new(1));
        let mut maker = InventoryMaker::new(params(), position);
        let (buy, sell) = maker.on_tick(&tick(99.95, 100.05, 1));
        let buy_price = buy.unwrap().price;
        let sell_price = sell.unwrap().price;
        assert!(buy_price < 100.0);
        assert!(sell_price > 100.0);
        assert!((100.0 - buy_price - (sell_price - 100.0)).abs() < 1e-9);
    }

    #[test]
    fn long_position_pulls_reservation_price_down() {
        let position = Arc::new(Position::new(1));
        position.apply_fill(Side::Buy, 100.0, 100.0);
        let mut maker = InventoryMaker::new(params(), position);
        let (buy, sell) = maker.on_tick(&tick(99.95, 100.05, 1));
        let buy_price = buy.unwrap().price;
        let sell_price = sell.unwrap().price;
        // Long 100 units at risk_aversion 0.001 shifts reservation down 0.1.
        assert!(buy_price < 99.95 - 0.05);
        assert!(sell_price < 100.05);
    }

    #[test]
    fn one_sided_book_yields_no_orders() {
        let position = Arc::new(Position::new(1));
        let mut maker = InventoryMaker::new(params(), position);
        let mut t = tick(99.95, 100.05, 1);
        t.bids[0].size = 0.0;
        let (buy, sell) = maker.on_tick(&t);
        assert!(buy.is_none() && sell.is_none());
    }

    #[test]
    fn volatility_widens_the_spread_over_time() {
        let position = Arc::new(Position::new(1));
        let mut maker = InventoryMaker::new(params(), position);
        let (_, first_sell) = maker.on_tick(&tick(99.0, 101.0, 1));
        let first_sell_price = first_sell.unwrap().price;
        let first_half_spread = first_sell_price - 100.0;

        for i in 0..10 {
            let wobble = if i % 2 == 0 { 95.0 } else { 105.0 };
            maker.on_tick(&tick(wobble - 1.0, wobble + 1.0, i + 2));
        }
        let (_, last_sell) = maker.on_tick(&tick(99.0, 101.0, 20));
        let last_sell_price = last_sell.unwrap().price;
        let last_half_spread = last_sell_price - 100.0;
        assert!(last_half_spread > first_half_spread);
    }
}
