//! Strategy stage (C3): consume ticks, emit at most two candidate orders per
//! tick (one buy, one sell) from a simple market-making rule (§4.3).
//!
//! This is the graded core's only strategy; `hft-strategies` carries a
//! second, inventory-based strategy as a non-default supplement behind the
//! same `Strategy`-shaped contract.

use crate::core::ids::IdGenerator;
use crate::core::types::{MarketDataTick, Order, Side};
use crate::position::Position;
use std::sync::Arc;

pub struct StrategyParams {
    pub spread: f64,
    pub quantity: f64,
    pub instrument_id: i64,
}

/// Net-position thresholds past which the quote skews away from the mid, in
/// the direction that encourages inventory to mean-revert toward zero.
const SKEW_POSITION_THRESHOLD: f64 = 100.0;
const SKEW_AMOUNT: f64 = 0.01;

pub struct MarketMaker {
    params: StrategyParams,
    order_ids: IdGenerator,
    position: Arc<Position>,
}

impl MarketMaker {
    pub fn new(params: StrategyParams, position: Arc<Position>) -> Self {
        Self {
            params,
            order_ids: IdGenerator::new(),
            position,
        }
    }

    /// Returns `(buy, sell)` candidate orders for this tick, or `None` for
    /// either side if the book isn't two-sided. Also marks the position to
    /// market using the tick's mid — the only path that updates
    /// `unrealized_pnl` (§4.3, §4.6).
    pub fn on_tick(&self, tick: &MarketDataTick) -> (Option<Order>, Option<Order>) {
        let (Some(best_bid), Some(best_ask)) = (tick.best_bid(), tick.best_ask()) else {
            return (None, None);
        };
        let mid = (best_bid.price + best_ask.price) / 2.0;

        self.position.mark_to_market(mid);

        let net_position = self.position.net_position();
        let skew = if net_position > SKEW_POSITION_THRESHOLD {
            SKEW_AMOUNT
        } else if net_position < -SKEW_POSITION_THRESHOLD {
            -SKEW_AMOUNT
        } else {
            0.0
        };

        let my_bid = mid - self.params.spread / 2.0 - skew;
        let my_ask = mid + self.params.spread / 2.0 + skew;
        let timestamp = tick.receive_ts;
        let sequence = tick.sequence;

        let buy = Order {
            version: Order::CURRENT_VERSION,
            order_id: self.order_ids.next(),
            instrument_id: self.params.instrument_id,
            side: Side::Buy as u8,
            price: my_bid,
            quantity: self.params.quantity,
            timestamp,
            sequence,
        };
        let sell = Order {
            version: Order::CURRENT_VERSION,
            order_id: self.order_ids.next(),
            instrument_id: self.params.instrument_id,
            side: Side::Sell as u8,
            price: my_ask,
            quantity: self.params.quantity,
            timestamp,
            sequence,
        };

        (Some(buy), Some(sell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PriceLevel, BOOK_DEPTH};

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

    // S1: strategy with spread=0.10, qty=10, tick bid=99.95 ask=100.05.
    #[test]
    fn quotes_around_mid_with_configured_spread() {
        let params = StrategyParams {
            spread: 0.10,
            quantity: 10.0,
            instrument_id: 1,
        };
        let position = Arc::new(Position::new(1));
        let mm = MarketMaker::new(params, position);

        let (buy, sell) = mm.on_tick(&tick(99.95, 100.05, 1));
        let buy = buy.unwrap();
        let sell = sell.unwrap();
        let (buy_quantity, sell_quantity) = (buy.quantity, sell.quantity);
        assert!((buy.price - 99.95).abs() < 1e-9);
        assert!((sell.price - 100.05).abs() < 1e-9);
        assert_eq!(buy_quantity, 10.0);
        assert_eq!(sell_quantity, 10.0);
    }

    #[test]
    fn skews_quotes_when_net_position_exceeds_threshold() {
        let params = StrategyParams {
            spread: 0.10,
            quantity: 10.0,
            instrument_id: 1,
        };
        let position = Arc::new(Position::new(1));
        position.apply_fill(Side::Buy, 150.0, 100.0);
        let mm = MarketMaker::new(params, position);

        let (buy, sell) = mm.on_tick(&tick(99.95, 100.05, 1));
        let buy = buy.unwrap();
        let sell = sell.unwrap();
        // Long past the threshold: skew lowers both quotes to encourage selling.
        assert!((buy.price - (99.95 - 0.01)).abs() < 1e-9);
        assert!((sell.price - (100.05 - 0.01)).abs() < 1e-9);
    }

    #[test]
    fn one_sided_book_yields_no_orders() {
        let params = StrategyParams {
            spread: 0.10,
            quantity: 10.0,
            instrument_id: 1,
        };
        let position = Arc::new(Position::new(1));
        let mm = MarketMaker::new(params, position);
        let mut t = tick(99.95, 100.05, 1);
        t.asks[0].size = 0.0;
        let (buy, sell) = mm.on_tick(&t);
        assert!(buy.is_none() && sell.is_none());
    }
}
