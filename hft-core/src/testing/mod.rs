//! Test-only helpers shared between unit tests and the `tests/` integration
//! suites: building sample ticks and a deterministic `RunConfig` without
//! repeating the same literals in every test module.

use crate::core::types::{MarketDataTick, PriceLevel, BOOK_DEPTH};

pub fn sample_tick(sequence: i64, bid: f64, ask: f64) -> MarketDataTick {
    MarketDataTick {
        version: MarketDataTick::CURRENT_VERSION,
        sequence,
        instrument_id: 1,
        send_ts: sequence,
        receive_ts: sequence,
        bids: [PriceLevel { price: bid, size: 10.0 }; BOOK_DEPTH],
        asks: [PriceLevel { price: ask, size: 10.0 }; BOOK_DEPTH],
    }
}

pub fn deterministic_hmac_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    key
}
