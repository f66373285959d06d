//! Market data ingest: decode fixed-layout ticks from a source and push them
//! onto the ingest->strategy ring.
//!
//! Generalizes the teacher's `data` module (which decoded huginn-specific feed
//! frames) into a small `TickSource` trait with two implementations useful
//! for both production and deterministic testing: a file-backed source that
//! reads a flat file of back-to-back `MarketDataTick` records, and an
//! in-memory source for unit/integration tests.

use crate::core::types::MarketDataTick;
use crate::core::DecodeError;
use std::io::Read;

/// Anything that can hand back the next tick in sequence.
pub trait TickSource: Send {
    /// Returns `Ok(None)` at end of stream, `Err` on a malformed record.
    fn next_tick(&mut self) -> Result<Option<MarketDataTick>, DecodeError>;
}

/// Reads a flat file of back-to-back `MarketDataTick::WIRE_SIZE`-byte records.
pub struct FileTickSource<R> {
    reader: R,
}

impl<R: Read> FileTickSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read + Send> TickSource for FileTickSource<R> {
    fn next_tick(&mut self) -> Result<Option<MarketDataTick>, DecodeError> {
        let mut buf = vec![0u8; MarketDataTick::WIRE_SIZE];
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .reader
                .read(&mut buf[filled..])
                .unwrap_or(0);
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(DecodeError::ShortFrame {
                expected: buf.len(),
                actual: filled,
            });
        }
        MarketDataTick::from_bytes(&buf).map(Some)
    }
}

/// In-memory tick source, primarily for tests and deterministic replay
/// scenarios (see `testing` module).
pub struct VecTickSource {
    ticks: std::vec::IntoIter<MarketDataTick>,
}

impl VecTickSource {
    pub fn new(ticks: Vec<MarketDataTick>) -> Self {
        Self {
            ticks: ticks.into_iter(),
        }
    }
}

impl TickSource for VecTickSource {
    fn next_tick(&mut self) -> Result<Option<MarketDataTick>, DecodeError> {
        Ok(self.ticks.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PriceLevel, BOOK_DEPTH};

    fn sample(seq: i64) -> MarketDataTick {
        MarketDataTick {
            version: 1,
            sequence: seq,
            instrument_id: 1,
            send_ts: seq,
            receive_ts: seq,
            bids: [PriceLevel {
                price: 100.0,
                size: 1.0,
            }; BOOK_DEPTH],
            asks: [PriceLevel {
                price: 100.5,
                size: 1.0,
            }; BOOK_DEPTH],
        }
    }

    #[test]
    fn vec_source_yields_in_order_then_none() {
        let mut src = VecTickSource::new(vec![sample(1), sample(2)]);
        let first_sequence = src.next_tick().unwrap().unwrap().sequence;
        let second_sequence = src.next_tick().unwrap().unwrap().sequence;
        assert_eq!(first_sequence, 1);
        assert_eq!(second_sequence, 2);
        assert!(src.next_tick().unwrap().is_none());
    }

    #[test]
    fn file_source_round_trips_through_bytes() {
        let tick = sample(7);
        let bytes = tick.as_bytes().to_vec();
        let mut src = FileTickSource::new(std::io::Cursor::new(bytes));
        let decoded = src.next_tick().unwrap().unwrap();
        assert_eq!(decoded, tick);
        assert!(src.next_tick().unwrap().is_none());
    }

    #[test]
    fn file_source_rejects_truncated_trailing_record() {
        let tick = sample(7);
        let mut bytes = tick.as_bytes().to_vec();
        bytes.truncate(bytes.len() - 5);
        let mut src = FileTickSource::new(std::io::Cursor::new(bytes));
        assert!(src.next_tick().is_err());
    }
}
