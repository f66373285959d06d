//! Fixed-layout, immutable value types shared across every pipeline stage.
//!
//! These mirror the teacher's "zero heap ownership, Copy semantics, cache-line
//! aware" value objects (see `bog-core::core::types`), but traded the teacher's
//! fixed-point `i64` scaled representation for plain `f64`, per the explicit
//! IEEE-754 double requirement downstream. Every wire/audit entity here is
//! `#[repr(C, packed)]` so its in-memory layout *is* its wire layout: no
//! serializer sits between a tick arriving on the network and a strategy
//! reading it.

use crate::core::errors::DecodeError;
use std::mem::MaybeUninit;

/// Buy or sell, as it appears on both orders and fills.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy = 1,
    Sell = 2,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }

    #[inline]
    fn from_u8(v: u8) -> Option<Side> {
        match v {
            1 => Some(Side::Buy),
            2 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// One level of a book side: price and size.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

impl PriceLevel {
    pub const EMPTY: PriceLevel = PriceLevel {
        price: 0.0,
        size: 0.0,
    };
}

pub const BOOK_DEPTH: usize = 5;

/// A single market data tick: top-of-book plus `BOOK_DEPTH` levels per side.
///
/// Fixed at 193 bytes: `1 (version) + 8*4 (sequence, instrument_id, send_ts,
/// receive_ts) + 16*5*2 (bids, asks) = 1 + 32 + 160 = 193`.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketDataTick {
    pub version: u8,
    pub sequence: i64,
    pub instrument_id: i64,
    /// Exchange-side send timestamp, nanoseconds since epoch.
    pub send_ts: i64,
    /// Local receive timestamp, nanoseconds since epoch, stamped at ingest.
    pub receive_ts: i64,
    pub bids: [PriceLevel; BOOK_DEPTH],
    pub asks: [PriceLevel; BOOK_DEPTH],
}

impl MarketDataTick {
    pub const WIRE_SIZE: usize = std::mem::size_of::<MarketDataTick>();
    pub const CURRENT_VERSION: u8 = 1;

    #[inline]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        let level = self.bids[0];
        (level.size > 0.0).then_some(level)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        let level = self.asks[0];
        (level.size > 0.0).then_some(level)
    }

    #[inline]
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / 2.0)
    }

    /// Reinterprets a byte slice as a tick without copying beyond the struct
    /// itself. `buf` must contain at least `WIRE_SIZE` bytes; trailing bytes
    /// are ignored, matching the teacher's framed-record decode convention.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

const _: () = assert!(MarketDataTick::WIRE_SIZE == 193);

/// An order as submitted to the risk gate and, if allowed, to the executor.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub version: u8,
    pub order_id: i64,
    pub instrument_id: i64,
    pub side: u8,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: i64,
    /// Sequence number of the tick that caused this order, for forensic replay.
    pub sequence: i64,
}

impl Order {
    pub const WIRE_SIZE: usize = std::mem::size_of::<Order>();
    pub const CURRENT_VERSION: u8 = 1;

    #[inline]
    pub fn side(&self) -> Side {
        let raw = self.side;
        Side::from_u8(raw).expect("Order constructed with invalid side byte")
    }

    #[inline]
    pub fn notional(&self) -> f64 {
        let price = self.price;
        let qty = self.quantity;
        price * qty
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

/// A fill reported back by the execution simulator.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub version: u8,
    pub fill_id: i64,
    pub order_id: i64,
    pub instrument_id: i64,
    pub side: u8,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: i64,
}

impl Fill {
    pub const WIRE_SIZE: usize = std::mem::size_of::<Fill>();
    pub const CURRENT_VERSION: u8 = 1;

    #[inline]
    pub fn side(&self) -> Side {
        let raw = self.side;
        Side::from_u8(raw).expect("Fill constructed with invalid side byte")
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

/// Point-in-time view of a single instrument's position, read out of the
/// SeqLock-protected atomics in `position::Position` (see position/mod.rs).
/// Packed so it can be written directly as an audit `PnlUpdate` payload.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSnapshot {
    pub instrument_id: i64,
    pub net_position: f64,
    pub avg_entry_price: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
}

impl PositionSnapshot {
    pub const WIRE_SIZE: usize = std::mem::size_of::<PositionSnapshot>();

    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

/// Audit payload for a risk decision that was not a plain Allow: which check
/// failed, and the actual/threshold values that decided it (§4.4 "Outputs").
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskDecisionRecord {
    pub order_id: i64,
    pub instrument_id: i64,
    /// Maps to `risk::RejectionReason` by discriminant; kept as a plain byte
    /// here so `core` doesn't depend on `risk`.
    pub reason_code: u8,
    pub actual: f64,
    pub threshold: f64,
}

impl RiskDecisionRecord {
    pub const WIRE_SIZE: usize = std::mem::size_of::<RiskDecisionRecord>();

    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

/// Audit payload for the RNG draw behind one fill decision (§4.5, §9:
/// "all random draws must be journaled when audit mode requires bit-exact
/// replay"). Carried as a `RecordType::SystemEvent` record, correlated to
/// its `Fill`/`OrderCancel` sibling by `fill_id`.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RngDrawRecord {
    pub fill_id: i64,
    pub latency_u01: f64,
    pub fill_u01: f64,
    pub partial_fraction_u01: f64,
}

impl RngDrawRecord {
    pub const WIRE_SIZE: usize = std::mem::size_of::<RngDrawRecord>();

    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        read_packed(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        write_packed(self)
    }
}

/// Discriminates the payload carried by an `AuditRecord`; persisted as the
/// single-byte `record_type` field in the on-disk framing (audit::writer).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    OrderSubmit = 1,
    OrderReject = 2,
    OrderCancel = 3,
    Fill = 4,
    RiskViolation = 5,
    PnlUpdate = 6,
    Tick = 7,
    SystemEvent = 255,
}

impl RecordType {
    pub fn from_u8(v: u8) -> Option<RecordType> {
        match v {
            1 => Some(RecordType::OrderSubmit),
            2 => Some(RecordType::OrderReject),
            3 => Some(RecordType::OrderCancel),
            4 => Some(RecordType::Fill),
            5 => Some(RecordType::RiskViolation),
            6 => Some(RecordType::PnlUpdate),
            7 => Some(RecordType::Tick),
            255 => Some(RecordType::SystemEvent),
            _ => None,
        }
    }
}

/// Copies `size_of::<T>()` bytes out of `buf` into a freshly materialized `T`.
///
/// Sound for any `T` that is `Copy`, has no padding (guaranteed by
/// `repr(C, packed)` over primitive fields only), and has no invalid bit
/// patterns for the field types involved (`u8`, `i64`, `f64`).
fn read_packed<T: Copy>(buf: &[u8]) -> Result<T, DecodeError> {
    let expected = std::mem::size_of::<T>();
    if buf.len() < expected {
        return Err(DecodeError::ShortFrame {
            expected,
            actual: buf.len(),
        });
    }
    let mut out = MaybeUninit::<T>::uninit();
    unsafe {
        std::ptr::copy_nonoverlapping(buf.as_ptr(), out.as_mut_ptr() as *mut u8, expected);
        Ok(out.assume_init())
    }
}

fn write_packed<T: Copy>(value: &T) -> &[u8] {
    unsafe { std::slice::from_raw_parts((value as *const T) as *const u8, std::mem::size_of::<T>()) }
}
