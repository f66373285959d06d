//! Single-writer, many-reader position/PnL state.
//!
//! Grounded on the teacher's `core::types::Position`: `#[repr(C, align(64))]`,
//! one atomic per field, a `sequence` SeqLock for consumers that need a
//! cross-field-consistent snapshot. The teacher stores fixed-point `i64`/`u64`
//! scaled integers; this keeps the atomics-plus-SeqLock mechanism but stores
//! `f64` bit patterns (`AtomicU64::from(f64::to_bits(x))`) per the IEEE-754
//! double requirement on the hot path.
//!
//! Ownership follows §4.6/§9: the executor calls `apply_fill` and the
//! strategy loop calls `mark_to_market`, so the SeqLock's single-writer
//! requirement doesn't hold for free — both paths serialize through
//! `write_lock` before entering the odd/even critical section. Every other
//! reader gets a `PositionSnapshot` off acquire loads without taking it.

use crate::core::types::{PositionSnapshot, Side};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[inline]
fn load_f64(cell: &AtomicU64, order: Ordering) -> f64 {
    f64::from_bits(cell.load(order))
}

#[inline]
fn store_f64(cell: &AtomicU64, value: f64, order: Ordering) {
    cell.store(value.to_bits(), order);
}

/// Net position and PnL for a single instrument.
#[repr(C, align(64))]
pub struct Position {
    instrument_id: i64,
    net_position: AtomicU64,
    avg_entry_price: AtomicU64,
    realized_pnl: AtomicU64,
    unrealized_pnl: AtomicU64,
    /// SeqLock counter: odd while a write is in progress, even when stable.
    sequence: AtomicU64,
    /// Serializes `apply_fill` and `mark_to_market`, the two independent
    /// callers of the SeqLock write side, so at most one of them is ever
    /// mid-critical-section at a time.
    write_lock: Mutex<()>,
}

impl Position {
    pub fn new(instrument_id: i64) -> Self {
        Self {
            instrument_id,
            net_position: AtomicU64::new(0f64.to_bits()),
            avg_entry_price: AtomicU64::new(0f64.to_bits()),
            realized_pnl: AtomicU64::new(0f64.to_bits()),
            unrealized_pnl: AtomicU64::new(0f64.to_bits()),
            sequence: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    pub fn instrument_id(&self) -> i64 {
        self.instrument_id
    }

    #[inline]
    pub fn net_position(&self) -> f64 {
        load_f64(&self.net_position, Ordering::Acquire)
    }

    #[inline]
    pub fn avg_entry_price(&self) -> f64 {
        load_f64(&self.avg_entry_price, Ordering::Acquire)
    }

    #[inline]
    pub fn realized_pnl(&self) -> f64 {
        load_f64(&self.realized_pnl, Ordering::Acquire)
    }

    #[inline]
    pub fn unrealized_pnl(&self) -> f64 {
        load_f64(&self.unrealized_pnl, Ordering::Acquire)
    }

    pub fn total_pnl(&self) -> f64 {
        self.realized_pnl() + self.unrealized_pnl()
    }

    /// A mutually-consistent view across all four fields, via the SeqLock
    /// double-read-and-compare protocol. Individual field reads above are
    /// cheaper and sufficient when cross-field consistency doesn't matter.
    pub fn snapshot(&self) -> PositionSnapshot {
        loop {
            let seq1 = self.sequence.load(Ordering::Acquire);
            if seq1 & 1 != 0 {
                std::hint::spin_loop();
                continue;
            }
            let net_position = load_f64(&self.net_position, Ordering::Acquire);
            let avg_entry_price = load_f64(&self.avg_entry_price, Ordering::Acquire);
            let realized_pnl = load_f64(&self.realized_pnl, Ordering::Acquire);
            let unrealized_pnl = load_f64(&self.unrealized_pnl, Ordering::Acquire);
            let seq2 = self.sequence.load(Ordering::Acquire);
            if seq1 == seq2 {
                return PositionSnapshot {
                    instrument_id: self.instrument_id,
                    net_position,
                    avg_entry_price,
                    realized_pnl,
                    unrealized_pnl,
                };
            }
        }
    }

    /// Executor-only: applies a fill using weighted-average accounting.
    ///
    /// `signed_qty` is `+quantity` for a buy, `-quantity` for a sell. Returns
    /// the realized PnL delta from this fill (0.0 if purely opening/adding).
    pub fn apply_fill(&self, side: Side, quantity: f64, fill_price: f64) -> f64 {
        let _guard = self.write_lock.lock().unwrap();
        let signed_qty = side.sign() * quantity;
        self.sequence.fetch_add(1, Ordering::AcqRel); // enter write (now odd)

        let old_pos = self.net_position();
        let avg_entry = self.avg_entry_price();
        let new_pos = old_pos + signed_qty;

        let mut realized_delta = 0.0;
        if old_pos != 0.0 && old_pos.signum() != signed_qty.signum() {
            let closing_qty = signed_qty.abs().min(old_pos.abs());
            realized_delta = if old_pos > 0.0 {
                (fill_price - avg_entry) * closing_qty
            } else {
                (avg_entry - fill_price) * closing_qty
            };
        }

        let new_avg_entry = if new_pos == 0.0 {
            0.0
        } else if new_pos.signum() == signed_qty.signum() {
            if old_pos.signum() == new_pos.signum() && old_pos != 0.0 {
                // Adding to an existing position in the same direction: size-weighted mean.
                let surviving_old = old_pos.abs();
                (avg_entry * surviving_old + fill_price * quantity) / (surviving_old + quantity)
            } else {
                // Flat-to-open or flip: surviving exposure is entirely at fill_price.
                fill_price
            }
        } else {
            avg_entry
        };

        store_f64(&self.net_position, new_pos, Ordering::Relaxed);
        store_f64(&self.avg_entry_price, new_avg_entry, Ordering::Relaxed);
        if realized_delta != 0.0 {
            let new_realized = self.realized_pnl() + realized_delta;
            store_f64(&self.realized_pnl, new_realized, Ordering::Relaxed);
        }

        self.sequence.fetch_add(1, Ordering::Release); // exit write (now even)
        realized_delta
    }

    /// Strategy-only (per §4.3/§4.6): recomputes `unrealized_pnl` from `mid`.
    /// This is the only path that updates `unrealized_pnl`.
    pub fn mark_to_market(&self, mid: f64) {
        let _guard = self.write_lock.lock().unwrap();
        self.sequence.fetch_add(1, Ordering::AcqRel);
        let net_position = self.net_position();
        let avg_entry = self.avg_entry_price();
        let unrealized = if net_position > 0.0 {
            (mid - avg_entry) * net_position
        } else if net_position < 0.0 {
            (avg_entry - mid) * net_position.abs()
        } else {
            0.0
        };
        store_f64(&self.unrealized_pnl, unrealized, Ordering::Relaxed);
        self.sequence.fetch_add(1, Ordering::Release);
    }
}

/// Per-instrument position table. `DashMap` (teacher dependency) gives
/// lock-free-ish sharded reads; each instrument's `Position` itself is the
/// single-writer/many-reader object described in §4.6.
#[derive(Default)]
pub struct PositionTable {
    positions: DashMap<i64, Arc<Position>>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
        }
    }

    pub fn get_or_insert(&self, instrument_id: i64) -> Arc<Position> {
        self.positions
            .entry(instrument_id)
            .or_insert_with(|| Arc::new(Position::new(instrument_id)))
            .clone()
    }

    pub fn get(&self, instrument_id: i64) -> Option<Arc<Position>> {
        self.positions.get(&instrument_id).map(|r| r.clone())
    }

    /// A snapshot of every tracked instrument, for callers (audit re-drive,
    /// debug tooling) that want the whole book rather than one instrument.
    pub fn snapshot_all(&self) -> Vec<PositionSnapshot> {
        self.positions.iter().map(|entry| entry.value().snapshot()).collect()
    }
}
