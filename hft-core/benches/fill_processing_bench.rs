//! Benchmark: Execution Simulator Fill Processing
//!
//! What's measured: accept-then-process-ready for a single order (the
//! common case), and a batch of orders released in the same tick. Fill
//! processing runs on the executor stage thread and touches the position
//! table's atomics plus an optional audit submit, so this is the cost that
//! has to stay under the per-tick budget on the hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hft_core::core::types::{Order, Side};
use hft_core::execution::rng::{RandomMode, RandomProvider};
use hft_core::execution::{ExecutionParams, ExecutionSimulator};
use hft_core::position::PositionTable;
use hft_core::time::SimulatedTime;
use std::sync::Arc;

fn order(id: i64, side: Side, price: f64) -> Order {
    Order {
        version: Order::CURRENT_VERSION,
        order_id: id,
        instrument_id: 1,
        side: side as u8,
        price,
        quantity: 1.0,
        timestamp: 0,
        sequence: 0,
    }
}

fn bench_single_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_processing");
    group.significance_level(0.01).sample_size(10000);

    let time = Arc::new(SimulatedTime::new(0, 1));
    let positions = Arc::new(PositionTable::new());
    let params = ExecutionParams {
        latency_mean_ticks: 0.0,
        latency_stddev_ticks: 0.0,
        fill_probability: 1.0,
    };
    let rng = RandomProvider::new(RandomMode::DeterministicSeeded(1));
    let mut sim = ExecutionSimulator::new(params, rng, positions, time, None);

    let mut id = 0i64;
    group.bench_function("accept_then_fill", |b| {
        b.iter(|| {
            id += 1;
            sim.accept(order(id, Side::Buy, 100.0));
            black_box(sim.process_ready());
        });
    });

    group.finish();
}

fn bench_batch_of_50_same_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_processing");
    group.significance_level(0.01).sample_size(1000);

    let time = Arc::new(SimulatedTime::new(0, 1));
    let positions = Arc::new(PositionTable::new());
    let params = ExecutionParams {
        latency_mean_ticks: 0.0,
        latency_stddev_ticks: 0.0,
        fill_probability: 1.0,
    };
    let rng = RandomProvider::new(RandomMode::DeterministicSeeded(2));
    let mut sim = ExecutionSimulator::new(params, rng, positions, time, None);

    let mut id = 0i64;
    group.bench_function("50_orders_one_batch", |b| {
        b.iter(|| {
            for i in 0..50 {
                id += 1;
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                sim.accept(order(id, side, 100.0));
            }
            black_box(sim.process_ready());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_fill, bench_batch_of_50_same_tick);
criterion_main!(benches);
