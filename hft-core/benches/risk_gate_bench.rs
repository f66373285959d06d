//! Benchmark: Pre-Trade Risk Gate Throughput
//!
//! What's measured: the cost of `PreTradeGate::evaluate`'s ordered check
//! waterfall on the common allow path, on a path that fails a late check
//! (max position), and with a per-symbol override resolved on every call.
//! This runs on its own stage thread (T3) and every approved order passes
//! through it, so its per-order cost bounds the risk gate's ceiling.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hft_core::core::types::{Order, Side};
use hft_core::position::Position;
use hft_core::resilience::KillSwitch;
use hft_core::risk::limits::{RiskLimits, SymbolLimits};
use hft_core::risk::PreTradeGate;
use std::sync::Arc;

fn limits() -> RiskLimits {
    RiskLimits {
        max_order_qty: 100.0,
        max_position: 500.0,
        max_orders_per_sec: 1_000_000,
        max_notional_per_order: 1_000_000.0,
        daily_loss_limit: 1e12,
    }
}

fn order(instrument_id: i64) -> Order {
    Order {
        version: Order::CURRENT_VERSION,
        order_id: 1,
        instrument_id,
        side: Side::Buy as u8,
        price: 100.0,
        quantity: 1.0,
        timestamp: 0,
        sequence: 0,
    }
}

fn bench_allow_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_gate");
    group.significance_level(0.01).sample_size(10000);

    let mut gate = PreTradeGate::new(limits(), Arc::new(KillSwitch::new()), 0);
    let pos = Position::new(1);
    let o = order(1);

    let mut now = 0i64;
    group.bench_function("evaluate_allow", |b| {
        b.iter(|| {
            now += 1;
            black_box(gate.evaluate(&o, &pos, now));
        });
    });

    group.finish();
}

fn bench_max_position_block_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_gate");
    group.significance_level(0.01).sample_size(10000);

    let mut gate = PreTradeGate::new(limits(), Arc::new(KillSwitch::new()), 0);
    let pos = Position::new(1);
    pos.apply_fill(Side::Buy, 499.0, 100.0);
    let o = order(1);

    let mut now = 0i64;
    group.bench_function("evaluate_max_position_block", |b| {
        b.iter(|| {
            now += 1;
            black_box(gate.evaluate(&o, &pos, now));
        });
    });

    group.finish();
}

fn bench_with_symbol_override(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_gate");
    group.significance_level(0.01).sample_size(10000);

    let mut gate = PreTradeGate::new(limits(), Arc::new(KillSwitch::new()), 0);
    gate.limits_table().set_override(
        1,
        SymbolLimits {
            max_order_qty: 50.0,
            max_position: 250.0,
            max_notional_per_order: 500_000.0,
        },
    );
    let pos = Position::new(1);
    let o = order(1);

    let mut now = 0i64;
    group.bench_function("evaluate_with_symbol_override", |b| {
        b.iter(|| {
            now += 1;
            black_box(gate.evaluate(&o, &pos, now));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_allow_path,
    bench_max_position_block_path,
    bench_with_symbol_override,
);
criterion_main!(benches);
