//! Pipeline orchestration (§5): wires T1 (ingest) -> T2 (strategy) -> T3
//! (risk gate) -> T4 (executor) across three SPSC rings, each stage on its
//! own thread, cooperating on a shared `CancellationToken`.
//!
//! Grounded on the teacher's top-level `lib.rs`/`engine` module for the
//! "spawn one thread per stage, join with a bounded timeout on shutdown"
//! shape; the stage bodies themselves are this crate's own modules.

use crate::audit::AuditWriter;
use crate::config::RunConfig;
use crate::core::types::{MarketDataTick, Order};
use crate::execution::rng::RandomProvider;
use crate::execution::{ExecutionParams, ExecutionSimulator};
use crate::market_data::TickSource;
use crate::perf::PipelineMetrics;
use crate::position::PositionTable;
use crate::resilience::KillSwitch;
use crate::ring::SpscRing;
use crate::risk::limits::RiskLimits;
use crate::risk::{audit_decision, Decision, PreTradeGate};
use crate::strategy::{MarketMaker, StrategyParams};
use crate::time::{SystemTime, TimeProvider};
use prometheus::Registry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_BUDGET: usize = 10_000;

/// Shared stop signal observed at the top of every stage loop and between
/// iterations. Distinct from the risk gate's `KillSwitch` (§9): this stops
/// the pipeline; that only blocks new orders.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Idempotent: a second call after a completed stop is a no-op.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct PipelineHandle {
    threads: Vec<JoinHandle<()>>,
    cancellation: CancellationToken,
    pub metrics: Arc<PipelineMetrics>,
    pub positions: Arc<PositionTable>,
    pub metrics_registry: Registry,
}

impl PipelineHandle {
    /// Signals cancellation and waits (bounded) for every stage thread.
    pub fn stop_and_join(mut self) {
        self.cancellation.cancel();
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("stage").to_string();
            let (done_tx, done_rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let _ = handle.join();
                let _ = done_tx.send(());
            });
            if done_rx.recv_timeout(SHUTDOWN_JOIN_TIMEOUT).is_err() {
                warn!(stage = %name, "stage thread did not join within shutdown budget");
            }
        }
    }
}

/// Library entry point named in §6: constructs every stage, spawns its
/// thread, and returns a handle the collaborator can later stop and join.
pub fn run(config: RunConfig, cancellation: CancellationToken, tick_source: Box<dyn TickSource>) -> anyhow::Result<PipelineHandle> {
    config.validate()?;

    let registry = Registry::new();
    let metrics = Arc::new(PipelineMetrics::new(&registry));
    let positions = Arc::new(PositionTable::new());
    let kill_switch = Arc::new(KillSwitch::new());
    let time: Arc<dyn TimeProvider> = Arc::new(SystemTime::new());

    let tick_ring: Arc<SpscRing<MarketDataTick>> = Arc::new(SpscRing::new(config.rings.tick_ring_capacity));
    let pre_risk_ring: Arc<SpscRing<Order>> = Arc::new(SpscRing::new(config.rings.pre_risk_ring_capacity));
    let approved_ring: Arc<SpscRing<Order>> = Arc::new(SpscRing::new(config.rings.approved_ring_capacity));

    let audit = Arc::new(AuditWriter::new(&config.audit.path, config.hmac_key()?)?);

    let position = positions.get_or_insert(config.strategy.instrument_id);

    let mut threads = Vec::new();

    threads.push(spawn_ingest(
        tick_source,
        Arc::clone(&tick_ring),
        Arc::clone(&metrics),
        Arc::clone(&time),
        cancellation.clone(),
    ));

    threads.push(spawn_strategy(
        StrategyParams {
            spread: config.strategy.spread,
            quantity: config.strategy.quantity,
            instrument_id: config.strategy.instrument_id,
        },
        Arc::clone(&position),
        Arc::clone(&tick_ring),
        Arc::clone(&pre_risk_ring),
        Arc::clone(&metrics),
        cancellation.clone(),
    ));

    threads.push(spawn_risk_gate(
        RiskLimits::from(config.risk_limits.clone()),
        Arc::clone(&kill_switch),
        Arc::clone(&pre_risk_ring),
        Arc::clone(&approved_ring),
        Arc::clone(&positions),
        Arc::clone(&audit),
        Arc::clone(&metrics),
        Arc::clone(&time),
        cancellation.clone(),
    ));

    threads.push(spawn_executor(
        ExecutionParams {
            latency_mean_ticks: ms_to_ticks(config.execution.latency_mean_ms),
            latency_stddev_ticks: ms_to_ticks(config.execution.latency_stddev_ms),
            fill_probability: config.execution.fill_probability,
        },
        config.execution.rng_mode.into(),
        Arc::clone(&approved_ring),
        Arc::clone(&positions),
        Arc::clone(&time),
        Arc::clone(&audit),
        Arc::clone(&metrics),
        cancellation.clone(),
    ));

    Ok(PipelineHandle {
        threads,
        cancellation,
        metrics,
        positions,
        metrics_registry: registry,
    })
}

fn ms_to_ticks(ms: f64) -> f64 {
    ms * 10_000.0 // 1ms = 10_000 ticks of 100ns each
}

fn spawn_ingest(
    mut tick_source: Box<dyn TickSource>,
    tick_ring: Arc<SpscRing<MarketDataTick>>,
    metrics: Arc<PipelineMetrics>,
    time: Arc<dyn TimeProvider>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("ingest".into())
        .spawn(move || {
            while !cancellation.is_cancelled() {
                match tick_source.next_tick() {
                    Ok(Some(mut tick)) => {
                        let receive_ts = tick.receive_ts;
                        if receive_ts == 0 {
                            tick.receive_ts = time.now();
                        }
                        if tick_ring.try_write(tick) {
                            metrics.ticks_ingested.inc();
                        } else {
                            metrics.ticks_dropped.inc();
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!(error = %e, "tick decode error, skipping");
                        metrics.ticks_dropped.inc();
                    }
                }
            }
            info!("ingest stage exiting");
        })
        .expect("failed to spawn ingest thread")
}

fn spawn_strategy(
    params: StrategyParams,
    position: Arc<crate::position::Position>,
    tick_ring: Arc<SpscRing<MarketDataTick>>,
    pre_risk_ring: Arc<SpscRing<Order>>,
    metrics: Arc<PipelineMetrics>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("strategy".into())
        .spawn(move || {
            let maker = MarketMaker::new(params, position);
            let mut spin_count = 0u32;
            loop {
                if cancellation.is_cancelled() && tick_ring.is_empty() {
                    break;
                }
                match tick_ring.try_read() {
                    Some(tick) => {
                        spin_count = 0;
                        let (buy, sell) = maker.on_tick(&tick);
                        for order in [buy, sell].into_iter().flatten() {
                            if !pre_risk_ring.try_write(order) {
                                metrics.ticks_dropped.inc();
                            }
                        }
                    }
                    None => {
                        spin_count += 1;
                        if spin_count > 1000 {
                            std::thread::yield_now();
                        } else {
                            std::hint::spin_loop();
                        }
                    }
                }
            }
            info!("strategy stage exiting");
        })
        .expect("failed to spawn strategy thread")
}

#[allow(clippy::too_many_arguments)]
fn spawn_risk_gate(
    global_limits: RiskLimits,
    kill_switch: Arc<KillSwitch>,
    pre_risk_ring: Arc<SpscRing<Order>>,
    approved_ring: Arc<SpscRing<Order>>,
    positions: Arc<PositionTable>,
    audit: Arc<AuditWriter>,
    metrics: Arc<PipelineMetrics>,
    time: Arc<dyn TimeProvider>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("risk-gate".into())
        .spawn(move || {
            let mut gate = PreTradeGate::new(global_limits, kill_switch, time.now());
            let mut drained = 0usize;
            loop {
                if cancellation.is_cancelled() {
                    if pre_risk_ring.is_empty() || drained >= DRAIN_BUDGET {
                        break;
                    }
                }
                match pre_risk_ring.try_read() {
                    Some(order) => {
                        drained += 1;
                        let now = time.now();
                        let position = positions.get_or_insert(order.instrument_id);
                        let decision = gate.evaluate(&order, &position, now);
                        audit_decision(&audit, now, &order, &decision);
                        match decision {
                            Decision::Allow => {
                                if approved_ring.try_write(order) {
                                    metrics.orders_approved.inc();
                                } else {
                                    metrics.ticks_dropped.inc();
                                }
                            }
                            Decision::Block { .. } => {
                                metrics.orders_rejected.inc();
                            }
                            Decision::Throttle { .. } => {
                                metrics.orders_throttled.inc();
                            }
                        }
                    }
                    None => {
                        if cancellation.is_cancelled() {
                            break;
                        }
                        std::hint::spin_loop();
                    }
                }
            }
            info!("risk gate stage exiting");
        })
        .expect("failed to spawn risk-gate thread")
}

#[allow(clippy::too_many_arguments)]
fn spawn_executor(
    params: ExecutionParams,
    rng_mode: crate::execution::rng::RandomMode,
    approved_ring: Arc<SpscRing<Order>>,
    positions: Arc<PositionTable>,
    time: Arc<dyn TimeProvider>,
    audit: Arc<AuditWriter>,
    metrics: Arc<PipelineMetrics>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("executor".into())
        .spawn(move || {
            let rng = RandomProvider::new(rng_mode);
            let mut sim = ExecutionSimulator::new(params, rng, positions, time, Some(audit));
            let mut drained = 0usize;
            loop {
                if cancellation.is_cancelled() {
                    if approved_ring.is_empty() || drained >= DRAIN_BUDGET {
                        break;
                    }
                }
                match approved_ring.try_read() {
                    Some(order) => {
                        drained += 1;
                        sim.accept(order);
                    }
                    None => {
                        let outcomes = sim.process_ready();
                        metrics.fills.inc_by(outcomes.len() as u64);
                        if outcomes.is_empty() && sim.pending_count() == 0 {
                            if cancellation.is_cancelled() {
                                break;
                            }
                            std::hint::spin_loop();
                        }
                    }
                }
            }
            info!("executor stage exiting");
        })
        .expect("failed to spawn executor thread")
}
