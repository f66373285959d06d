//! Pipeline counters exposed via `prometheus`, mirroring the teacher's
//! monitoring surface. The HTTP exposition endpoint itself is a collaborator
//! concern (§1 Out-of-scope); this module only owns the counters the stages
//! increment.

use prometheus::{IntCounter, Registry};

pub struct PipelineMetrics {
    pub ticks_ingested: IntCounter,
    pub ticks_dropped: IntCounter,
    pub orders_approved: IntCounter,
    pub orders_rejected: IntCounter,
    pub orders_throttled: IntCounter,
    pub fills: IntCounter,
    pub audit_io_errors: IntCounter,
    pub audit_dropped: IntCounter,
}

impl PipelineMetrics {
    pub fn new(registry: &Registry) -> Self {
        let metrics = Self {
            ticks_ingested: IntCounter::new("hft_ticks_ingested_total", "ticks decoded and published").unwrap(),
            ticks_dropped: IntCounter::new("hft_ticks_dropped_total", "ticks dropped on a full ring").unwrap(),
            orders_approved: IntCounter::new("hft_orders_approved_total", "orders allowed by the risk gate").unwrap(),
            orders_rejected: IntCounter::new("hft_orders_rejected_total", "orders blocked by the risk gate").unwrap(),
            orders_throttled: IntCounter::new("hft_orders_throttled_total", "orders throttled by the rate limiter").unwrap(),
            fills: IntCounter::new("hft_fills_total", "fills produced by the executor").unwrap(),
            audit_io_errors: IntCounter::new("hft_audit_io_errors_total", "audit writes that exhausted retries").unwrap(),
            audit_dropped: IntCounter::new("hft_audit_dropped_total", "audit records dropped on a full channel").unwrap(),
        };
        for c in [
            &metrics.ticks_ingested,
            &metrics.ticks_dropped,
            &metrics.orders_approved,
            &metrics.orders_rejected,
            &metrics.orders_throttled,
            &metrics.fills,
            &metrics.audit_io_errors,
            &metrics.audit_dropped,
        ] {
            registry.register(Box::new(c.clone())).expect("metric name collision");
        }
        metrics
    }
}
