//! Ambient performance utilities: CPU pinning, metrics, object pools.

pub mod cpu;
pub mod metrics;
pub mod pools;

pub use metrics::PipelineMetrics;
pub use pools::{ObjectPool, PoolGuard};
