//! Domain-specific error types for the pipeline's boundary-crossing failures.
//!
//! Stage loops never propagate these across thread boundaries (see engine::stage);
//! they are surfaced as explicit decision values and counters, and mirrored into the
//! audit log. These types exist for the handful of places that do need a typed
//! `Result`: decoding, audit I/O, replay, and config validation.

use thiserror::Error;

/// A received frame could not be reinterpreted as a fixed-layout entity.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },
}

/// Configuration rejected at `run(...)` entry, before any stage starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ring capacity {0} must be a nonzero power of two")]
    InvalidRingCapacity(usize),
    #[error("hmac key must be exactly 32 bytes, got {0}")]
    InvalidHmacKeyLen(usize),
    #[error("strategy quantity must be positive, got {0}")]
    InvalidStrategyQuantity(f64),
    #[error("risk limits invalid: {0}")]
    InvalidRiskLimits(String),
}

/// Audit write/replay failures.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit I/O failed after {attempts} bounded retries: {source}")]
    Io {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// Fatal to replay: HMAC over the record header+payload did not match the
    /// stored tag. Replay halts immediately per §4.7.
    #[error("tamper detected at record {index} (byte offset {offset}): HMAC mismatch")]
    Tamper { index: u64, offset: u64 },

    #[error("record framing corrupt at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: &'static str },

    #[error("unknown record marker at offset {offset}")]
    BadMarker { offset: u64 },
}
