//! Run configuration: the collaborator-facing shape handed to
//! `hft_core::run(config, cancellation)` (§6). Serde-derived so the
//! collaborator binaries (`hft-bins`) can load it from TOML; the core itself
//! never reads a file.

use crate::core::errors::ConfigError;
use crate::execution::rng::RandomMode;
use crate::risk::limits::RiskLimits;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    pub tick_ring_capacity: usize,
    pub pre_risk_ring_capacity: usize,
    pub approved_ring_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimitsConfig {
    pub max_order_qty: f64,
    pub max_position: f64,
    pub max_orders_per_sec: u32,
    pub max_notional_per_order: f64,
    pub daily_loss_limit: f64,
}

impl From<RiskLimitsConfig> for RiskLimits {
    fn from(c: RiskLimitsConfig) -> Self {
        RiskLimits {
            max_order_qty: c.max_order_qty,
            max_position: c.max_position,
            max_orders_per_sec: c.max_orders_per_sec,
            max_notional_per_order: c.max_notional_per_order,
            daily_loss_limit: c.daily_loss_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngModeConfig {
    Deterministic { seed: u64 },
    Crypto,
}

impl From<RngModeConfig> for RandomMode {
    fn from(c: RngModeConfig) -> Self {
        match c {
            RngModeConfig::Deterministic { seed } => RandomMode::DeterministicSeeded(seed),
            RngModeConfig::Crypto => RandomMode::Crypto,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub latency_mean_ms: f64,
    pub latency_stddev_ms: f64,
    pub fill_probability: f64,
    pub rng_mode: RngModeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub spread: f64,
    pub quantity: f64,
    pub instrument_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub path: String,
    /// Hex-encoded 32-byte HMAC key.
    pub hmac_key_hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub rings: RingConfig,
    pub risk_limits: RiskLimitsConfig,
    pub execution: ExecutionConfig,
    pub strategy: StrategyConfig,
    pub audit: AuditConfig,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for cap in [
            self.rings.tick_ring_capacity,
            self.rings.pre_risk_ring_capacity,
            self.rings.approved_ring_capacity,
        ] {
            if cap == 0 || !cap.is_power_of_two() {
                return Err(ConfigError::InvalidRingCapacity(cap));
            }
        }
        if self.strategy.quantity <= 0.0 {
            return Err(ConfigError::InvalidStrategyQuantity(self.strategy.quantity));
        }
        RiskLimits::from(self.risk_limits.clone())
            .validate()
            .map_err(ConfigError::InvalidRiskLimits)?;
        let key_len = self.audit.hmac_key_hex.len() / 2;
        if key_len != 32 {
            return Err(ConfigError::InvalidHmacKeyLen(key_len));
        }
        Ok(())
    }

    pub fn hmac_key(&self) -> Result<[u8; 32], ConfigError> {
        let bytes = hex::decode(&self.audit.hmac_key_hex)
            .map_err(|_| ConfigError::InvalidHmacKeyLen(self.audit.hmac_key_hex.len() / 2))?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| ConfigError::InvalidHmacKeyLen(v.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> RunConfig {
        RunConfig {
            rings: RingConfig {
                tick_ring_capacity: 1024,
                pre_risk_ring_capacity: 1024,
                approved_ring_capacity: 1024,
            },
            risk_limits: RiskLimitsConfig {
                max_order_qty: 100.0,
                max_position: 500.0,
                max_orders_per_sec: 50,
                max_notional_per_order: 20_000.0,
                daily_loss_limit: 1e9,
            },
            execution: ExecutionConfig {
                latency_mean_ms: 2.0,
                latency_stddev_ms: 0.5,
                fill_probability: 0.9,
                rng_mode: RngModeConfig::Deterministic { seed: 1 },
            },
            strategy: StrategyConfig {
                spread: 0.10,
                quantity: 10.0,
                instrument_id: 1,
            },
            audit: AuditConfig {
                path: "audit.bin".into(),
                hmac_key_hex: "00".repeat(32),
            },
        }
    }

    #[test]
    fn accepts_well_formed_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_ring_capacity() {
        let mut c = valid_config();
        c.rings.tick_ring_capacity = 100;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_short_hmac_key() {
        let mut c = valid_config();
        c.audit.hmac_key_hex = "00".repeat(16);
        assert!(c.validate().is_err());
    }

    #[test]
    fn hmac_key_round_trips_hex() {
        let c = valid_config();
        let key = c.hmac_key().unwrap();
        assert_eq!(key.len(), 32);
    }
}
