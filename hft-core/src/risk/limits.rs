//! Risk limit configuration: a global floor plus optional per-symbol
//! overrides, swappable at runtime without locking readers out.
//!
//! The teacher encodes risk limits as compile-time `cfg` features
//! (`engine::risk`'s `MAX_POSITION`/`MAX_SHORT`/... consts, selected by
//! Cargo feature). This expansion follows the spec's explicit runtime-update
//! requirement instead (see DESIGN.md): `RiskLimits` lives behind
//! `arc_swap::ArcSwap`, which the teacher already depends on for exactly
//! this "atomically replaceable immutable snapshot" pattern.

use dashmap::DashMap;

/// Global risk posture. Immutable once constructed; replace the whole value
/// via `ArcSwap::store` to update at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimits {
    pub max_order_qty: f64,
    pub max_position: f64,
    pub max_orders_per_sec: u32,
    pub max_notional_per_order: f64,
    pub daily_loss_limit: f64,
}

impl RiskLimits {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_order_qty <= 0.0 {
            return Err("max_order_qty must be positive".into());
        }
        if self.max_position <= 0.0 {
            return Err("max_position must be positive".into());
        }
        if self.max_notional_per_order <= 0.0 {
            return Err("max_notional_per_order must be positive".into());
        }
        if self.daily_loss_limit <= 0.0 {
            return Err("daily_loss_limit must be positive".into());
        }
        Ok(())
    }
}

/// Per-symbol override of the three order-sizing limits. Anything not
/// overridden falls back to the global `RiskLimits` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolLimits {
    pub max_order_qty: f64,
    pub max_position: f64,
    pub max_notional_per_order: f64,
}

/// Resolved limits for a single symbol: global values with any per-symbol
/// override applied field-by-field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLimits {
    pub max_order_qty: f64,
    pub max_position: f64,
    pub max_notional_per_order: f64,
}

/// Holds the global limits plus the per-symbol override table.
pub struct RiskLimitsTable {
    overrides: DashMap<i64, SymbolLimits>,
}

impl RiskLimitsTable {
    pub fn new() -> Self {
        Self {
            overrides: DashMap::new(),
        }
    }

    pub fn set_override(&self, instrument_id: i64, limits: SymbolLimits) {
        self.overrides.insert(instrument_id, limits);
    }

    pub fn remove_override(&self, instrument_id: i64) {
        self.overrides.remove(&instrument_id);
    }

    pub fn resolve(&self, instrument_id: i64, global: &RiskLimits) -> ResolvedLimits {
        match self.overrides.get(&instrument_id) {
            Some(over) => ResolvedLimits {
                max_order_qty: over.max_order_qty,
                max_position: over.max_position,
                max_notional_per_order: over.max_notional_per_order,
            },
            None => ResolvedLimits {
                max_order_qty: global.max_order_qty,
                max_position: global.max_position,
                max_notional_per_order: global.max_notional_per_order,
            },
        }
    }
}

impl Default for RiskLimitsTable {
    fn default() -> Self {
        Self::new()
    }
}
