//! Pre-trade risk gate (C4): the authority between strategy intent and
//! executor action. Every candidate order runs the ordered check waterfall
//! in `PreTradeGate::evaluate`; the first failing check decides the
//! outcome, matching §4.4's table exactly.
//!
//! Grounded on the teacher's `risk::pre_trade::PreTradeValidator` for the
//! overall "ordered checks producing a typed decision with evidence" shape,
//! though the concrete checks follow the spec's table rather than the
//! teacher's exchange-rules set.

pub mod limits;
pub mod rate_limiter;

use crate::audit::AuditWriter;
use crate::core::types::{Order, RecordType, RiskDecisionRecord, Side};
use crate::position::Position;
use crate::resilience::KillSwitch;
use arc_swap::ArcSwap;
use limits::{RiskLimits, RiskLimitsTable};
use rate_limiter::RateLimiter;
use std::sync::Arc;

/// Why a check failed, carried on `Decision::Block`/`Decision::Throttle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    KillSwitch,
    DailyLoss,
    MaxOrderQty,
    MaxNotional,
    MaxPosition,
    MaxOrdersPerSec,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::KillSwitch => "KillSwitch",
            RejectionReason::DailyLoss => "DailyLoss",
            RejectionReason::MaxOrderQty => "MaxOrderQty",
            RejectionReason::MaxNotional => "MaxNotional",
            RejectionReason::MaxPosition => "MaxPosition",
            RejectionReason::MaxOrdersPerSec => "MaxOrdersPerSec",
        }
    }

    /// Stable byte encoding for the audit log's `RiskDecisionRecord::reason_code`.
    pub fn to_code(self) -> u8 {
        match self {
            RejectionReason::KillSwitch => 1,
            RejectionReason::DailyLoss => 2,
            RejectionReason::MaxOrderQty => 3,
            RejectionReason::MaxNotional => 4,
            RejectionReason::MaxPosition => 5,
            RejectionReason::MaxOrdersPerSec => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<RejectionReason> {
        match code {
            1 => Some(RejectionReason::KillSwitch),
            2 => Some(RejectionReason::DailyLoss),
            3 => Some(RejectionReason::MaxOrderQty),
            4 => Some(RejectionReason::MaxNotional),
            5 => Some(RejectionReason::MaxPosition),
            6 => Some(RejectionReason::MaxOrdersPerSec),
            _ => None,
        }
    }
}

/// The numbers behind a rejection, for the audit record's evidence fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence {
    pub actual: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Allow,
    Throttle {
        reason: RejectionReason,
        evidence: Evidence,
    },
    Block {
        reason: RejectionReason,
        evidence: Evidence,
    },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Owns the mutable risk state: swappable global limits, per-symbol
/// overrides, the kill switch, and the rolling rate-limit window.
///
/// Not `Sync` in the sense of being callable concurrently from multiple
/// threads doing decisions — §5 assigns the risk gate to a single thread
/// (T3) — but `limits`/`kill_switch` are read by other stages too (metrics,
/// a future admin surface), so those two pieces use atomics/ArcSwap.
pub struct PreTradeGate {
    limits: ArcSwap<RiskLimits>,
    limits_table: RiskLimitsTable,
    kill_switch: Arc<KillSwitch>,
    rate_limiter: RateLimiter,
}

impl PreTradeGate {
    pub fn new(limits: RiskLimits, kill_switch: Arc<KillSwitch>, now: i64) -> Self {
        let max_per_sec = limits.max_orders_per_sec;
        Self {
            limits: ArcSwap::from_pointee(limits),
            limits_table: RiskLimitsTable::new(),
            kill_switch,
            rate_limiter: RateLimiter::new(max_per_sec, now),
        }
    }

    pub fn limits_table(&self) -> &RiskLimitsTable {
        &self.limits_table
    }

    pub fn update_limits(&mut self, limits: RiskLimits) {
        self.rate_limiter.set_max_per_sec(limits.max_orders_per_sec);
        self.limits.store(Arc::new(limits));
    }

    pub fn current_limits(&self) -> Arc<RiskLimits> {
        self.limits.load_full()
    }

    pub fn kill_switch(&self) -> &Arc<KillSwitch> {
        &self.kill_switch
    }

    /// Runs the ordered decision procedure in §4.4. `position` is the
    /// instrument's current state (for the daily-loss and max-position
    /// checks); `now` is the current tick-unit timestamp for the rate
    /// window.
    pub fn evaluate(&mut self, order: &Order, position: &Position, now: i64) -> Decision {
        // 1. Kill switch.
        if self.kill_switch.is_engaged() {
            return Decision::Block {
                reason: RejectionReason::KillSwitch,
                evidence: Evidence {
                    actual: 1.0,
                    threshold: 0.0,
                },
            };
        }

        let limits = self.limits.load();

        // 2. Daily loss.
        let total_pnl = position.realized_pnl() + position.unrealized_pnl();
        if total_pnl < -limits.daily_loss_limit {
            self.kill_switch.engage();
            return Decision::Block {
                reason: RejectionReason::DailyLoss,
                evidence: Evidence {
                    actual: total_pnl,
                    threshold: -limits.daily_loss_limit,
                },
            };
        }

        // 3. Per-symbol resolution.
        let resolved = self.limits_table.resolve(order.instrument_id, &limits);

        // 4. Max order quantity.
        let order_quantity = order.quantity;
        if order_quantity > resolved.max_order_qty {
            return Decision::Block {
                reason: RejectionReason::MaxOrderQty,
                evidence: Evidence {
                    actual: order_quantity,
                    threshold: resolved.max_order_qty,
                },
            };
        }

        // 5. Max notional.
        let notional = order.notional();
        if notional > resolved.max_notional_per_order {
            return Decision::Block {
                reason: RejectionReason::MaxNotional,
                evidence: Evidence {
                    actual: notional,
                    threshold: resolved.max_notional_per_order,
                },
            };
        }

        // 6. Max position.
        let side = order.side();
        let signed_qty = side.sign() * order.quantity;
        let projected = (position.net_position() + signed_qty).abs();
        if projected > resolved.max_position {
            return Decision::Block {
                reason: RejectionReason::MaxPosition,
                evidence: Evidence {
                    actual: projected,
                    threshold: resolved.max_position,
                },
            };
        }

        // 7. Rate limit.
        if !self.rate_limiter.try_admit(now) {
            self.rate_limiter.record(now);
            return Decision::Throttle {
                reason: RejectionReason::MaxOrdersPerSec,
                evidence: Evidence {
                    actual: self.rate_limiter.count_in_window() as f64,
                    threshold: self.rate_limiter.max_per_sec() as f64,
                },
            };
        }
        self.rate_limiter.record(now);
        Decision::Allow
    }
}

/// Writes the audit record for a decision (§4.4 "Outputs"): `OrderSubmit`
/// for an Allow, `OrderReject` for a block, `RiskViolation` for a throttle.
/// Written before the caller attempts the approved-ring publish, so an order
/// this gate approved is always recorded even if the ring write that follows
/// fails (§9 design note: audit-before-publish is this spec's chosen
/// ordering, at the cost of an audit record for an order that never actually
/// reached the executor).
pub fn audit_decision(audit: &AuditWriter, now: i64, order: &Order, decision: &Decision) {
    if matches!(decision, Decision::Allow) {
        audit.submit(now, RecordType::OrderSubmit, order.as_bytes().to_vec());
        return;
    }
    let (reason, evidence, record_type) = match decision {
        Decision::Allow => unreachable!(),
        Decision::Block { reason, evidence } => (*reason, *evidence, RecordType::OrderReject),
        Decision::Throttle { reason, evidence } => (*reason, *evidence, RecordType::RiskViolation),
    };
    let record = RiskDecisionRecord {
        order_id: order.order_id,
        instrument_id: order.instrument_id,
        reason_code: reason.to_code(),
        actual: evidence.actual,
        threshold: evidence.threshold,
    };
    audit.submit(now, record_type, record.as_bytes().to_vec());
}
