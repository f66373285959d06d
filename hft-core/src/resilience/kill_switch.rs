//! The risk gate's kill switch: a one-way latch engaged automatically by the
//! daily-loss rule (§4.4 check 2) or manually by an operator, disengaged only
//! by manual operator action.
//!
//! Distinct from `engine::CancellationToken`: this only affects the risk
//! gate's Allow/Block decision, not pipeline shutdown. Grounded on the
//! teacher's `resilience::kill_switch::KillSwitch`, which additionally wires
//! signal-driven pause/shutdown states not needed here — this keeps only the
//! engaged/disengaged latch.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct KillSwitch {
    engaged: AtomicBool,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self {
            engaged: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }

    pub fn engage(&self) {
        self.engaged.store(true, Ordering::Release);
    }

    /// Manual re-arm; per §9, automatic hysteresis or threshold re-arm is out
    /// of scope, so this is the only path back to disengaged.
    pub fn disengage(&self) {
        self.engaged.store(false, Ordering::Release);
    }
}
