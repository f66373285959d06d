//! Rolling wall-clock-second order rate limiter.
//!
//! Owned exclusively by the risk gate's single thread (T3 in §5), so plain
//! fields suffice — no atomics needed here, unlike the position/ring state
//! that's genuinely shared across stages. Grounded on the teacher's
//! `risk::rate_limiter` windowed-counter approach, adapted to the spec's
//! strict-roll rule: once the clock has moved a full second past the window
//! start, the window resets rather than decaying gradually.

/// 100-nanosecond ticks per second, matching the core's timestamp unit (§3).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

pub struct RateLimiter {
    max_per_sec: u32,
    window_start: i64,
    count_in_window: u32,
}

impl RateLimiter {
    pub fn new(max_per_sec: u32, now: i64) -> Self {
        Self {
            max_per_sec,
            window_start: now,
            count_in_window: 0,
        }
    }

    pub fn set_max_per_sec(&mut self, max_per_sec: u32) {
        self.max_per_sec = max_per_sec;
    }

    /// Rolls the window if `now` is a full second past `window_start`, then
    /// checks whether one more order fits. Does not record the order; call
    /// `record` only once the caller has decided to admit it (a throttle
    /// still "uses" the window per the spec's scenario S3, so `record` is
    /// called unconditionally by the risk gate on a non-kill/non-loss path).
    pub fn try_admit(&mut self, now: i64) -> bool {
        if now - self.window_start >= TICKS_PER_SECOND {
            self.window_start = now;
            self.count_in_window = 0;
        }
        self.count_in_window < self.max_per_sec
    }

    pub fn record(&mut self, now: i64) {
        if now - self.window_start >= TICKS_PER_SECOND {
            self.window_start = now;
            self.count_in_window = 0;
        }
        self.count_in_window += 1;
    }

    pub fn count_in_window(&self) -> u32 {
        self.count_in_window
    }

    pub fn max_per_sec(&self) -> u32 {
        self.max_per_sec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_throttles() {
        let mut rl = RateLimiter::new(2, 0);
        assert!(rl.try_admit(0));
        rl.record(0);
        assert!(rl.try_admit(1_000_000));
        rl.record(1_000_000);
        assert!(!rl.try_admit(2_000_000));
    }

    #[test]
    fn window_rolls_after_full_second() {
        let mut rl = RateLimiter::new(2, 0);
        rl.record(0);
        rl.record(100);
        assert!(!rl.try_admit(9_999_999));
        assert!(rl.try_admit(10_000_000));
    }

    #[test]
    fn first_window_counts_from_zero() {
        let mut rl = RateLimiter::new(1, 0);
        assert!(rl.try_admit(0));
    }
}
