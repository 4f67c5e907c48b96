// Question countdown derived from an absolute deadline.
//
// The remaining value is recomputed from `deadline - now` on every
// tick rather than decremented, so missed or late ticks (suspended
// tabs, stalled runtimes) can skip values but never drift from the
// authority's clock.

use std::time::Duration;

use tokio::time::Instant;

/// Countdown for one active question.
#[derive(Debug, Clone)]
pub struct Countdown {
    deadline: Instant,
    tick: Duration,
    next_tick: Instant,
    last_remaining: u32,
}

impl Countdown {
    pub fn new(started_at: Instant, time_limit_secs: u32, tick: Duration) -> Self {
        Self {
            deadline: started_at + Duration::from_secs(u64::from(time_limit_secs)),
            tick,
            next_tick: started_at + tick,
            last_remaining: time_limit_secs,
        }
    }

    /// Whole seconds left, rounded up, floored at zero.
    pub fn remaining(&self, now: Instant) -> u32 {
        if now >= self.deadline {
            return 0;
        }
        let ms = (self.deadline - now).as_millis() as u64;
        ms.div_ceil(1000) as u32
    }

    /// When the next recomputation is due.
    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    /// Advance the tick schedule; returns the remaining value only
    /// when it changed since the last report.
    pub fn on_tick(&mut self, now: Instant) -> Option<u32> {
        self.next_tick = now + self.tick;
        let remaining = self.remaining(now);
        if remaining != self.last_remaining {
            self.last_remaining = remaining;
            Some(remaining)
        } else {
            None
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn starts_at_full_limit() {
        let start = Instant::now();
        let c = Countdown::new(start, 30, TICK);
        assert_eq!(c.remaining(start), 30);
    }

    #[test]
    fn rounds_partial_seconds_up() {
        let start = Instant::now();
        let c = Countdown::new(start, 30, TICK);
        // 29.5 s left still displays as 30.
        assert_eq!(c.remaining(start + Duration::from_millis(500)), 30);
        // Exactly 29 s left displays as 29.
        assert_eq!(c.remaining(start + Duration::from_secs(1)), 29);
        assert_eq!(c.remaining(start + Duration::from_millis(1100)), 29);
    }

    #[test]
    fn reaches_exactly_zero_and_stays_there() {
        let start = Instant::now();
        let c = Countdown::new(start, 30, TICK);
        assert_eq!(c.remaining(start + Duration::from_secs(30)), 0);
        assert_eq!(c.remaining(start + Duration::from_secs(31)), 0);
        assert!(c.is_expired(start + Duration::from_secs(30)));
    }

    #[test]
    fn zero_limit_is_immediately_expired() {
        let start = Instant::now();
        let c = Countdown::new(start, 0, TICK);
        assert_eq!(c.remaining(start), 0);
        assert!(c.is_expired(start));
    }

    #[test]
    fn on_tick_reports_only_changes() {
        let start = Instant::now();
        let mut c = Countdown::new(start, 3, TICK);
        // 100 ms in: still 3 whole seconds shown, no report.
        assert_eq!(c.on_tick(start + Duration::from_millis(100)), None);
        // Crossing the second boundary reports once.
        assert_eq!(c.on_tick(start + Duration::from_millis(1050)), Some(2));
        assert_eq!(c.on_tick(start + Duration::from_millis(1150)), None);
    }

    #[test]
    fn stalled_ticks_skip_values_without_drifting() {
        let start = Instant::now();
        let mut c = Countdown::new(start, 10, TICK);
        // A 4-second stall: the next tick lands on the true value.
        assert_eq!(c.on_tick(start + Duration::from_millis(4200)), Some(6));
    }

    proptest! {
        #[test]
        fn remaining_is_nonincreasing_and_bounded(
            limit in 0u32..=600,
            mut offsets_ms in proptest::collection::vec(0u64..700_000, 1..40),
        ) {
            let start = Instant::now();
            let c = Countdown::new(start, limit, TICK);
            prop_assert_eq!(c.remaining(start), limit);

            offsets_ms.sort_unstable();
            let mut prev = limit;
            for off in offsets_ms {
                let r = c.remaining(start + Duration::from_millis(off));
                prop_assert!(r <= prev, "countdown increased: {} -> {}", prev, r);
                prop_assert!(r <= limit);
                prev = r;
            }

            // The deadline itself reads exactly zero.
            prop_assert_eq!(c.remaining(start + Duration::from_secs(u64::from(limit))), 0);
        }
    }
}
