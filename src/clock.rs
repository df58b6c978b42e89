use std::time::{Duration, Instant};

/// Monotonic millisecond clock with a blocking delay.
///
/// Every wait in the firmware goes through `delay_ms`, so tests can drive
/// time with a manual clock instead of sleeping.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u64);
}

/// Wall clock backed by `Instant`; works on ESP-IDF (std) and the host.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Elapsed-time trigger for the refresh, rotation and inactivity intervals.
///
/// An interval of 0 disables the timer: it is never due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval_ms: u64,
    last_ms: u64,
}

impl IntervalTimer {
    pub fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: now_ms,
        }
    }

    pub fn from_secs(interval_secs: u32, now_ms: u64) -> Self {
        Self::new(u64::from(interval_secs) * 1000, now_ms)
    }

    pub fn is_enabled(&self) -> bool {
        self.interval_ms > 0
    }

    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ms)
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.is_enabled() && self.elapsed(now_ms) >= self.interval_ms
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }
}

/// Tick-based wait: polls `ready` every `poll_ms`, calling `on_tick` with the
/// tick number after each unsuccessful poll. There is no attempt limit.
///
/// Returns the number of ticks waited.
pub fn wait_until(
    clock: &mut dyn Clock,
    poll_ms: u64,
    mut ready: impl FnMut() -> bool,
    mut on_tick: impl FnMut(u32),
) -> u32 {
    let mut tick = 0u32;
    while !ready() {
        on_tick(tick);
        clock.delay_ms(poll_ms);
        tick = tick.wrapping_add(1);
    }
    tick
}

#[cfg(test)]
pub mod testing {
    use super::Clock;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manual clock for tests; `delay_ms` advances time instantly.
    /// Clones share the same time so a test can keep a handle.
    #[derive(Clone, Default)]
    pub struct ManualClock {
        now: Rc<Cell<u64>>,
        slept: Rc<Cell<u64>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }

        pub fn set(&self, ms: u64) {
            self.now.set(ms);
        }

        /// Total time spent inside `delay_ms`.
        pub fn slept_ms(&self) -> u64 {
            self.slept.get()
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn delay_ms(&mut self, ms: u64) {
            self.advance(ms);
            self.slept.set(self.slept.get() + ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[test]
    fn disabled_timer_is_never_due() {
        let timer = IntervalTimer::new(0, 0);
        for now in [0, 1, 1_000, u64::MAX / 2] {
            assert!(!timer.is_due(now));
        }
    }

    #[test]
    fn timer_fires_at_interval_and_restarts_on_reset() {
        let mut timer = IntervalTimer::from_secs(10, 500);
        assert!(!timer.is_due(500));
        assert!(!timer.is_due(10_499));
        assert!(timer.is_due(10_500));
        timer.reset(10_500);
        assert_eq!(timer.elapsed(10_500), 0);
        assert!(!timer.is_due(20_499));
        assert!(timer.is_due(20_500));
    }

    #[test]
    fn elapsed_saturates_when_clock_is_behind() {
        let timer = IntervalTimer::new(100, 1_000);
        assert_eq!(timer.elapsed(900), 0);
    }

    #[test]
    fn wait_until_ticks_on_the_injected_clock() {
        let mut clock = ManualClock::new();
        let probe = clock.clone();
        let mut ticks = Vec::new();
        let waited = wait_until(
            &mut clock,
            250,
            || probe.now_ms() >= 1_000,
            |t| ticks.push(t),
        );
        assert_eq!(waited, 4);
        assert_eq!(ticks, vec![0, 1, 2, 3]);
        assert_eq!(probe.slept_ms(), 1_000);
    }

    #[test]
    fn wait_until_returns_immediately_when_ready() {
        let mut clock = ManualClock::new();
        let waited = wait_until(&mut clock, 500, || true, |_| panic!("no tick expected"));
        assert_eq!(waited, 0);
        assert_eq!(clock.now_ms(), 0);
    }
}
