use log::{info, warn};

use crate::clock::{Clock, IntervalTimer};

/// Progress steps of the sleep sequence, one second apart.
const SLEEP_STEPS: [u8; 4] = [25, 50, 75, 100];
const SLEEP_STEP_DELAY_MS: u64 = 1_000;
pub const SLEEP_MESSAGE: &str = "Going to Sleep!";

/// How the platform halts. Chosen once per build.
#[derive(Clone, Copy)]
pub enum PowerControl {
    /// Enter deep sleep with no wakeup source. Does not return on hardware.
    Supported(fn()),
    /// Nothing to halt; the loop keeps running.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The halt function returned (only possible off-target or in tests).
    Halted,
    /// Platform cannot sleep; latched so the sequence runs once.
    NotSupported,
}

/// Inactivity timer plus the one-way sleep transition.
pub struct PowerManager {
    inactivity: IntervalTimer,
    control: PowerControl,
    requested: bool,
}

impl PowerManager {
    pub fn new(sleep_secs: u32, control: PowerControl, now_ms: u64) -> Self {
        Self {
            inactivity: IntervalTimer::from_secs(sleep_secs, now_ms),
            control,
            requested: false,
        }
    }

    /// Start counting inactivity from now. Called once at the end of boot.
    pub fn start(&mut self, now_ms: u64) {
        self.inactivity.reset(now_ms);
    }

    /// True when the sleep interval is enabled, has elapsed, and no request
    /// has been made yet.
    pub fn should_sleep(&self, now_ms: u64) -> bool {
        !self.requested && self.inactivity.is_due(now_ms)
    }

    /// Run the sleep sequence: progress at 25/50/75/100 with a one second
    /// pause after each, then halt through the platform.
    pub fn enter_sleep(
        &mut self,
        clock: &mut dyn Clock,
        mut progress: impl FnMut(u8, &str),
    ) -> SleepOutcome {
        info!("Inactivity interval elapsed, going to sleep");
        self.requested = true;
        for pct in SLEEP_STEPS {
            progress(pct, SLEEP_MESSAGE);
            clock.delay_ms(SLEEP_STEP_DELAY_MS);
        }
        match self.control {
            PowerControl::Supported(halt) => {
                info!("Entering deep sleep");
                halt();
                SleepOutcome::Halted
            }
            PowerControl::Unsupported => {
                warn!("Deep sleep not supported on this platform, staying awake");
                SleepOutcome::NotSupported
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    static HALTS: AtomicU32 = AtomicU32::new(0);

    fn fake_halt() {
        HALTS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn disabled_interval_never_sleeps() {
        let pm = PowerManager::new(0, PowerControl::Unsupported, 0);
        assert!(!pm.should_sleep(0));
        assert!(!pm.should_sleep(1_000_000_000));
    }

    #[test]
    fn sleeps_once_interval_elapsed() {
        let mut pm = PowerManager::new(60, PowerControl::Unsupported, 0);
        pm.start(5_000);
        assert!(!pm.should_sleep(64_999));
        assert!(pm.should_sleep(65_000));
    }

    #[test]
    fn sequence_reports_progress_and_pauses() {
        let mut clock = ManualClock::new();
        let mut pm = PowerManager::new(1, PowerControl::Unsupported, 0);
        let mut steps = Vec::new();
        let outcome = pm.enter_sleep(&mut clock, |pct, text| steps.push((pct, text.to_string())));
        assert_eq!(outcome, SleepOutcome::NotSupported);
        assert_eq!(
            steps.iter().map(|s| s.0).collect::<Vec<_>>(),
            vec![25, 50, 75, 100]
        );
        assert!(steps.iter().all(|s| s.1 == SLEEP_MESSAGE));
        assert_eq!(clock.slept_ms(), 4_000);
    }

    #[test]
    fn unsupported_request_latches() {
        let mut clock = ManualClock::new();
        let mut pm = PowerManager::new(1, PowerControl::Unsupported, 0);
        assert!(pm.should_sleep(1_000));
        pm.enter_sleep(&mut clock, |_, _| {});
        assert!(!pm.should_sleep(100_000));
    }

    #[test]
    fn supported_control_calls_halt() {
        let mut clock = ManualClock::new();
        let mut pm = PowerManager::new(1, PowerControl::Supported(fake_halt), 0);
        let before = HALTS.load(Ordering::SeqCst);
        assert_eq!(pm.enter_sleep(&mut clock, |_, _| {}), SleepOutcome::Halted);
        assert_eq!(HALTS.load(Ordering::SeqCst), before + 1);
    }
}
