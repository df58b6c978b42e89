use log::{info, warn};

use crate::astronomy::MoonCalculator;
use crate::clock::{Clock, IntervalTimer};
use crate::config::Settings;
use crate::weather::{WeatherClient, WeatherSnapshot, ALLOWED_FORECAST_HOURS, MAX_FORECASTS};

const SETTLE_MS: u64 = 1_000;

/// Which refresh steps produced new data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    pub current: bool,
    pub forecast: bool,
    pub astronomy: bool,
}

impl RefreshReport {
    pub fn all_ok(&self) -> bool {
        self.current && self.forecast && self.astronomy
    }
}

/// Data sources the refresh cycle pulls from.
pub struct RefreshSources<'a> {
    pub weather: &'a mut dyn WeatherClient,
    pub moon: &'a dyn MoonCalculator,
}

/// Periodic refresh of the weather snapshot.
pub struct DataRefresh {
    timer: IntervalTimer,
    cycles: u32,
}

impl DataRefresh {
    pub fn new(interval_secs: u32, now_ms: u64) -> Self {
        Self {
            timer: IntervalTimer::from_secs(interval_secs, now_ms),
            cycles: 0,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.timer.is_due(now_ms)
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Fetch conditions, forecast and astronomy in that order, each behind
    /// a progress screen. A failed step keeps its stale portion of the
    /// snapshot. The timer restarts once, after the settle delay.
    pub fn run(
        &mut self,
        snapshot: &mut WeatherSnapshot,
        sources: RefreshSources<'_>,
        settings: &Settings,
        clock: &mut dyn Clock,
        epoch_secs: i64,
        mut progress: impl FnMut(u8, &str),
    ) -> RefreshReport {
        let mut report = RefreshReport::default();

        progress(50, "Updating conditions...");
        match sources
            .weather
            .fetch_current(&settings.owm_api_key, &settings.owm_location_id)
        {
            Ok(current) => {
                snapshot.current = Some(current);
                report.current = true;
            }
            Err(e) => warn!("Current conditions update failed: {:#}", e),
        }

        progress(70, "Updating forecasts...");
        match sources.weather.fetch_forecast(
            &settings.owm_api_key,
            &settings.owm_location_id,
            MAX_FORECASTS,
            &ALLOWED_FORECAST_HOURS,
        ) {
            Ok(forecasts) => {
                snapshot.forecasts = forecasts;
                report.forecast = true;
            }
            Err(e) => warn!("Forecast update failed: {:#}", e),
        }

        progress(80, "Updating astronomy...");
        snapshot.moon = Some(sources.moon.moon_data(epoch_secs));
        report.astronomy = true;

        clock.delay_ms(SETTLE_MS);
        self.timer.reset(clock.now_ms());
        self.cycles += 1;
        info!(
            "Refresh #{} done: current={} forecast={} astronomy={}",
            self.cycles, report.current, report.forecast, report.astronomy
        );
        report
    }
}
