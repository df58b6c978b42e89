//! Host build: the same station loop against synthetic collaborators.

use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use embedded_graphics::pixelcolor::Rgb565;
use log::{debug, info};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::astronomy::Astronomy;
use crate::clock::SystemClock;
use crate::config::Settings;
use crate::framebuffer::Panel;
use crate::network::Network;
use crate::power::PowerControl;
use crate::station::Hardware;
use crate::system::HostSystemInfo;
use crate::time_sync::{LocalTime, TimeSource};
use crate::weather::{HttpFetch, OwmClient};

/// Directory standing in for the flash filesystem.
pub const DATA_DIR: &str = "data";

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub fn mount_storage() -> Result<PathBuf> {
    let dir = Path::new(DATA_DIR);
    std::fs::create_dir_all(dir)?;
    info!("Simulator storage at {}", dir.display());
    Ok(dir.to_path_buf())
}

/// Touch is left out: there is no pointer to calibrate on the host.
pub fn hardware(settings: &Settings, _data_dir: &Path) -> Result<Hardware> {
    Ok(Hardware {
        clock: Box::new(SystemClock::new()),
        network: Box::new(SimNetwork::default()),
        time: Box::new(SimTime),
        weather: Box::new(OwmClient::new(
            SimHttp { location: settings.location_name.clone() },
            settings.is_metric,
            &settings.owm_language,
        )),
        moon: Box::new(Astronomy),
        panel: Box::new(HeadlessPanel::default()),
        touch: None,
        system: Box::new(HostSystemInfo),
        power: PowerControl::Unsupported,
    })
}

// ── Network ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SimNetwork {
    ssid: String,
}

impl Network for SimNetwork {
    fn begin(&mut self, ssid: &str, _password: &str) -> Result<()> {
        self.ssid = ssid.to_string();
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        !self.ssid.is_empty()
    }

    fn rssi_dbm(&mut self) -> i32 {
        -62
    }

    fn ip_address(&mut self) -> Option<String> {
        Some("127.0.0.1".to_string())
    }
}

// ── Time ────────────────────────────────────────────────────────────

/// Host wall clock. `configure` exports TZ so `Local` follows the setting.
pub struct SimTime;

impl TimeSource for SimTime {
    fn configure(&mut self, timezone: &str) -> Result<()> {
        info!("Setting timezone: {}", timezone);
        std::env::set_var("TZ", timezone);
        Ok(())
    }

    fn epoch_secs(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn local(&self, epoch_secs: i64) -> LocalTime {
        let Some(utc) = DateTime::from_timestamp(epoch_secs, 0) else {
            return LocalTime::default();
        };
        let t = utc.with_timezone(&Local);
        LocalTime {
            year: t.year(),
            month: t.month() as u8,
            day: t.day() as u8,
            weekday: t.weekday().num_days_from_sunday() as u8,
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
        }
    }
}

// ── Weather ─────────────────────────────────────────────────────────

/// Answers OpenWeatherMap URLs with generated JSON so the real client
/// and parser run on the host.
pub struct SimHttp {
    location: String,
}

const SIM_ICONS: [(&str, &str); 5] = [
    ("Clear", "01d"),
    ("Clouds", "03d"),
    ("Rain", "10d"),
    ("Clouds", "04n"),
    ("Snow", "13d"),
];

impl SimHttp {
    fn current(&self, now: i64) -> serde_json::Value {
        let (main, icon) = SIM_ICONS[(now / 3_600) as usize % SIM_ICONS.len()];
        json!({
            "weather": [{ "main": main, "description": main.to_lowercase(), "icon": icon }],
            "main": { "temp": 14.0 + (now % 600) as f32 / 100.0, "humidity": 64, "pressure": 1014 },
            "wind": { "speed": 3.6, "deg": 240 },
            "clouds": { "all": 40 },
            "visibility": 10_000,
            "dt": now,
            "sys": { "sunrise": now - now % 86_400 + 6 * 3_600, "sunset": now - now % 86_400 + 18 * 3_600 },
            "name": self.location,
        })
    }

    fn forecast(&self, now: i64) -> serde_json::Value {
        let start = now - now.rem_euclid(10_800) + 10_800;
        let list: Vec<_> = (0..40i64)
            .map(|i| {
                let dt = start + i * 10_800;
                let (main, icon) = SIM_ICONS[i as usize % SIM_ICONS.len()];
                json!({
                    "dt": dt,
                    "main": { "temp": 8.0 + (i % 8) as f32, "humidity": 50 + i % 40, "pressure": 1008 + i % 10 },
                    "weather": [{ "main": main, "description": main, "icon": icon }],
                    "wind": { "speed": 1.0 + (i % 5) as f32, "deg": (i * 45) % 360 },
                    "rain": { "3h": if main == "Rain" { 0.8 } else { 0.0 } },
                })
            })
            .collect();
        json!({ "cod": "200", "cnt": list.len(), "list": list })
    }
}

impl HttpFetch for SimHttp {
    fn get(&mut self, url: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let path = url.split('?').next().unwrap_or(url);
        debug!("sim GET {}", path);
        let body = if path.ends_with("/weather") {
            self.current(now)
        } else if path.ends_with("/forecast") {
            self.forecast(now)
        } else {
            bail!("HTTP error: status 404");
        };
        Ok(body.to_string())
    }
}

// ── Display ─────────────────────────────────────────────────────────

/// Accepts band writes and logs them.
#[derive(Default)]
pub struct HeadlessPanel {
    bands: u64,
}

impl Panel for HeadlessPanel {
    fn write_rows(&mut self, y: u32, rows: u32, pixels: &[Rgb565]) -> Result<()> {
        self.bands += 1;
        debug!("panel: rows {}..{} ({} px, band #{})", y, y + rows, pixels.len(), self.bands);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{WeatherClient, ALLOWED_FORECAST_HOURS, MAX_FORECASTS};

    #[test]
    fn synthetic_feed_parses_through_owm_client() {
        let mut client = OwmClient::new(SimHttp { location: "Simtown".into() }, true, "en");
        let current = client.fetch_current("key", "1").expect("current");
        assert_eq!(current.location, "Simtown");
        let forecasts = client
            .fetch_forecast("key", "1", MAX_FORECASTS, &ALLOWED_FORECAST_HOURS)
            .expect("forecast");
        // Five days of 3 h slots hold ten noon/midnight entries.
        assert_eq!(forecasts.len(), 10);
        assert!(forecasts.windows(2).all(|w| w[1].observation_time - w[0].observation_time == 43_200));
    }

    #[test]
    fn unknown_endpoint_is_an_error() {
        let mut http = SimHttp { location: String::new() };
        assert!(http.get("https://example.invalid/data/2.5/onecall?x=1").is_err());
    }
}
