use anyhow::Result;
use log::{debug, info, warn};
use std::path::Path;

pub const PROPERTIES_FILE: &str = "application.properties";

const KEY_SSID: &str = "ssid";
const KEY_PASSWORD: &str = "password";
const KEY_TIMEZONE: &str = "timezone";
const KEY_OWM_API_KEY: &str = "owmApiKey";
const KEY_OWM_LOCATION_ID: &str = "owmLocationId";
const KEY_LOCATION_NAME: &str = "locationName";
const KEY_IS_METRIC: &str = "isMetric";
const KEY_IS_12H_STYLE: &str = "is12hStyle";

const DEFAULT_WIFI_SSID: &str = "YOUR_WIFI_SSID";
const DEFAULT_WIFI_PASS: &str = "";
const DEFAULT_OWM_API_KEY: &str = "";
const DEFAULT_OWM_LOCATION_ID: &str = "2657896";
const DEFAULT_LOCATION_NAME: &str = "Zurich";
/// POSIX TZ string, handed to the platform's libc.
const DEFAULT_TIMEZONE: &str = "CET-1CEST,M3.5.0,M10.5.0/3";
const DEFAULT_OWM_LANGUAGE: &str = "en";

// ── Timing ──────────────────────────────────────────────────────────
const DEFAULT_UPDATE_INTERVAL_SECS: u32 = 10 * 60;
const DEFAULT_SCREEN_CHANGE_SECS: u32 = 0;
const DEFAULT_SLEEP_INTERVAL_SECS: u32 = 0;
/// Epoch seconds the clock must pass before NTP time is trusted.
pub const NTP_MIN_VALID_EPOCH: i64 = 1_533_081_600;

/// Runtime settings: build-time defaults overlaid by the property file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub timezone: String,
    pub owm_api_key: String,
    pub owm_location_id: String,
    pub owm_language: String,
    pub location_name: String,
    pub is_metric: bool,
    pub is_12h_style: bool,
    /// Clock shows hh:mm instead of hh:mm:ss.
    pub is_hhmm_style: bool,
    pub update_interval_secs: u32,
    pub screen_change_secs: u32,
    pub sleep_interval_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("LOCAL_WIFI_SSID")
                .unwrap_or(DEFAULT_WIFI_SSID)
                .to_string(),
            wifi_pass: option_env!("LOCAL_WIFI_PASS")
                .unwrap_or(DEFAULT_WIFI_PASS)
                .to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            owm_api_key: option_env!("LOCAL_OPENWEATHER_API_KEY")
                .unwrap_or(DEFAULT_OWM_API_KEY)
                .to_string(),
            owm_location_id: option_env!("LOCAL_OWM_LOCATION_ID")
                .unwrap_or(DEFAULT_OWM_LOCATION_ID)
                .to_string(),
            owm_language: DEFAULT_OWM_LANGUAGE.to_string(),
            location_name: DEFAULT_LOCATION_NAME.to_string(),
            is_metric: true,
            is_12h_style: false,
            is_hhmm_style: false,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            screen_change_secs: DEFAULT_SCREEN_CHANGE_SECS,
            sleep_interval_secs: DEFAULT_SLEEP_INTERVAL_SECS,
        }
    }
}

impl Settings {
    /// Overlay `key=value` lines onto the current settings.
    ///
    /// Unknown keys and lines without `=` are skipped. Returns the number of
    /// recognized keys applied.
    pub fn apply_properties(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("properties: line {} has no '=', skipped", n + 1);
                continue;
            };
            if self.apply_property(key.trim(), value) {
                info!("Using '{}' from properties", key.trim());
                applied += 1;
            } else {
                debug!("properties: unrecognized key {:?} ignored", key);
            }
        }
        applied
    }

    fn apply_property(&mut self, key: &str, value: &str) -> bool {
        match key {
            KEY_SSID => self.wifi_ssid = value.to_string(),
            KEY_PASSWORD => self.wifi_pass = value.to_string(),
            KEY_TIMEZONE => {
                if !is_posix_tz(value) {
                    warn!("timezone {:?} is not a POSIX TZ rule, local time may be UTC", value);
                }
                self.timezone = value.to_string()
            }
            KEY_OWM_API_KEY => self.owm_api_key = value.to_string(),
            KEY_OWM_LOCATION_ID => self.owm_location_id = value.to_string(),
            KEY_LOCATION_NAME => self.location_name = value.to_string(),
            KEY_IS_METRIC => self.is_metric = value == "true",
            KEY_IS_12H_STYLE => self.is_12h_style = value == "true",
            _ => return false,
        }
        true
    }

    /// Read the property file once at boot. A missing file keeps defaults.
    pub fn load_properties(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            info!("No properties file at {}, using defaults", path.display());
            return Ok(0);
        }
        info!("Reading properties from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let applied = self.apply_properties(&text);
        self.log_effective();
        Ok(applied)
    }

    pub fn log_effective(&self) {
        info!("Effective settings:");
        info!("  ssid = {:?}", self.wifi_ssid);
        info!("  password = <{} chars>", self.wifi_pass.len());
        info!("  timezone = {:?}", self.timezone);
        info!("  owm api key = <{} chars>", self.owm_api_key.len());
        info!("  owm location id = {:?}", self.owm_location_id);
        info!("  location name = {:?}", self.location_name);
        info!("  metric = {}", self.is_metric);
        info!("  12h style = {}", self.is_12h_style);
    }

    pub fn temperature_unit(&self) -> &'static str {
        if self.is_metric { "°C" } else { "°F" }
    }

    pub fn speed_unit(&self) -> &'static str {
        if self.is_metric { "m/s" } else { "mph" }
    }

    pub fn rain_unit(&self) -> &'static str {
        if self.is_metric { "mm" } else { "in" }
    }
}

/// A POSIX TZ rule carries an offset after the zone abbreviation
/// ("CET-1CEST,M3.5.0,M10.5.0/3"). Zone database names such as
/// "Europe/Berlin" do not.
pub fn is_posix_tz(value: &str) -> bool {
    let standard = value.split(',').next().unwrap_or_default();
    !standard.contains('/') && standard.bytes().any(|b| b.is_ascii_digit())
}
